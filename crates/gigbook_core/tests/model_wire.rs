use chrono::NaiveDate;
use gigbook_core::{
    Client, Expense, Invoice, InvoiceStatus, LineItem, Task, TaskStatus, TaskTemplate,
    ValidationError,
};
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn invoice_serialization_uses_expected_wire_fields() {
    let client_id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let mut invoice = Invoice::new(client_id, "INV-2024-001", date(2024, 1, 10), date(2024, 2, 9));
    invoice.status = InvoiceStatus::Sent;
    invoice.items = vec![LineItem::new("Design sprint", 10.0, 80.0)];
    invoice.tax_rate_percent = 19.0;

    let json = serde_json::to_value(&invoice).unwrap();
    assert_eq!(json["client_uuid"], client_id.to_string());
    assert_eq!(json["invoice_number"], "INV-2024-001");
    assert_eq!(json["status"], "sent");
    assert_eq!(json["issue_date"], "2024-01-10");
    assert_eq!(json["discount_kind"], "percentage");
    assert_eq!(json["currency"], "EUR");
    assert_eq!(json["items"][0]["description"], "Design sprint");
    assert_eq!(json["items"][0]["amount"], serde_json::Value::Null);

    let decoded: Invoice = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, invoice);
}

#[test]
fn task_serialization_uses_snake_case_status_and_pattern() {
    let mut template = TaskTemplate::new("send report");
    template.is_recurring = true;
    template.recurrence_count = 3;

    let json = serde_json::to_value(&template).unwrap();
    assert_eq!(json["recurring_pattern"], "weekly");
    assert_eq!(json["priority"], "medium");
    assert_eq!(json["recurrence_count"], 3);

    let task = gigbook_core::expand(&template, date(2024, 1, 1))
        .into_iter()
        .next()
        .unwrap();
    let task_json = serde_json::to_value(&task).unwrap();
    assert_eq!(task_json["status"], "pending");
    assert_eq!(task_json["instance_number"], 1);
    assert_eq!(task_json["is_visible"], true);

    let decoded: Task = serde_json::from_value(task_json).unwrap();
    assert_eq!(decoded.status, TaskStatus::Pending);
}

#[test]
fn client_new_sets_defaults_and_validates() {
    let client = Client::new("Acme Studio", "billing@acme.test");

    assert!(!client.uuid.is_nil());
    assert_eq!(client.payment_terms_days, 30);
    assert!(client.validate().is_ok());

    let blank = Client::new("   ", "billing@acme.test");
    assert_eq!(blank.validate(), Err(ValidationError::EmptyClientName));
}

#[test]
fn expense_rejects_non_finite_amount() {
    let expense = Expense::new("Conference ticket", f64::INFINITY, date(2024, 5, 1));
    assert_eq!(
        expense.validate(),
        Err(ValidationError::InvalidExpenseAmount(f64::INFINITY))
    );
}
