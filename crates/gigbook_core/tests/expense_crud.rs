use chrono::NaiveDate;
use gigbook_core::db::open_db_in_memory;
use gigbook_core::{
    Expense, ExpenseCategory, ExpenseListQuery, ExpenseService, Project, ProjectRepository,
    RepoError, SqliteExpenseRepository, SqliteProjectRepository, ValidationError,
};

const EPSILON: f64 = 1e-9;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let service = ExpenseService::new(SqliteExpenseRepository::try_new(&conn).unwrap());

    let mut expense = Expense::new("Train to client", 48.50, date(2024, 3, 12));
    expense.category = ExpenseCategory::Travel;
    expense.is_reimbursable = true;
    let id = service.create_expense(&expense).unwrap();

    let loaded = service.get_expense(id).unwrap().unwrap();
    assert_eq!(loaded.description, "Train to client");
    assert!((loaded.amount - 48.50).abs() < EPSILON);
    assert_eq!(loaded.category, ExpenseCategory::Travel);
    assert!(loaded.is_reimbursable);
    assert!(!loaded.is_reimbursed);
}

#[test]
fn negative_amount_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = ExpenseService::new(SqliteExpenseRepository::try_new(&conn).unwrap());

    let expense = Expense::new("Refund gone wrong", -10.0, date(2024, 3, 12));
    let err = service.create_expense(&expense).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::InvalidExpenseAmount(_))
    ));
}

#[test]
fn list_filters_by_project_and_category() {
    let conn = open_db_in_memory().unwrap();
    let project_repo = SqliteProjectRepository::try_new(&conn).unwrap();
    let service = ExpenseService::new(SqliteExpenseRepository::try_new(&conn).unwrap());

    let project = Project::new("Relaunch");
    project_repo.create_project(&project).unwrap();

    let mut travel = Expense::new("Flight", 220.0, date(2024, 3, 1));
    travel.category = ExpenseCategory::Travel;
    travel.project_uuid = Some(project.uuid);
    let mut software = Expense::new("IDE license", 89.0, date(2024, 3, 2));
    software.category = ExpenseCategory::Software;
    service.create_expense(&travel).unwrap();
    service.create_expense(&software).unwrap();

    let for_project = service
        .list_expenses(&ExpenseListQuery {
            project_uuid: Some(project.uuid),
            ..ExpenseListQuery::default()
        })
        .unwrap();
    assert_eq!(for_project.len(), 1);
    assert_eq!(for_project[0].description, "Flight");

    let software_only = service
        .list_expenses(&ExpenseListQuery {
            category: Some(ExpenseCategory::Software),
            ..ExpenseListQuery::default()
        })
        .unwrap();
    assert_eq!(software_only.len(), 1);
    assert_eq!(software_only[0].description, "IDE license");
}

#[test]
fn reimbursement_toggle_stamps_and_clears_date() {
    let conn = open_db_in_memory().unwrap();
    let service = ExpenseService::new(SqliteExpenseRepository::try_new(&conn).unwrap());

    let mut expense = Expense::new("Client dinner", 75.0, date(2024, 3, 5));
    expense.is_reimbursable = true;
    service.create_expense(&expense).unwrap();

    service
        .mark_reimbursed(expense.uuid, date(2024, 3, 20))
        .unwrap();
    let loaded = service.get_expense(expense.uuid).unwrap().unwrap();
    assert!(loaded.is_reimbursed);
    assert_eq!(loaded.reimbursed_date, Some(date(2024, 3, 20)));

    service.clear_reimbursed(expense.uuid).unwrap();
    let cleared = service.get_expense(expense.uuid).unwrap().unwrap();
    assert!(!cleared.is_reimbursed);
    assert_eq!(cleared.reimbursed_date, None);
}

#[test]
fn stats_aggregate_totals_categories_and_outstanding() {
    let conn = open_db_in_memory().unwrap();
    let service = ExpenseService::new(SqliteExpenseRepository::try_new(&conn).unwrap());

    let mut flight = Expense::new("Flight", 200.0, date(2024, 3, 1));
    flight.category = ExpenseCategory::Travel;
    flight.is_reimbursable = true;
    let mut hotel = Expense::new("Hotel", 300.0, date(2024, 3, 2));
    hotel.category = ExpenseCategory::Travel;
    hotel.is_reimbursable = true;
    let license = Expense::new("IDE license", 89.0, date(2024, 3, 3));

    service.create_expense(&flight).unwrap();
    service.create_expense(&hotel).unwrap();
    service.create_expense(&license).unwrap();
    service
        .mark_reimbursed(hotel.uuid, date(2024, 3, 10))
        .unwrap();

    let stats = service.expense_stats().unwrap();
    assert_eq!(stats.count, 3);
    assert!((stats.total_amount - 589.0).abs() < EPSILON);
    assert!((stats.outstanding_reimbursable - 200.0).abs() < EPSILON);

    let travel = stats
        .by_category
        .iter()
        .find(|entry| entry.category == ExpenseCategory::Travel)
        .unwrap();
    assert_eq!(travel.count, 2);
    assert!((travel.total - 500.0).abs() < EPSILON);
}

#[test]
fn update_and_delete_expense() {
    let conn = open_db_in_memory().unwrap();
    let service = ExpenseService::new(SqliteExpenseRepository::try_new(&conn).unwrap());

    let mut expense = Expense::new("Domain renewal", 12.0, date(2024, 3, 1));
    service.create_expense(&expense).unwrap();

    expense.amount = 15.0;
    expense.category = ExpenseCategory::Software;
    service.update_expense(&expense).unwrap();

    let loaded = service.get_expense(expense.uuid).unwrap().unwrap();
    assert!((loaded.amount - 15.0).abs() < EPSILON);
    assert_eq!(loaded.category, ExpenseCategory::Software);

    service.delete_expense(expense.uuid).unwrap();
    assert!(service.get_expense(expense.uuid).unwrap().is_none());
}
