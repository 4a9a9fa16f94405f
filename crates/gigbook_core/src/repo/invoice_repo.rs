//! Invoice repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over `invoices` and their `invoice_items` rows.
//! - Own the status transitions that touch storage (paid stamp, overdue
//!   sweep).
//!
//! # Invariants
//! - Write paths call `Invoice::validate()` before SQL mutations.
//! - A header and its line items are written in one transaction; readers
//!   never observe an invoice with a partial item list.
//! - Line items keep their order through the `position` column.

use crate::model::client::ClientId;
use crate::model::invoice::{DiscountKind, Invoice, InvoiceId, InvoiceStatus, LineItem};
use crate::model::project::ProjectId;
use crate::repo::{ensure_schema_ready, parse_date, parse_uuid, push_page, RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const INVOICE_SELECT_SQL: &str = "SELECT
    uuid,
    client_uuid,
    project_uuid,
    invoice_number,
    status,
    issue_date,
    due_date,
    paid_date,
    tax_rate_percent,
    discount_kind,
    discount_value,
    subtotal,
    tax_amount,
    discount_amount,
    total,
    currency,
    notes
FROM invoices";

const INVOICE_COLUMNS: &[&str] = &[
    "uuid",
    "client_uuid",
    "project_uuid",
    "invoice_number",
    "status",
    "issue_date",
    "due_date",
    "paid_date",
    "tax_rate_percent",
    "discount_kind",
    "discount_value",
    "subtotal",
    "tax_amount",
    "discount_amount",
    "total",
    "currency",
    "notes",
    "updated_at",
];

const ITEM_COLUMNS: &[&str] = &[
    "invoice_uuid",
    "position",
    "description",
    "quantity",
    "unit_rate",
    "amount",
];

/// Query options for listing invoices.
#[derive(Debug, Clone, Default)]
pub struct InvoiceListQuery {
    pub client_uuid: Option<ClientId>,
    pub project_uuid: Option<ProjectId>,
    pub status: Option<InvoiceStatus>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for invoice operations.
pub trait InvoiceRepository {
    fn create_invoice(&mut self, invoice: &Invoice) -> RepoResult<InvoiceId>;
    fn update_invoice(&mut self, invoice: &Invoice) -> RepoResult<()>;
    fn get_invoice(&self, id: InvoiceId) -> RepoResult<Option<Invoice>>;
    fn list_invoices(&self, query: &InvoiceListQuery) -> RepoResult<Vec<Invoice>>;
    fn delete_invoice(&self, id: InvoiceId) -> RepoResult<()>;
    fn set_status(
        &self,
        id: InvoiceId,
        status: InvoiceStatus,
        paid_date: Option<NaiveDate>,
    ) -> RepoResult<()>;
    /// Flips every `sent` invoice past its due date to `overdue`.
    ///
    /// Returns the number of invoices changed.
    fn mark_overdue(&self, today: NaiveDate) -> RepoResult<u64>;
}

/// SQLite-backed invoice repository.
#[derive(Debug)]
pub struct SqliteInvoiceRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteInvoiceRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, "invoices", INVOICE_COLUMNS)?;
        ensure_schema_ready(conn, "invoice_items", ITEM_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl InvoiceRepository for SqliteInvoiceRepository<'_> {
    fn create_invoice(&mut self, invoice: &Invoice) -> RepoResult<InvoiceId> {
        invoice.validate()?;

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO invoices (
                uuid,
                client_uuid,
                project_uuid,
                invoice_number,
                status,
                issue_date,
                due_date,
                paid_date,
                tax_rate_percent,
                discount_kind,
                discount_value,
                subtotal,
                tax_amount,
                discount_amount,
                total,
                currency,
                notes
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                ?15, ?16, ?17
            );",
            params![
                invoice.uuid.to_string(),
                invoice.client_uuid.to_string(),
                invoice.project_uuid.map(|id| id.to_string()),
                invoice.invoice_number.as_str(),
                invoice_status_to_db(invoice.status),
                invoice.issue_date.to_string(),
                invoice.due_date.to_string(),
                invoice.paid_date.map(|date| date.to_string()),
                invoice.tax_rate_percent,
                discount_kind_to_db(invoice.discount_kind),
                invoice.discount_value,
                invoice.subtotal,
                invoice.tax_amount,
                invoice.discount_amount,
                invoice.total,
                invoice.currency.as_str(),
                invoice.notes.as_deref(),
            ],
        )?;
        insert_items(&tx, invoice.uuid, &invoice.items)?;
        tx.commit()?;

        Ok(invoice.uuid)
    }

    fn update_invoice(&mut self, invoice: &Invoice) -> RepoResult<()> {
        invoice.validate()?;

        let tx = self.conn.transaction()?;
        let changed = tx.execute(
            "UPDATE invoices
             SET
                client_uuid = ?1,
                project_uuid = ?2,
                invoice_number = ?3,
                status = ?4,
                issue_date = ?5,
                due_date = ?6,
                paid_date = ?7,
                tax_rate_percent = ?8,
                discount_kind = ?9,
                discount_value = ?10,
                subtotal = ?11,
                tax_amount = ?12,
                discount_amount = ?13,
                total = ?14,
                currency = ?15,
                notes = ?16,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?17;",
            params![
                invoice.client_uuid.to_string(),
                invoice.project_uuid.map(|id| id.to_string()),
                invoice.invoice_number.as_str(),
                invoice_status_to_db(invoice.status),
                invoice.issue_date.to_string(),
                invoice.due_date.to_string(),
                invoice.paid_date.map(|date| date.to_string()),
                invoice.tax_rate_percent,
                discount_kind_to_db(invoice.discount_kind),
                invoice.discount_value,
                invoice.subtotal,
                invoice.tax_amount,
                invoice.discount_amount,
                invoice.total,
                invoice.currency.as_str(),
                invoice.notes.as_deref(),
                invoice.uuid.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("invoice", invoice.uuid));
        }

        // Items are replaced wholesale; positions restart from zero.
        tx.execute(
            "DELETE FROM invoice_items WHERE invoice_uuid = ?1;",
            [invoice.uuid.to_string()],
        )?;
        insert_items(&tx, invoice.uuid, &invoice.items)?;
        tx.commit()?;

        Ok(())
    }

    fn get_invoice(&self, id: InvoiceId) -> RepoResult<Option<Invoice>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{INVOICE_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            let mut invoice = parse_invoice_row(row)?;
            invoice.items = load_items(self.conn, id)?;
            return Ok(Some(invoice));
        }

        Ok(None)
    }

    fn list_invoices(&self, query: &InvoiceListQuery) -> RepoResult<Vec<Invoice>> {
        let mut sql = format!("{INVOICE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(client_uuid) = query.client_uuid {
            sql.push_str(" AND client_uuid = ?");
            bind_values.push(Value::Text(client_uuid.to_string()));
        }

        if let Some(project_uuid) = query.project_uuid {
            sql.push_str(" AND project_uuid = ?");
            bind_values.push(Value::Text(project_uuid.to_string()));
        }

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(invoice_status_to_db(status).to_string()));
        }

        sql.push_str(" ORDER BY issue_date DESC, invoice_number DESC");
        push_page(&mut sql, &mut bind_values, query.limit, query.offset);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut invoices = Vec::new();
        while let Some(row) = rows.next()? {
            invoices.push(parse_invoice_row(row)?);
        }

        for invoice in &mut invoices {
            invoice.items = load_items(self.conn, invoice.uuid)?;
        }

        Ok(invoices)
    }

    fn delete_invoice(&self, id: InvoiceId) -> RepoResult<()> {
        // ON DELETE CASCADE removes the items.
        let changed = self
            .conn
            .execute("DELETE FROM invoices WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::not_found("invoice", id));
        }

        Ok(())
    }

    fn set_status(
        &self,
        id: InvoiceId,
        status: InvoiceStatus,
        paid_date: Option<NaiveDate>,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE invoices
             SET
                status = ?1,
                paid_date = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?3;",
            params![
                invoice_status_to_db(status),
                paid_date.map(|date| date.to_string()),
                id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("invoice", id));
        }

        Ok(())
    }

    fn mark_overdue(&self, today: NaiveDate) -> RepoResult<u64> {
        let changed = self.conn.execute(
            "UPDATE invoices
             SET
                status = 'overdue',
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE status = 'sent'
               AND due_date < ?1;",
            [today.to_string()],
        )?;

        Ok(changed as u64)
    }
}

// `Transaction` derefs to `Connection`.
fn insert_items(conn: &Connection, invoice_uuid: InvoiceId, items: &[LineItem]) -> RepoResult<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO invoice_items (
            invoice_uuid,
            position,
            description,
            quantity,
            unit_rate,
            amount
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
    )?;
    for (position, item) in items.iter().enumerate() {
        stmt.execute(params![
            invoice_uuid.to_string(),
            position as i64,
            item.description.as_str(),
            item.quantity,
            item.unit_rate,
            item.amount,
        ])?;
    }

    Ok(())
}

fn load_items(conn: &Connection, invoice_uuid: InvoiceId) -> RepoResult<Vec<LineItem>> {
    let mut stmt = conn.prepare(
        "SELECT description, quantity, unit_rate, amount
         FROM invoice_items
         WHERE invoice_uuid = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([invoice_uuid.to_string()])?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(LineItem {
            description: row.get("description")?,
            quantity: row.get("quantity")?,
            unit_rate: row.get("unit_rate")?,
            amount: row.get("amount")?,
        });
    }

    Ok(items)
}

fn parse_invoice_row(row: &Row<'_>) -> RepoResult<Invoice> {
    let uuid_text: String = row.get("uuid")?;
    let client_text: String = row.get("client_uuid")?;
    let project_text: Option<String> = row.get("project_uuid")?;
    let status_text: String = row.get("status")?;
    let issue_text: String = row.get("issue_date")?;
    let due_text: String = row.get("due_date")?;
    let paid_text: Option<String> = row.get("paid_date")?;
    let discount_text: String = row.get("discount_kind")?;

    Ok(Invoice {
        uuid: parse_uuid(&uuid_text, "invoices.uuid")?,
        client_uuid: parse_uuid(&client_text, "invoices.client_uuid")?,
        project_uuid: project_text
            .map(|value| parse_uuid(&value, "invoices.project_uuid"))
            .transpose()?,
        invoice_number: row.get("invoice_number")?,
        status: parse_invoice_status(&status_text)?,
        issue_date: parse_date(&issue_text, "invoices.issue_date")?,
        due_date: parse_date(&due_text, "invoices.due_date")?,
        paid_date: paid_text
            .map(|value| parse_date(&value, "invoices.paid_date"))
            .transpose()?,
        items: Vec::new(),
        tax_rate_percent: row.get("tax_rate_percent")?,
        discount_kind: parse_discount_kind(&discount_text)?,
        discount_value: row.get("discount_value")?,
        subtotal: row.get("subtotal")?,
        tax_amount: row.get("tax_amount")?,
        discount_amount: row.get("discount_amount")?,
        total: row.get("total")?,
        currency: row.get("currency")?,
        notes: row.get("notes")?,
    })
}

fn invoice_status_to_db(status: InvoiceStatus) -> &'static str {
    match status {
        InvoiceStatus::Draft => "draft",
        InvoiceStatus::Sent => "sent",
        InvoiceStatus::Paid => "paid",
        InvoiceStatus::Overdue => "overdue",
        InvoiceStatus::Cancelled => "cancelled",
    }
}

fn parse_invoice_status(value: &str) -> RepoResult<InvoiceStatus> {
    match value {
        "draft" => Ok(InvoiceStatus::Draft),
        "sent" => Ok(InvoiceStatus::Sent),
        "paid" => Ok(InvoiceStatus::Paid),
        "overdue" => Ok(InvoiceStatus::Overdue),
        "cancelled" => Ok(InvoiceStatus::Cancelled),
        other => Err(RepoError::InvalidData(format!(
            "invalid invoice status `{other}` in invoices.status"
        ))),
    }
}

fn discount_kind_to_db(kind: DiscountKind) -> &'static str {
    match kind {
        DiscountKind::Percentage => "percentage",
        DiscountKind::Fixed => "fixed",
    }
}

fn parse_discount_kind(value: &str) -> RepoResult<DiscountKind> {
    match value {
        "percentage" => Ok(DiscountKind::Percentage),
        "fixed" => Ok(DiscountKind::Fixed),
        other => Err(RepoError::InvalidData(format!(
            "invalid discount kind `{other}` in invoices.discount_kind"
        ))),
    }
}
