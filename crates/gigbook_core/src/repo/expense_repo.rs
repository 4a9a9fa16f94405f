//! Expense repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over `expenses` storage.
//! - Own the reimbursement toggle and category aggregation queries.
//!
//! # Invariants
//! - Write paths call `Expense::validate()` before SQL mutations.

use crate::model::expense::{Expense, ExpenseCategory, ExpenseId};
use crate::model::project::ProjectId;
use crate::repo::{
    bool_to_int, ensure_schema_ready, parse_bool, parse_date, parse_uuid, push_page, RepoError,
    RepoResult,
};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const EXPENSE_SELECT_SQL: &str = "SELECT
    uuid,
    project_uuid,
    description,
    amount,
    date,
    category,
    is_reimbursable,
    is_reimbursed,
    reimbursed_date,
    notes
FROM expenses";

const EXPENSE_COLUMNS: &[&str] = &[
    "uuid",
    "project_uuid",
    "description",
    "amount",
    "date",
    "category",
    "is_reimbursable",
    "is_reimbursed",
    "reimbursed_date",
    "notes",
    "updated_at",
];

/// Query options for listing expenses.
#[derive(Debug, Clone, Default)]
pub struct ExpenseListQuery {
    pub project_uuid: Option<ProjectId>,
    pub category: Option<ExpenseCategory>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Total spent within one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: ExpenseCategory,
    pub total: f64,
    pub count: u64,
}

/// Aggregated expense figures for the dashboard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseStats {
    pub total_amount: f64,
    pub count: u64,
    pub by_category: Vec<CategoryTotal>,
    /// Reimbursable amounts not reimbursed yet.
    pub outstanding_reimbursable: f64,
}

/// Repository interface for expense operations.
pub trait ExpenseRepository {
    fn create_expense(&self, expense: &Expense) -> RepoResult<ExpenseId>;
    fn update_expense(&self, expense: &Expense) -> RepoResult<()>;
    fn get_expense(&self, id: ExpenseId) -> RepoResult<Option<Expense>>;
    fn list_expenses(&self, query: &ExpenseListQuery) -> RepoResult<Vec<Expense>>;
    fn delete_expense(&self, id: ExpenseId) -> RepoResult<()>;
    fn set_reimbursed(
        &self,
        id: ExpenseId,
        reimbursed: bool,
        reimbursed_date: Option<NaiveDate>,
    ) -> RepoResult<()>;
    fn expense_stats(&self) -> RepoResult<ExpenseStats>;
}

/// SQLite-backed expense repository.
#[derive(Debug)]
pub struct SqliteExpenseRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteExpenseRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, "expenses", EXPENSE_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl ExpenseRepository for SqliteExpenseRepository<'_> {
    fn create_expense(&self, expense: &Expense) -> RepoResult<ExpenseId> {
        expense.validate()?;

        self.conn.execute(
            "INSERT INTO expenses (
                uuid,
                project_uuid,
                description,
                amount,
                date,
                category,
                is_reimbursable,
                is_reimbursed,
                reimbursed_date,
                notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                expense.uuid.to_string(),
                expense.project_uuid.map(|id| id.to_string()),
                expense.description.as_str(),
                expense.amount,
                expense.date.to_string(),
                expense_category_to_db(expense.category),
                bool_to_int(expense.is_reimbursable),
                bool_to_int(expense.is_reimbursed),
                expense.reimbursed_date.map(|date| date.to_string()),
                expense.notes.as_deref(),
            ],
        )?;

        Ok(expense.uuid)
    }

    fn update_expense(&self, expense: &Expense) -> RepoResult<()> {
        expense.validate()?;

        let changed = self.conn.execute(
            "UPDATE expenses
             SET
                project_uuid = ?1,
                description = ?2,
                amount = ?3,
                date = ?4,
                category = ?5,
                is_reimbursable = ?6,
                is_reimbursed = ?7,
                reimbursed_date = ?8,
                notes = ?9,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?10;",
            params![
                expense.project_uuid.map(|id| id.to_string()),
                expense.description.as_str(),
                expense.amount,
                expense.date.to_string(),
                expense_category_to_db(expense.category),
                bool_to_int(expense.is_reimbursable),
                bool_to_int(expense.is_reimbursed),
                expense.reimbursed_date.map(|date| date.to_string()),
                expense.notes.as_deref(),
                expense.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("expense", expense.uuid));
        }

        Ok(())
    }

    fn get_expense(&self, id: ExpenseId) -> RepoResult<Option<Expense>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EXPENSE_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_expense_row(row)?));
        }

        Ok(None)
    }

    fn list_expenses(&self, query: &ExpenseListQuery) -> RepoResult<Vec<Expense>> {
        let mut sql = format!("{EXPENSE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(project_uuid) = query.project_uuid {
            sql.push_str(" AND project_uuid = ?");
            bind_values.push(Value::Text(project_uuid.to_string()));
        }

        if let Some(category) = query.category {
            sql.push_str(" AND category = ?");
            bind_values.push(Value::Text(expense_category_to_db(category).to_string()));
        }

        sql.push_str(" ORDER BY date DESC, uuid ASC");
        push_page(&mut sql, &mut bind_values, query.limit, query.offset);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut expenses = Vec::new();
        while let Some(row) = rows.next()? {
            expenses.push(parse_expense_row(row)?);
        }

        Ok(expenses)
    }

    fn delete_expense(&self, id: ExpenseId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM expenses WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::not_found("expense", id));
        }

        Ok(())
    }

    fn set_reimbursed(
        &self,
        id: ExpenseId,
        reimbursed: bool,
        reimbursed_date: Option<NaiveDate>,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE expenses
             SET
                is_reimbursed = ?1,
                reimbursed_date = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?3;",
            params![
                bool_to_int(reimbursed),
                reimbursed_date.map(|date| date.to_string()),
                id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("expense", id));
        }

        Ok(())
    }

    fn expense_stats(&self) -> RepoResult<ExpenseStats> {
        let mut stats = self.conn.query_row(
            "SELECT
                COALESCE(SUM(amount), 0),
                COUNT(*),
                COALESCE(SUM(CASE
                        WHEN is_reimbursable = 1 AND is_reimbursed = 0
                        THEN amount ELSE 0
                    END), 0)
             FROM expenses;",
            [],
            |row| {
                Ok(ExpenseStats {
                    total_amount: row.get::<_, f64>(0)?,
                    count: row.get::<_, i64>(1)? as u64,
                    by_category: Vec::new(),
                    outstanding_reimbursable: row.get::<_, f64>(2)?,
                })
            },
        )?;

        let mut stmt = self.conn.prepare(
            "SELECT category, COALESCE(SUM(amount), 0), COUNT(*)
             FROM expenses
             GROUP BY category
             ORDER BY category ASC;",
        )?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let category_text: String = row.get(0)?;
            stats.by_category.push(CategoryTotal {
                category: parse_expense_category(&category_text)?,
                total: row.get::<_, f64>(1)?,
                count: row.get::<_, i64>(2)? as u64,
            });
        }

        Ok(stats)
    }
}

fn parse_expense_row(row: &Row<'_>) -> RepoResult<Expense> {
    let uuid_text: String = row.get("uuid")?;
    let project_text: Option<String> = row.get("project_uuid")?;
    let date_text: String = row.get("date")?;
    let category_text: String = row.get("category")?;
    let reimbursed_text: Option<String> = row.get("reimbursed_date")?;

    Ok(Expense {
        uuid: parse_uuid(&uuid_text, "expenses.uuid")?,
        project_uuid: project_text
            .map(|value| parse_uuid(&value, "expenses.project_uuid"))
            .transpose()?,
        description: row.get("description")?,
        amount: row.get("amount")?,
        date: parse_date(&date_text, "expenses.date")?,
        category: parse_expense_category(&category_text)?,
        is_reimbursable: parse_bool(row.get("is_reimbursable")?, "expenses.is_reimbursable")?,
        is_reimbursed: parse_bool(row.get("is_reimbursed")?, "expenses.is_reimbursed")?,
        reimbursed_date: reimbursed_text
            .map(|value| parse_date(&value, "expenses.reimbursed_date"))
            .transpose()?,
        notes: row.get("notes")?,
    })
}

fn expense_category_to_db(category: ExpenseCategory) -> &'static str {
    match category {
        ExpenseCategory::Travel => "travel",
        ExpenseCategory::Meals => "meals",
        ExpenseCategory::Supplies => "supplies",
        ExpenseCategory::Software => "software",
        ExpenseCategory::Hardware => "hardware",
        ExpenseCategory::Marketing => "marketing",
        ExpenseCategory::Other => "other",
    }
}

fn parse_expense_category(value: &str) -> RepoResult<ExpenseCategory> {
    match value {
        "travel" => Ok(ExpenseCategory::Travel),
        "meals" => Ok(ExpenseCategory::Meals),
        "supplies" => Ok(ExpenseCategory::Supplies),
        "software" => Ok(ExpenseCategory::Software),
        "hardware" => Ok(ExpenseCategory::Hardware),
        "marketing" => Ok(ExpenseCategory::Marketing),
        "other" => Ok(ExpenseCategory::Other),
        unknown => Err(RepoError::InvalidData(format!(
            "invalid expense category `{unknown}` in expenses.category"
        ))),
    }
}
