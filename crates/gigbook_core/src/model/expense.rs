//! Expense domain model.
//!
//! # Responsibility
//! - Define the cost record attached to a project, with reimbursement
//!   bookkeeping.
//!
//! # Invariants
//! - `reimbursed_date` is set if and only if `is_reimbursed` is true.

use crate::model::project::ProjectId;
use crate::model::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for an expense.
pub type ExpenseId = Uuid;

/// Spending category of an expense.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    Travel,
    Meals,
    Supplies,
    Software,
    Hardware,
    Marketing,
    #[default]
    Other,
}

/// Canonical expense record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub uuid: ExpenseId,
    pub project_uuid: Option<ProjectId>,
    pub description: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub category: ExpenseCategory,
    pub is_reimbursable: bool,
    pub is_reimbursed: bool,
    pub reimbursed_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl Expense {
    /// Creates an uncategorized, non-reimbursable expense.
    pub fn new(description: impl Into<String>, amount: f64, date: NaiveDate) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            project_uuid: None,
            description: description.into(),
            amount,
            date,
            category: ExpenseCategory::default(),
            is_reimbursable: false,
            is_reimbursed: false,
            reimbursed_date: None,
            notes: None,
        }
    }

    /// Checks the fields repositories require before persistence.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.description.trim().is_empty() {
            return Err(ValidationError::EmptyExpenseDescription);
        }
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(ValidationError::InvalidExpenseAmount(self.amount));
        }
        Ok(())
    }
}
