//! Domain model for clients, projects, tasks, invoices, and expenses.
//!
//! # Responsibility
//! - Define the canonical records used by core business logic.
//! - Keep every status/kind field an explicit enum instead of loose strings.
//!
//! # Invariants
//! - Every entity is identified by a stable `Uuid`.
//! - Derived invoice totals are never stored without recomputation (see
//!   `billing`).

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod client;
pub mod expense;
pub mod invoice;
pub mod project;
pub mod task;

/// Validation failure raised by `validate()` on any entity.
///
/// Write paths must surface these before touching storage.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Client name is blank after trim.
    EmptyClientName,
    /// Client e-mail does not match the accepted format.
    InvalidClientEmail(String),
    /// Project name is blank after trim.
    EmptyProjectName,
    /// Project budget is negative or non-finite.
    InvalidProjectBudget(f64),
    /// Task title is blank after trim.
    EmptyTaskTitle,
    /// Invoice number is blank after trim.
    EmptyInvoiceNumber,
    /// A line item description is blank after trim.
    EmptyLineItemDescription,
    /// Expense description is blank after trim.
    EmptyExpenseDescription,
    /// Expense amount is negative or non-finite.
    InvalidExpenseAmount(f64),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyClientName => write!(f, "client name must not be blank"),
            Self::InvalidClientEmail(value) => write!(f, "invalid client e-mail: `{value}`"),
            Self::EmptyProjectName => write!(f, "project name must not be blank"),
            Self::InvalidProjectBudget(value) => {
                write!(f, "project budget must be a non-negative number, got {value}")
            }
            Self::EmptyTaskTitle => write!(f, "task title must not be blank"),
            Self::EmptyInvoiceNumber => write!(f, "invoice number must not be blank"),
            Self::EmptyLineItemDescription => {
                write!(f, "line item description must not be blank")
            }
            Self::EmptyExpenseDescription => write!(f, "expense description must not be blank"),
            Self::InvalidExpenseAmount(value) => {
                write!(f, "expense amount must be a non-negative number, got {value}")
            }
        }
    }
}

impl Error for ValidationError {}

/// Priority scale shared by projects and tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}
