//! Core domain logic for GigBook.
//! This crate is the single source of truth for business invariants.

pub mod billing;
pub mod db;
pub mod logging;
pub mod model;
pub mod recurrence;
pub mod repo;
pub mod service;

pub use billing::{compute_totals, InvoiceTotals};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::client::{Client, ClientId, ClientStatus};
pub use model::expense::{Expense, ExpenseCategory, ExpenseId};
pub use model::invoice::{DiscountKind, Invoice, InvoiceId, InvoiceStatus, LineItem};
pub use model::project::{Project, ProjectId, ProjectStatus};
pub use model::task::{
    RecurrenceId, RecurrencePattern, Task, TaskId, TaskStatus, TaskTemplate,
};
pub use model::{Priority, ValidationError};
pub use recurrence::{expand, RecurrenceError};
pub use repo::client_repo::{ClientListQuery, ClientRepository, SqliteClientRepository};
pub use repo::expense_repo::{
    ExpenseListQuery, ExpenseRepository, ExpenseStats, SqliteExpenseRepository,
};
pub use repo::invoice_repo::{InvoiceListQuery, InvoiceRepository, SqliteInvoiceRepository};
pub use repo::project_repo::{
    ProjectListQuery, ProjectRepository, ProjectStats, SqliteProjectRepository,
};
pub use repo::task_repo::{SqliteTaskRepository, TaskListQuery, TaskRepository, TaskStats};
pub use repo::{RepoError, RepoResult};
pub use service::client_service::ClientService;
pub use service::expense_service::ExpenseService;
pub use service::invoice_service::{InvoiceService, InvoiceServiceError};
pub use service::project_service::ProjectService;
pub use service::task_service::{TaskService, TaskServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
