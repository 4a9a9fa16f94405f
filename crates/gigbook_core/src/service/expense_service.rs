//! Expense use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD entry points for expense records.
//! - Expose reimbursement toggling and dashboard aggregation.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::expense::{Expense, ExpenseId};
use crate::repo::expense_repo::{ExpenseListQuery, ExpenseRepository, ExpenseStats};
use crate::repo::RepoResult;
use chrono::NaiveDate;

/// Use-case service wrapper for expense operations.
pub struct ExpenseService<R: ExpenseRepository> {
    repo: R,
}

impl<R: ExpenseRepository> ExpenseService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a new expense record.
    pub fn create_expense(&self, expense: &Expense) -> RepoResult<ExpenseId> {
        self.repo.create_expense(expense)
    }

    /// Updates an existing expense by stable ID.
    pub fn update_expense(&self, expense: &Expense) -> RepoResult<()> {
        self.repo.update_expense(expense)
    }

    /// Gets one expense by ID.
    pub fn get_expense(&self, id: ExpenseId) -> RepoResult<Option<Expense>> {
        self.repo.get_expense(id)
    }

    /// Lists expenses using filter and pagination options.
    pub fn list_expenses(&self, query: &ExpenseListQuery) -> RepoResult<Vec<Expense>> {
        self.repo.list_expenses(query)
    }

    /// Deletes an expense by ID.
    pub fn delete_expense(&self, id: ExpenseId) -> RepoResult<()> {
        self.repo.delete_expense(id)
    }

    /// Marks an expense reimbursed on the given date.
    pub fn mark_reimbursed(&self, id: ExpenseId, on: NaiveDate) -> RepoResult<()> {
        self.repo.set_reimbursed(id, true, Some(on))
    }

    /// Clears the reimbursed flag and date.
    pub fn clear_reimbursed(&self, id: ExpenseId) -> RepoResult<()> {
        self.repo.set_reimbursed(id, false, None)
    }

    /// Returns aggregated figures for the dashboard.
    pub fn expense_stats(&self) -> RepoResult<ExpenseStats> {
        self.repo.expense_stats()
    }
}
