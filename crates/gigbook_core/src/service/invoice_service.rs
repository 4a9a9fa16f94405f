//! Invoice use-case service.
//!
//! # Responsibility
//! - Recompute derived totals on every invoice write path.
//! - Own invoice status transitions (paid stamp, overdue sweep).
//!
//! # Invariants
//! - Persisted `subtotal`/`tax_amount`/`discount_amount`/`total` always
//!   reflect the current line items; callers cannot store stale totals.
//! - Marking an invoice paid stamps `paid_date`; leaving the paid status
//!   clears it.

use crate::billing;
use crate::model::invoice::{Invoice, InvoiceId, InvoiceStatus, LineItem};
use crate::repo::invoice_repo::{InvoiceListQuery, InvoiceRepository};
use crate::repo::RepoError;
use chrono::NaiveDate;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from invoice service operations.
#[derive(Debug)]
pub enum InvoiceServiceError {
    /// Target invoice does not exist.
    InvoiceNotFound(InvoiceId),
    /// Repository-level failure.
    Repo(RepoError),
}

impl Display for InvoiceServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvoiceNotFound(id) => write!(f, "invoice not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for InvoiceServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for InvoiceServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity: "invoice", id } => Self::InvoiceNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Use-case service wrapper for invoice operations.
pub struct InvoiceService<R: InvoiceRepository> {
    repo: R,
}

impl<R: InvoiceRepository> InvoiceService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates an invoice with freshly computed totals.
    pub fn create_invoice(&mut self, invoice: &Invoice) -> Result<InvoiceId, InvoiceServiceError> {
        let mut invoice = invoice.clone();
        recompute(&mut invoice);
        Ok(self.repo.create_invoice(&invoice)?)
    }

    /// Updates an invoice, replacing its line items and totals.
    pub fn update_invoice(&mut self, invoice: &Invoice) -> Result<Invoice, InvoiceServiceError> {
        let mut invoice = invoice.clone();
        recompute(&mut invoice);
        self.repo.update_invoice(&invoice)?;
        self.read_back(invoice.uuid)
    }

    /// Replaces the line items of a stored invoice and recomputes totals.
    pub fn replace_items(
        &mut self,
        id: InvoiceId,
        items: Vec<LineItem>,
    ) -> Result<Invoice, InvoiceServiceError> {
        let mut invoice = self
            .repo
            .get_invoice(id)?
            .ok_or(InvoiceServiceError::InvoiceNotFound(id))?;
        invoice.items = items;
        recompute(&mut invoice);
        self.repo.update_invoice(&invoice)?;
        self.read_back(id)
    }

    /// Gets one invoice with its line items.
    pub fn get_invoice(&self, id: InvoiceId) -> Result<Option<Invoice>, InvoiceServiceError> {
        Ok(self.repo.get_invoice(id)?)
    }

    /// Lists invoices using filter and pagination options.
    pub fn list_invoices(
        &self,
        query: &InvoiceListQuery,
    ) -> Result<Vec<Invoice>, InvoiceServiceError> {
        Ok(self.repo.list_invoices(query)?)
    }

    /// Deletes an invoice and its line items.
    pub fn delete_invoice(&self, id: InvoiceId) -> Result<(), InvoiceServiceError> {
        Ok(self.repo.delete_invoice(id)?)
    }

    /// Changes an invoice's status.
    ///
    /// Moving to `Paid` stamps `paid_on` as the paid date; moving to any
    /// other status clears it.
    pub fn set_status(
        &self,
        id: InvoiceId,
        status: InvoiceStatus,
        paid_on: NaiveDate,
    ) -> Result<Invoice, InvoiceServiceError> {
        let paid_date = (status == InvoiceStatus::Paid).then_some(paid_on);
        self.repo.set_status(id, status, paid_date)?;
        self.read_back(id)
    }

    /// Flips every sent invoice past its due date to overdue.
    pub fn mark_overdue(&self, today: NaiveDate) -> Result<u64, InvoiceServiceError> {
        let changed = self.repo.mark_overdue(today)?;
        if changed > 0 {
            info!("event=invoices_overdue module=invoice_service count={changed}");
        }
        Ok(changed)
    }

    fn read_back(&self, id: InvoiceId) -> Result<Invoice, InvoiceServiceError> {
        self.repo
            .get_invoice(id)?
            .ok_or(InvoiceServiceError::InvoiceNotFound(id))
    }
}

fn recompute(invoice: &mut Invoice) {
    let totals = billing::compute_totals(
        &invoice.items,
        invoice.tax_rate_percent,
        invoice.discount_kind,
        invoice.discount_value,
    );
    invoice.apply_totals(&totals);
}
