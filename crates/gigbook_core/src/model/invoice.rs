//! Invoice domain model.
//!
//! # Responsibility
//! - Define the invoice header, its ordered line items, and the derived
//!   monetary summary fields.
//!
//! # Invariants
//! - `subtotal`, `tax_amount`, `discount_amount`, and `total` are derived
//!   values: the service layer recomputes them from `items` and the rate
//!   fields before every write, and caller-supplied values are ignored.
//! - Line items have no identity of their own beyond their position in
//!   `items`.

use crate::billing::InvoiceTotals;
use crate::model::client::ClientId;
use crate::model::project::ProjectId;
use crate::model::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for an invoice.
pub type InvoiceId = Uuid;

/// Billing lifecycle state of an invoice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    Paid,
    Overdue,
    Cancelled,
}

/// How `discount_value` is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// `discount_value` is a percentage of the subtotal.
    #[default]
    Percentage,
    /// `discount_value` is a flat amount in the invoice currency.
    Fixed,
}

/// One billable row on an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: f64,
    pub unit_rate: f64,
    /// Explicit amount override; `None` means `quantity * unit_rate`.
    pub amount: Option<f64>,
}

impl LineItem {
    /// Creates a quantity/rate line with no explicit amount override.
    pub fn new(description: impl Into<String>, quantity: f64, unit_rate: f64) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_rate,
            amount: None,
        }
    }

    /// Creates a flat-amount line.
    pub fn flat(description: impl Into<String>, amount: f64) -> Self {
        Self {
            description: description.into(),
            quantity: 1.0,
            unit_rate: 0.0,
            amount: Some(amount),
        }
    }
}

/// Canonical invoice record with its owned line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub uuid: InvoiceId,
    pub client_uuid: ClientId,
    pub project_uuid: Option<ProjectId>,
    /// Human-facing number; unique across the store.
    pub invoice_number: String,
    pub status: InvoiceStatus,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
    pub items: Vec<LineItem>,
    pub tax_rate_percent: f64,
    pub discount_kind: DiscountKind,
    pub discount_value: f64,
    pub subtotal: f64,
    pub tax_amount: f64,
    pub discount_amount: f64,
    pub total: f64,
    pub currency: String,
    pub notes: Option<String>,
}

impl Invoice {
    /// Creates an empty draft invoice with zeroed rates and totals.
    pub fn new(
        client_uuid: ClientId,
        invoice_number: impl Into<String>,
        issue_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            client_uuid,
            project_uuid: None,
            invoice_number: invoice_number.into(),
            status: InvoiceStatus::default(),
            issue_date,
            due_date,
            paid_date: None,
            items: Vec::new(),
            tax_rate_percent: 0.0,
            discount_kind: DiscountKind::default(),
            discount_value: 0.0,
            subtotal: 0.0,
            tax_amount: 0.0,
            discount_amount: 0.0,
            total: 0.0,
            currency: "EUR".to_string(),
            notes: None,
        }
    }

    /// Overwrites the derived fields from a freshly computed summary.
    pub fn apply_totals(&mut self, totals: &InvoiceTotals) {
        self.subtotal = totals.subtotal;
        self.tax_amount = totals.tax_amount;
        self.discount_amount = totals.discount_amount;
        self.total = totals.total;
    }

    /// Checks the fields repositories require before persistence.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.invoice_number.trim().is_empty() {
            return Err(ValidationError::EmptyInvoiceNumber);
        }
        for item in &self.items {
            if item.description.trim().is_empty() {
                return Err(ValidationError::EmptyLineItemDescription);
            }
        }
        Ok(())
    }
}
