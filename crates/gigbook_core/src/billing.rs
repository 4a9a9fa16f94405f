//! Invoice monetary summary computation.
//!
//! # Responsibility
//! - Derive subtotal, tax, discount, and total from line items and the two
//!   scalar rate fields.
//!
//! # Invariants
//! - Pure and idempotent: same inputs, same summary, no side effects.
//! - Non-finite or negative numeric inputs are coerced to 0; `NaN` never
//!   reaches the total.
//! - `total == subtotal + tax_amount - discount_amount` and `total >= 0`,
//!   because the discount is clamped to the subtotal.

use crate::model::invoice::{DiscountKind, LineItem};
use serde::{Deserialize, Serialize};

/// Derived monetary summary of one invoice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub subtotal: f64,
    pub tax_amount: f64,
    pub discount_amount: f64,
    pub total: f64,
}

/// Effective amount of one line item.
///
/// Uses the explicit `amount` override when present, otherwise
/// `quantity * unit_rate`, with every factor coerced to a non-negative
/// finite number first.
pub fn item_amount(item: &LineItem) -> f64 {
    match item.amount {
        Some(amount) => sanitize(amount),
        None => sanitize(item.quantity) * sanitize(item.unit_rate),
    }
}

/// Computes the full monetary summary for a set of line items and rates.
///
/// Invoked on every item mutation and before any persistence of an
/// invoice; stored totals are always the output of this function.
pub fn compute_totals(
    items: &[LineItem],
    tax_rate_percent: f64,
    discount_kind: DiscountKind,
    discount_value: f64,
) -> InvoiceTotals {
    let subtotal: f64 = items.iter().map(item_amount).sum();
    let tax_amount = subtotal * sanitize(tax_rate_percent) / 100.0;

    let discount_raw = match discount_kind {
        DiscountKind::Percentage => subtotal * sanitize(discount_value) / 100.0,
        DiscountKind::Fixed => sanitize(discount_value),
    };
    // A discount can never exceed what is being discounted; this keeps the
    // total from going negative.
    let discount_amount = discount_raw.min(subtotal);

    InvoiceTotals {
        subtotal,
        tax_amount,
        discount_amount,
        total: subtotal + tax_amount - discount_amount,
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
