use gigbook_core::{compute_totals, DiscountKind, InvoiceTotals, LineItem};

const EPSILON: f64 = 1e-9;

#[test]
fn empty_item_list_yields_all_zero_totals() {
    let totals = compute_totals(&[], 10.0, DiscountKind::Percentage, 5.0);
    assert_eq!(totals, InvoiceTotals::default());
}

#[test]
fn amount_override_wins_over_quantity_times_rate() {
    let items = vec![LineItem {
        description: "Fixed-bid feature".to_string(),
        quantity: 10.0,
        unit_rate: 50.0,
        amount: Some(100.0),
    }];
    let totals = compute_totals(&items, 0.0, DiscountKind::Percentage, 0.0);
    assert!((totals.subtotal - 100.0).abs() < EPSILON);
}

#[test]
fn percentage_discount_and_tax_apply_to_subtotal() {
    let items = vec![LineItem::flat("Sprint", 100.0)];
    let totals = compute_totals(&items, 10.0, DiscountKind::Percentage, 20.0);
    assert!((totals.subtotal - 100.0).abs() < EPSILON);
    assert!((totals.tax_amount - 10.0).abs() < EPSILON);
    assert!((totals.discount_amount - 20.0).abs() < EPSILON);
    assert!((totals.total - 90.0).abs() < EPSILON);
}

#[test]
fn fixed_discount_larger_than_subtotal_is_clamped() {
    let items = vec![LineItem::flat("Small fix", 50.0)];
    let totals = compute_totals(&items, 0.0, DiscountKind::Fixed, 1000.0);
    assert!((totals.discount_amount - 50.0).abs() < EPSILON);
    assert!(totals.total.abs() < EPSILON);
}

#[test]
fn negative_and_nan_inputs_are_coerced_to_zero() {
    let items = vec![
        LineItem::new("Bad quantity", -4.0, 100.0),
        LineItem::new("Bad rate", 5.0, f64::NAN),
        LineItem::flat("Good line", 80.0),
    ];
    let totals = compute_totals(&items, -10.0, DiscountKind::Percentage, f64::NAN);
    assert!((totals.subtotal - 80.0).abs() < EPSILON);
    assert!(totals.tax_amount.abs() < EPSILON);
    assert!(totals.discount_amount.abs() < EPSILON);
    assert!((totals.total - 80.0).abs() < EPSILON);
}

#[test]
fn totals_identity_holds() {
    let items = vec![
        LineItem::new("Consulting", 12.5, 90.0),
        LineItem::new("Travel time", 3.0, 45.0),
        LineItem::flat("Rush fee", 150.0),
    ];
    let totals = compute_totals(&items, 21.0, DiscountKind::Fixed, 75.0);
    let identity = totals.subtotal + totals.tax_amount - totals.discount_amount;
    assert!((totals.total - identity).abs() < EPSILON);
    assert!(totals.total >= 0.0);
}

#[test]
fn computation_is_idempotent() {
    let items = vec![LineItem::new("Retainer", 2.0, 400.0)];
    let first = compute_totals(&items, 19.0, DiscountKind::Percentage, 10.0);
    let second = compute_totals(&items, 19.0, DiscountKind::Percentage, 10.0);
    assert_eq!(first, second);
}
