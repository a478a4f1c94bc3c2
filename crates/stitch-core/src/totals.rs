//! # Order Totals Aggregator
//!
//! Recomputes an order's money fields from its line items and their
//! customizations, bottom-up:
//!
//! ```text
//! Customization.subtotal = quoted_total, or unit_price × quantity
//!        │ Σ active, per item
//!        ▼
//! LineItem.customization_subtotal        LineItem.subtotal = unit_price × quantity
//!        │                                        │
//!        └──────────────── Σ active items ────────┘
//!                                 ▼
//!                          Order.subtotal
//!                                 │
//!              ┌──────────────────┼──────────────────┐
//!              ▼                  ▼                  ▼
//!     tax = subtotal×rate   total = subtotal+tax   profit = subtotal×margin
//!                                 │
//!                                 ▼
//!            outstanding = total − amount_paid,  fully_paid = outstanding ≤ 0
//! ```
//!
//! Stored subtotals are never trusted: a stale value is recomputed in place
//! and reported through [`Recomputation`] so the caller can persist the
//! repair. Profit is a margin report and is never subtracted from the total.
//!
//! The computation is integer-only, so running it twice over the same
//! inputs yields identical results.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Customization, Entity, LineItem, Order};

// =============================================================================
// Result Types
// =============================================================================

/// Derived money fields of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
    pub profit: Money,
    pub outstanding: Money,
    pub fully_paid: bool,
    pub item_count: i64,
}

/// Outcome of one aggregation pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Recomputation {
    pub totals: OrderTotals,
    /// Ids of line items whose stored subtotals were stale.
    pub repaired_items: Vec<String>,
    /// Ids of customizations whose stored subtotal was stale.
    pub repaired_customizations: Vec<String>,
}

impl Recomputation {
    /// Whether any child record was rewritten.
    pub fn has_repairs(&self) -> bool {
        !self.repaired_items.is_empty() || !self.repaired_customizations.is_empty()
    }
}

// =============================================================================
// Aggregation
// =============================================================================

/// Recomputes child subtotals in place and returns the order totals.
///
/// Inactive items and customizations, and customizations belonging to
/// items not in `items`, are ignored. The order itself is not modified;
/// apply the result with [`apply_totals`].
///
/// ```rust
/// use chrono::Utc;
/// use stitch_core::money::{Money, Percent};
/// use stitch_core::totals::compute_order_totals;
/// use stitch_core::types::{LineItem, Order};
///
/// let now = Utc::now();
/// let order = Order::new("c", "ORD-1", Percent::from_bps(1600), Percent::from_bps(3000), now, now);
/// let mut items = vec![LineItem::new(&order.id, "p", "M", "White", 2, Money::from_cents(5_000), now)];
/// let result = compute_order_totals(&order, &mut items, &mut []);
/// assert_eq!(result.totals.total.cents(), 11_600);
/// ```
pub fn compute_order_totals(
    order: &Order,
    items: &mut [LineItem],
    customizations: &mut [Customization],
) -> Recomputation {
    let mut result = Recomputation::default();

    for custom in customizations.iter_mut().filter(|c| c.is_active()) {
        let expected = custom.billed_subtotal();
        if custom.subtotal != expected {
            custom.subtotal = expected;
            result.repaired_customizations.push(custom.id.clone());
        }
    }

    let mut subtotal = Money::zero();
    let mut item_count = 0;

    for item in items
        .iter_mut()
        .filter(|i| i.is_active() && i.order_id == order.id)
    {
        let expected_subtotal = item.unit_price * item.quantity;
        let expected_custom: Money = customizations
            .iter()
            .filter(|c| c.is_active() && c.line_item_id == item.id)
            .map(|c| c.subtotal)
            .sum();

        if item.subtotal != expected_subtotal || item.customization_subtotal != expected_custom {
            item.subtotal = expected_subtotal;
            item.customization_subtotal = expected_custom;
            result.repaired_items.push(item.id.clone());
        }

        subtotal += item.line_total();
        item_count += 1;
    }

    let tax = subtotal.percent(order.tax_rate);
    let total = subtotal + tax;
    let outstanding = total - order.amount_paid;

    result.totals = OrderTotals {
        subtotal,
        tax,
        total,
        profit: subtotal.percent(order.profit_margin),
        outstanding,
        fully_paid: !outstanding.is_positive(),
        item_count,
    };
    result
}

/// Copies computed totals onto the order. Returns whether anything changed.
pub fn apply_totals(order: &mut Order, totals: &OrderTotals) -> bool {
    let changed = order.subtotal != totals.subtotal
        || order.tax != totals.tax
        || order.total != totals.total
        || order.profit != totals.profit
        || order.outstanding != totals.outstanding
        || order.fully_paid != totals.fully_paid
        || order.item_count != totals.item_count;

    order.subtotal = totals.subtotal;
    order.tax = totals.tax;
    order.total = totals.total;
    order.profit = totals.profit;
    order.outstanding = totals.outstanding;
    order.fully_paid = totals.fully_paid;
    order.item_count = totals.item_count;
    changed
}

// =============================================================================
// Unit Tests
// =============================================================================
