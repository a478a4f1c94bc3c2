//! # Reports
//!
//! Read-only summaries over already-loaded records. Soft-deleted and
//! cancelled orders never count toward revenue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use ts_rs::TS;

use crate::money::{Money, Percent};
use crate::process::{Process, ProcessKind};
use crate::types::{Customization, Entity, LineItem, Order, OrderStatus};

// =============================================================================
// Profit Summary
// =============================================================================

/// Margin statistics across orders.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProfitSummary {
    pub order_count: i64,
    /// Mean of the orders' profit margin percentages.
    pub average_margin: Percent,
    pub min_margin: Option<Percent>,
    pub max_margin: Option<Percent>,
    pub total_profit: Money,
    pub total_revenue: Money,
    pub total_outstanding: Money,
}

fn counts_toward_revenue(order: &Order) -> bool {
    order.is_active() && order.status != OrderStatus::Cancelled
}

/// Summarizes margins and money over active, non-cancelled orders.
pub fn profit_summary(orders: &[Order]) -> ProfitSummary {
    let relevant: Vec<&Order> = orders.iter().filter(|o| counts_toward_revenue(o)).collect();
    if relevant.is_empty() {
        return ProfitSummary::default();
    }

    let count = relevant.len() as u64;
    let margin_sum: u64 = relevant.iter().map(|o| o.profit_margin.bps() as u64).sum();

    ProfitSummary {
        order_count: relevant.len() as i64,
        average_margin: Percent::from_bps(((margin_sum + count / 2) / count) as u32),
        min_margin: relevant.iter().map(|o| o.profit_margin).min(),
        max_margin: relevant.iter().map(|o| o.profit_margin).max(),
        total_profit: relevant.iter().map(|o| o.profit).sum(),
        total_revenue: relevant.iter().map(|o| o.total).sum(),
        total_outstanding: relevant
            .iter()
            .filter(|o| o.outstanding.is_positive())
            .map(|o| o.outstanding)
            .sum(),
    }
}

// =============================================================================
// Revenue by Process
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProcessRevenue {
    pub kind: ProcessKind,
    pub customization_count: i64,
    pub revenue: Money,
}

/// Sums active customization subtotals per process kind.
///
/// Only customizations whose line item is active and belongs to an order
/// that counts toward revenue are included, matching [`profit_summary`].
/// Every kind appears in the result, in `ProcessKind::ALL` order.
/// Customizations pointing at unknown processes are skipped.
pub fn revenue_by_process(
    processes: &[Process],
    customizations: &[Customization],
    items: &[LineItem],
    orders: &[Order],
) -> Vec<ProcessRevenue> {
    let kinds: HashMap<&str, ProcessKind> = processes
        .iter()
        .map(|p| (p.id.as_str(), p.kind()))
        .collect();

    let counted_orders: HashSet<&str> = orders
        .iter()
        .filter(|o| counts_toward_revenue(o))
        .map(|o| o.id.as_str())
        .collect();
    let counted_items: HashSet<&str> = items
        .iter()
        .filter(|i| i.is_active() && counted_orders.contains(i.order_id.as_str()))
        .map(|i| i.id.as_str())
        .collect();

    let mut totals: HashMap<ProcessKind, (i64, Money)> = HashMap::new();
    for custom in customizations
        .iter()
        .filter(|c| c.is_active() && counted_items.contains(c.line_item_id.as_str()))
    {
        if let Some(kind) = kinds.get(custom.process_id.as_str()) {
            let entry = totals.entry(*kind).or_default();
            entry.0 += 1;
            entry.1 += custom.subtotal;
        }
    }

    ProcessKind::ALL
        .iter()
        .map(|kind| {
            let (count, revenue) = totals.get(kind).copied().unwrap_or_default();
            ProcessRevenue {
                kind: *kind,
                customization_count: count,
                revenue,
            }
        })
        .collect()
}

// =============================================================================
// Overdue
// =============================================================================

/// Active orders past their estimated delivery, oldest deadline first.
pub fn overdue_orders(orders: &[Order], now: DateTime<Utc>) -> Vec<&Order> {
    let mut late: Vec<&Order> = orders
        .iter()
        .filter(|o| o.is_active() && o.is_overdue(now))
        .collect();
    late.sort_by_key(|o| o.estimated_delivery);
    late
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn order(margin_bps: u32, total_cents: i64) -> Order {
        let now = Utc::now();
        let mut order = Order::new(
            "c",
            "ORD",
            Percent::from_bps(1600),
            Percent::from_bps(margin_bps),
            now + Duration::days(7),
            now,
        );
        order.total = Money::from_cents(total_cents);
        order.outstanding = Money::from_cents(total_cents);
        order.profit = Money::from_cents(total_cents / 10);
        order
    }

    #[test]
    fn test_profit_summary_empty() {
        let summary = profit_summary(&[]);
        assert_eq!(summary.order_count, 0);
        assert_eq!(summary.min_margin, None);
    }

    #[test]
    fn test_profit_summary() {
        let mut cancelled = order(9000, 1_000_000);
        cancelled.status = OrderStatus::Cancelled;
        let orders = vec![order(2000, 10_000), order(4000, 20_000), cancelled];

        let summary = profit_summary(&orders);
        assert_eq!(summary.order_count, 2);
        assert_eq!(summary.average_margin, Percent::from_bps(3000));
        assert_eq!(summary.min_margin, Some(Percent::from_bps(2000)));
        assert_eq!(summary.max_margin, Some(Percent::from_bps(4000)));
        assert_eq!(summary.total_revenue, Money::from_cents(30_000));
        assert_eq!(summary.total_profit, Money::from_cents(3_000));
        assert_eq!(summary.total_outstanding, Money::from_cents(30_000));
    }

    fn item_of(order: &Order) -> LineItem {
        LineItem::new(&order.id, "tee", "M", "White", 1, Money::from_cents(5_000), Utc::now())
    }

    #[test]
    fn test_revenue_by_process() {
        let now = Utc::now();
        let dtf = Process::with_defaults("DTF", ProcessKind::Dtf, now);
        let vinyl = Process::with_defaults("Vinyl", ProcessKind::Vinyl, now);
        let open = order(3000, 0);
        let item = item_of(&open);
        let mut removed = Customization::new(&item.id, &vinyl.id, 1, Money::from_cents(500), now);
        removed.mark_deleted(now);

        let customs = vec![
            Customization::new(&item.id, &dtf.id, 2, Money::from_cents(1_000), now),
            Customization::new(&item.id, &dtf.id, 1, Money::from_cents(300), now),
            Customization::new(&item.id, "unknown", 1, Money::from_cents(999), now),
            removed,
        ];

        let report = revenue_by_process(&[dtf, vinyl], &customs, &[item], &[open]);
        assert_eq!(report.len(), 4);
        assert_eq!(report[0].kind, ProcessKind::Dtf);
        assert_eq!(report[0].customization_count, 2);
        assert_eq!(report[0].revenue, Money::from_cents(2_300));
        assert_eq!(report[3].kind, ProcessKind::Vinyl);
        assert_eq!(report[3].revenue, Money::zero());
    }

    #[test]
    fn test_revenue_by_process_skips_cancelled_and_deleted_orders() {
        let now = Utc::now();
        let dtf = Process::with_defaults("DTF", ProcessKind::Dtf, now);

        let open = order(3000, 0);
        let mut cancelled = order(3000, 0);
        cancelled.status = OrderStatus::Cancelled;
        let mut deleted = order(3000, 0);
        deleted.mark_deleted(now);
        let open_item = item_of(&open);
        let mut removed_item = item_of(&open);
        removed_item.mark_deleted(now);
        let cancelled_item = item_of(&cancelled);
        let deleted_item = item_of(&deleted);

        let customs: Vec<Customization> = [&open_item, &removed_item, &cancelled_item, &deleted_item]
            .iter()
            .map(|item| Customization::new(&item.id, &dtf.id, 1, Money::from_cents(2_000), now))
            .collect();

        let report = revenue_by_process(
            &[dtf],
            &customs,
            &[open_item, removed_item, cancelled_item, deleted_item],
            &[open, cancelled, deleted],
        );
        assert_eq!(report[0].customization_count, 1);
        assert_eq!(report[0].revenue, Money::from_cents(2_000));
    }

    #[test]
    fn test_overdue_orders() {
        let now = Utc::now();
        let on_time = order(3000, 100);
        let mut late = order(3000, 100);
        late.estimated_delivery = now - Duration::days(2);
        let mut later = order(3000, 100);
        later.estimated_delivery = now - Duration::days(5);

        let orders = vec![on_time, late.clone(), later.clone()];
        let overdue = overdue_orders(&orders, now);
        assert_eq!(overdue.len(), 2);
        assert_eq!(overdue[0].id, later.id);
        assert_eq!(overdue[1].id, late.id);
    }
}
