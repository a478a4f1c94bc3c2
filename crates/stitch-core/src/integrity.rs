//! # Referential Integrity Guards
//!
//! Preconditions for leaving the `Active` lifecycle state. The key/value
//! store has no foreign keys, so these checks are the only thing keeping a
//! soft delete from orphaning live records.
//!
//! ```text
//! ┌───────────┬─────────────────────────────────────────────────────────────┐
//! │ Target    │ Blocked while                                               │
//! ├───────────┼─────────────────────────────────────────────────────────────┤
//! │ Client    │ any active order is not DELIVERED / CANCELLED               │
//! │ Process   │ any active customization references it                      │
//! │ Product   │ any active line item of an active, not-delivered order      │
//! │           │ references it                                               │
//! └───────────┴─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The functions here are pure: the caller loads the referencing records
//! immediately before the delete and passes them in. Every blocker is
//! reported, not just the first one.

use std::collections::HashMap;

use crate::error::{Blocker, IntegrityViolation};
use crate::types::{Customization, Entity, EntityKind, LineItem, Order, OrderStatus};

/// Result of an integrity check.
pub type IntegrityResult = Result<(), IntegrityViolation>;

fn verdict(kind: EntityKind, id: &str, blockers: Vec<Blocker>) -> IntegrityResult {
    if blockers.is_empty() {
        Ok(())
    } else {
        Err(IntegrityViolation {
            kind,
            id: id.to_string(),
            blockers,
        })
    }
}

/// A client may be deleted once all of its active orders are delivered or
/// cancelled.
pub fn check_client_deletable(client_id: &str, orders: &[Order]) -> IntegrityResult {
    let blockers = orders
        .iter()
        .filter(|o| o.is_active() && o.client_id == client_id && !o.status.is_terminal())
        .map(|o| Blocker {
            kind: EntityKind::Order,
            id: o.id.clone(),
            status: Some(o.status),
        })
        .collect();

    verdict(EntityKind::Client, client_id, blockers)
}

/// A process may be deleted once no active customization uses it.
pub fn check_process_deletable(process_id: &str, customizations: &[Customization]) -> IntegrityResult {
    let blockers = customizations
        .iter()
        .filter(|c| c.is_active() && c.process_id == process_id)
        .map(|c| Blocker {
            kind: EntityKind::Customization,
            id: c.id.clone(),
            status: None,
        })
        .collect();

    verdict(EntityKind::Process, process_id, blockers)
}

/// A product may be deleted once no active line item of an active,
/// not-yet-delivered order references it.
///
/// Items whose order is missing from `orders` are treated as orphans and do
/// not block.
pub fn check_product_deletable(
    product_id: &str,
    items: &[LineItem],
    orders: &[Order],
) -> IntegrityResult {
    let live_orders: HashMap<&str, &Order> = orders
        .iter()
        .filter(|o| o.is_active() && o.status != OrderStatus::Delivered)
        .map(|o| (o.id.as_str(), o))
        .collect();

    let blockers = items
        .iter()
        .filter(|i| i.is_active() && i.product_id == product_id)
        .filter_map(|i| live_orders.get(i.order_id.as_str()).map(|o| (i, *o)))
        .map(|(item, order)| Blocker {
            kind: EntityKind::LineItem,
            id: item.id.clone(),
            status: Some(order.status),
        })
        .collect();

    verdict(EntityKind::Product, product_id, blockers)
}

// =============================================================================
// Unit Tests
// =============================================================================
