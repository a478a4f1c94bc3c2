//! # Services
//!
//! Request-sized operations for the route layer. Each one loads what it
//! needs through [`Storage`](crate::storage::Storage), calls stitch-core,
//! and saves the result before returning. Nothing is deferred.
//!
//! - [`OrderService`] - orders, line items, customizations, payments, status
//! - [`CatalogService`] - clients, products, processes, guarded soft delete
//! - [`ReportService`] - margin, revenue and overdue summaries
//!
//! ## Known Limitation
//! The store has no transactions. Guarded deletes re-read references right
//! before flipping the lifecycle, but two concurrent requests can still
//! interleave between the read and the write.

pub mod catalog;
pub mod order;
pub mod report;

pub use catalog::{CatalogService, NewClient, NewProduct};
pub use order::{
    LineItemDetail, LineItemUpdate, NewCustomization, NewLineItem, NewOrder, OrderDetail,
    OrderService,
};
pub use report::ReportService;

use serde::Serialize;
use stitch_core::{Entity, IntegrityViolation};

use crate::error::{DbError, DbResult};
use crate::storage::Storage;

/// Loads an entity or fails with `NotFound`.
pub(crate) async fn load<S: Storage, E: Entity>(store: &S, id: &str) -> DbResult<E> {
    store
        .get::<E>(id)
        .await?
        .ok_or_else(|| DbError::not_found(E::KIND.as_str(), id))
}

/// Loads an entity that must still be active.
pub(crate) async fn load_active<S: Storage, E: Entity>(store: &S, id: &str) -> DbResult<E> {
    let entity: E = load(store, id).await?;
    entity.ensure_active()?;
    Ok(entity)
}

/// Result of a guarded soft delete.
///
/// A refusal is an ordinary value, not an error, so a caller processing
/// several deletes can report it and carry on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "violation", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeleteOutcome {
    Deleted,
    Refused(IntegrityViolation),
}

impl DeleteOutcome {
    pub fn is_deleted(&self) -> bool {
        matches!(self, DeleteOutcome::Deleted)
    }

    /// The refusal, if the delete was blocked.
    pub fn violation(&self) -> Option<&IntegrityViolation> {
        match self {
            DeleteOutcome::Deleted => None,
            DeleteOutcome::Refused(violation) => Some(violation),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stitch_core::{Blocker, EntityKind, OrderStatus};

    #[test]
    fn test_delete_outcome_json() {
        let refused = DeleteOutcome::Refused(IntegrityViolation {
            kind: EntityKind::Client,
            id: "c-1".to_string(),
            blockers: vec![Blocker {
                kind: EntityKind::Order,
                id: "o-1".to_string(),
                status: Some(OrderStatus::Pending),
            }],
        });
        let json = serde_json::to_value(&refused).unwrap();
        assert_eq!(json["outcome"], "REFUSED");
        assert_eq!(json["violation"]["blockers"][0]["status"], "PENDING");
        assert!(!refused.is_deleted());

        let json = serde_json::to_value(DeleteOutcome::Deleted).unwrap();
        assert_eq!(json["outcome"], "DELETED");
    }
}
