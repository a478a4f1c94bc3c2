//! # Storage Collaborator
//!
//! A key/value store addressed by `(kind, id)` with type-scoped
//! enumeration and no transactions. Services receive a [`Storage`]
//! implementation explicitly; there is no global handle.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  OrderService / CatalogService                                         │
//! │        │  get::<Order>(id)   save(&item)   find_all_active::<Client>() │
//! │        ▼                                                               │
//! │  ┌─────────────────────────────┐    ┌─────────────────────────────┐    │
//! │  │ SqliteStore                 │    │ MemoryStore                 │    │
//! │  │ entities table, JSON docs   │    │ RwLock<HashMap>, JSON docs  │    │
//! │  └─────────────────────────────┘    └─────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both adapters store the serde representation of the entity. Enums are
//! mapped to their wire strings by serde at this boundary; the in-memory
//! value is never rewritten to make it storable.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use stitch_core::Entity;

use crate::error::DbResult;

/// Point load/save and type-scoped enumeration over entity documents.
///
/// Listings are returned in insertion order.
#[async_trait]
pub trait Storage: Clone + Send + Sync + 'static {
    /// Loads one entity of type `E`, active or not.
    async fn get<E: Entity>(&self, id: &str) -> DbResult<Option<E>>;

    /// Inserts or replaces the entity. Returns its id.
    async fn save<E: Entity>(&self, entity: &E) -> DbResult<String>;

    /// Every active entity of type `E`.
    async fn find_all_active<E: Entity>(&self) -> DbResult<Vec<E>>;

    /// Every entity of type `E`, including soft-deleted ones.
    async fn find_all<E: Entity>(&self) -> DbResult<Vec<E>>;

    /// Entities of type `E` (active or not) matching `predicate`.
    async fn find_by_condition<E, P>(&self, predicate: P) -> DbResult<Vec<E>>
    where
        E: Entity,
        P: Fn(&E) -> bool + Send + Sync,
    {
        let all = self.find_all::<E>().await?;
        Ok(all.into_iter().filter(|e| predicate(e)).collect())
    }
}

// =============================================================================
// Shared Adapter Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod contract {
    //! Behaviour every adapter must show; run against both stores.

    use super::*;
    use chrono::Utc;
    use stitch_core::process::{Process, ProcessKind};
    use stitch_core::{Client, Lifecycle, Money, Order, OrderStatus, Percent};

    pub async fn get_returns_saved_entity<S: Storage>(store: S) {
        let now = Utc::now();
        let mut client = Client::new("Ana", now);
        client.email = Some("ana@example.com".to_string());

        let id = store.save(&client).await.unwrap();
        assert_eq!(id, client.id);

        let loaded: Client = store.get(&id).await.unwrap().unwrap();
        assert_eq!(loaded.email.as_deref(), Some("ana@example.com"));
        assert_eq!(loaded.total_spent, Money::zero());
    }

    pub async fn get_is_scoped_by_kind<S: Storage>(store: S) {
        let client = Client::new("Ana", Utc::now());
        store.save(&client).await.unwrap();

        let as_order: Option<Order> = store.get(&client.id).await.unwrap();
        assert!(as_order.is_none());
        let missing: Option<Client> = store.get("nope").await.unwrap();
        assert!(missing.is_none());
    }

    pub async fn save_replaces_and_tracks_lifecycle<S: Storage>(store: S) {
        let now = Utc::now();
        let mut process = Process::with_defaults("DTF", ProcessKind::Dtf, now);
        store.save(&process).await.unwrap();

        process.name = "DTF 58cm".to_string();
        process.mark_deleted(now);
        store.save(&process).await.unwrap();

        let active: Vec<Process> = store.find_all_active().await.unwrap();
        assert!(active.is_empty());

        let all: Vec<Process> = store.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "DTF 58cm");
        assert_eq!(all[0].lifecycle, Lifecycle::Deleted);
        assert_eq!(all[0].kind(), ProcessKind::Dtf);
    }

    pub async fn listings_keep_insertion_order<S: Storage>(store: S) {
        let now = Utc::now();
        let names = ["Ana", "Beto", "Carla", "Dario"];
        for name in names {
            store.save(&Client::new(name, now)).await.unwrap();
        }

        let clients: Vec<Client> = store.find_all_active().await.unwrap();
        let listed: Vec<&str> = clients.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(listed, names);
    }

    pub async fn find_by_condition_filters<S: Storage>(store: S) {
        let now = Utc::now();
        for status in [OrderStatus::Pending, OrderStatus::Delivered, OrderStatus::Pending] {
            let mut order = Order::new("c-1", "ORD", Percent::zero(), Percent::zero(), now, now);
            order.status = status;
            store.save(&order).await.unwrap();
        }

        let pending: Vec<Order> = store
            .find_by_condition(|o: &Order| o.status == OrderStatus::Pending)
            .await
            .unwrap();
        assert_eq!(pending.len(), 2);
    }
}
