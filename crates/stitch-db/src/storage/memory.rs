//! In-memory implementation of [`Storage`] for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use stitch_core::{Entity, EntityKind};

use super::Storage;
use crate::error::{DbError, DbResult};

/// One stored document.
#[derive(Debug, Clone)]
struct Doc {
    seq: u64,
    active: bool,
    payload: serde_json::Value,
}

#[derive(Debug, Default)]
struct Inner {
    next_seq: u64,
    docs: HashMap<(EntityKind, String), Doc>,
}

/// In-memory store.
///
/// Entities pass through `serde_json` exactly like they do for SQLite, so
/// serialization bugs surface in unit tests too. Uses RwLock for
/// thread-safe access; clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    fn list<E: Entity>(&self, active_only: bool) -> DbResult<Vec<E>> {
        let inner = self
            .inner
            .read()
            .map_err(|e| DbError::Internal(format!("Failed to acquire read lock: {}", e)))?;

        let mut docs: Vec<&Doc> = inner
            .docs
            .iter()
            .filter(|((kind, _), doc)| *kind == E::KIND && (doc.active || !active_only))
            .map(|(_, doc)| doc)
            .collect();
        docs.sort_by_key(|doc| doc.seq);

        docs.into_iter()
            .map(|doc| serde_json::from_value(doc.payload.clone()).map_err(DbError::from))
            .collect()
    }
}

#[async_trait]
impl Storage for MemoryStore {
    async fn get<E: Entity>(&self, id: &str) -> DbResult<Option<E>> {
        let inner = self
            .inner
            .read()
            .map_err(|e| DbError::Internal(format!("Failed to acquire read lock: {}", e)))?;

        match inner.docs.get(&(E::KIND, id.to_string())) {
            Some(doc) => Ok(Some(serde_json::from_value(doc.payload.clone())?)),
            None => Ok(None),
        }
    }

    async fn save<E: Entity>(&self, entity: &E) -> DbResult<String> {
        let payload = serde_json::to_value(entity)?;
        let id = entity.id().to_string();

        let mut inner = self
            .inner
            .write()
            .map_err(|e| DbError::Internal(format!("Failed to acquire write lock: {}", e)))?;

        let key = (E::KIND, id.clone());
        let existing = inner.docs.get(&key).map(|doc| doc.seq);
        let seq = match existing {
            Some(seq) => seq,
            None => {
                inner.next_seq += 1;
                inner.next_seq
            }
        };

        inner.docs.insert(
            key,
            Doc {
                seq,
                active: entity.is_active(),
                payload,
            },
        );

        Ok(id)
    }

    async fn find_all_active<E: Entity>(&self) -> DbResult<Vec<E>> {
        self.list(true)
    }

    async fn find_all<E: Entity>(&self) -> DbResult<Vec<E>> {
        self.list(false)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::contract;

    #[tokio::test]
    async fn test_get_returns_saved_entity() {
        contract::get_returns_saved_entity(MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_get_is_scoped_by_kind() {
        contract::get_is_scoped_by_kind(MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_save_replaces_and_tracks_lifecycle() {
        contract::save_replaces_and_tracks_lifecycle(MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_listings_keep_insertion_order() {
        contract::listings_keep_insertion_order(MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_find_by_condition_filters() {
        contract::find_by_condition_filters(MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MemoryStore::new();
        let other = store.clone();
        let client = stitch_core::Client::new("Ana", chrono::Utc::now());
        store.save(&client).await.unwrap();

        let loaded: Option<stitch_core::Client> = other.get(&client.id).await.unwrap();
        assert!(loaded.is_some());
    }
}
