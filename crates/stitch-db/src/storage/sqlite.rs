//! # SQLite Store
//!
//! [`Storage`] over the `entities` table: one JSON document per entity.
//!
//! ## Save Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  save(&order)                                                           │
//! │     │                                                                   │
//! │     ├── serde_json::to_string(order)        (enums → wire strings)      │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  INSERT INTO entities (kind, id, active, payload, ...)                  │
//! │  ON CONFLICT (kind, id) DO UPDATE SET active, payload, updated_at       │
//! │                                                                         │
//! │  `seq` and `created_at` are written on first insert only, so listings  │
//! │  keep insertion order across updates.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Queries are runtime-checked (`sqlx::query`), so building the crate does
//! not need a `DATABASE_URL`.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use stitch_core::Entity;

use super::Storage;
use crate::error::DbResult;

/// Entity document store backed by a SQLite pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Creates a new SqliteStore.
    pub fn new(pool: SqlitePool) -> Self {
        SqliteStore { pool }
    }

    fn decode_all<E: Entity>(payloads: Vec<String>) -> DbResult<Vec<E>> {
        payloads
            .iter()
            .map(|payload| serde_json::from_str(payload).map_err(Into::into))
            .collect()
    }

    /// Number of stored documents of type `E`, active or not.
    pub async fn count<E: Entity>(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM entities WHERE kind = ?1")
            .bind(E::KIND)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl Storage for SqliteStore {
    async fn get<E: Entity>(&self, id: &str) -> DbResult<Option<E>> {
        let payload: Option<String> =
            sqlx::query_scalar("SELECT payload FROM entities WHERE kind = ?1 AND id = ?2")
                .bind(E::KIND)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        match payload {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    async fn save<E: Entity>(&self, entity: &E) -> DbResult<String> {
        let payload = serde_json::to_string(entity)?;
        let id = entity.id().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO entities (kind, id, active, payload, created_at, updated_at, seq)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5,
                    (SELECT COALESCE(MAX(seq), 0) + 1 FROM entities))
            ON CONFLICT (kind, id) DO UPDATE SET
                active = excluded.active,
                payload = excluded.payload,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(E::KIND)
        .bind(&id)
        .bind(entity.is_active())
        .bind(&payload)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        debug!(kind = %E::KIND, id = %id, active = entity.is_active(), "Saved entity");
        Ok(id)
    }

    async fn find_all_active<E: Entity>(&self) -> DbResult<Vec<E>> {
        let payloads: Vec<String> = sqlx::query_scalar(
            "SELECT payload FROM entities WHERE kind = ?1 AND active = 1 ORDER BY seq",
        )
        .bind(E::KIND)
        .fetch_all(&self.pool)
        .await?;

        Self::decode_all(payloads)
    }

    async fn find_all<E: Entity>(&self) -> DbResult<Vec<E>> {
        let payloads: Vec<String> =
            sqlx::query_scalar("SELECT payload FROM entities WHERE kind = ?1 ORDER BY seq")
                .bind(E::KIND)
                .fetch_all(&self.pool)
                .await?;

        Self::decode_all(payloads)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
