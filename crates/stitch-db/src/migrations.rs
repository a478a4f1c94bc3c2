//! # Database Migrations
//!
//! Embedded SQL migrations for the entity document store.
//!
//! ## Schema
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  entities                                                               │
//! │  ┌──────────┬──────────┬────────┬──────────────┬────────────┬────────┐ │
//! │  │ kind     │ id       │ active │ payload      │ created_at │ upd_at │ │
//! │  ├──────────┼──────────┼────────┼──────────────┼────────────┼────────┤ │
//! │  │ order    │ 8c1f…    │ 1      │ {"id":…}     │ 2026-…     │ 2026-… │ │
//! │  │ process  │ 02ab…    │ 0      │ {"pricing":…}│ 2026-…     │ 2026-… │ │
//! │  └──────────┴──────────┴────────┴──────────────┴────────────┴────────┘ │
//! │  PRIMARY KEY (kind, id)     INDEX (kind, active)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every entity is one JSON document. There are no per-entity tables and
//! no foreign keys; referential integrity is enforced by the services.
//!
//! ## Adding New Migrations
//!
//! 1. Create a new file in `migrations/sqlite/` with the next sequence number
//! 2. Name format: `NNN_description.sql`
//! 3. **NEVER** modify existing migrations - always add new ones

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

/// Migrations embedded from `migrations/sqlite` at compile time.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Runs all pending database migrations.
///
/// Idempotent; each migration runs in its own transaction, in filename
/// order.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!("Checking for pending migrations");

    MIGRATOR.run(pool).await?;

    info!(count = MIGRATOR.migrations.len(), "All migrations applied");
    Ok(())
}

/// Returns `(total_migrations, applied_migrations)` for diagnostics.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    Ok((total, applied as usize))
}
