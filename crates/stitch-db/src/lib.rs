//! # stitch-db: Storage and Services for Stitchworks
//!
//! Everything in Stitchworks that touches storage lives here: the
//! [`Storage`] collaborator with its SQLite and in-memory adapters, and the
//! services that load records, call `stitch-core`, and save the results.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stitchworks Data Flow                            │
//! │                                                                         │
//! │  Route layer (add_line_item form, delete button, ...)                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    stitch-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐   │   │
//! │  │   │   Services    │    │   Storage     │    │  Database    │   │   │
//! │  │   │ (service/)    │    │ (storage/)    │    │  (pool.rs)   │   │   │
//! │  │   │               │    │               │    │              │   │   │
//! │  │   │ OrderService  │───►│ SqliteStore   │───►│ SqlitePool   │   │   │
//! │  │   │ CatalogSvc    │    │ MemoryStore   │    │ migrations   │   │   │
//! │  │   │ ReportService │    │               │    │              │   │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘   │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   stitchworks.db (STITCH_DATABASE_PATH)                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Shop settings from `STITCH_*` environment variables
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`storage`] - Storage trait and adapters
//! - [`service`] - Order, catalog and report services
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stitch_db::{Database, OrderService, ShopConfig};
//!
//! let config = ShopConfig::from_env()?;
//! let db = Database::new(config.db_config()).await?;
//!
//! let orders = OrderService::new(db.store(), config);
//! let order = orders.recompute_totals(&order_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod service;
pub mod storage;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, ShopConfig};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use storage::{MemoryStore, SqliteStore, Storage};

pub use service::{
    CatalogService, DeleteOutcome, LineItemDetail, LineItemUpdate, NewClient, NewCustomization,
    NewLineItem, NewOrder, NewProduct, OrderDetail, OrderService, ReportService,
};
