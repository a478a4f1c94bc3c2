//! # Database Error Types
//!
//! Error types for storage and service operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  sqlx::Error / serde_json::Error        CoreError (stitch-core)        │
//! │       │                                      │                          │
//! │       ▼                                      ▼                          │
//! │  DbError (this module) ◄──────── DbError::Core(#[from])                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Route layer maps to a user-facing message                             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Integrity refusals are not errors here: guarded deletes return
//! `DeleteOutcome::Refused` so the caller can keep going.

use stitch_core::CoreError;
use thiserror::Error;

/// Storage and service errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in storage.
    ///
    /// ## When This Occurs
    /// - Id doesn't exist
    /// - Id exists under another entity kind
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A stored document could not be encoded or decoded.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal storage error (poisoned lock, unexpected driver error).
    #[error("Internal database error: {0}")]
    Internal(String),

    /// Domain rule violation raised by stitch-core.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// The wrapped domain error, if any.
    pub fn as_core(&self) -> Option<&CoreError> {
        match self {
            DbError::Core(err) => Some(err),
            _ => None,
        }
    }
}

impl From<stitch_core::ValidationError> for DbError {
    fn from(err: stitch_core::ValidationError) -> Self {
        DbError::Core(err.into())
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → DbError::QueryFailed
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// sqlx::Error::PoolClosed     → DbError::ConnectionFailed
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },
            sqlx::Error::Database(db_err) => DbError::QueryFailed(db_err.message().to_string()),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),
            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Serialization(err.to_string())
    }
}

/// Result type for storage and service operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use stitch_core::ValidationError;

    #[test]
    fn test_core_error_passes_through() {
        let err: DbError = CoreError::not_configured("p-1", "price_per_meter").into();
        assert_eq!(
            err.to_string(),
            "Process p-1 is missing pricing parameter 'price_per_meter'"
        );
        assert!(err.as_core().is_some_and(|e| e.is_configuration_error()));
    }

    #[test]
    fn test_validation_error_converts() {
        let err: DbError = ValidationError::required("name").into();
        assert!(err.as_core().is_some_and(|e| e.is_input_error()));
    }

    #[test]
    fn test_serde_error_converts() {
        let err: DbError = serde_json::from_str::<i32>("nope").unwrap_err().into();
        assert!(matches!(err, DbError::Serialization(_)));
    }
}
