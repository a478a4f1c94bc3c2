//! # Error Types
//!
//! Domain-specific error types for stitch-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stitch-core errors (this file)                                        │
//! │  ├── ValidationError     - Bad user input (dimensions, quantities)     │
//! │  ├── CoreError           - Pricing setup, status and lifecycle errors  │
//! │  └── IntegrityViolation  - Structured refusal of a soft delete         │
//! │                                                                         │
//! │  stitch-db errors (separate crate)                                     │
//! │  └── DbError             - Storage failures, wraps CoreError           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → route layer             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Input errors mean the caller sent bad numbers; configuration errors mean
//! a process record was never fully set up. Neither is retried.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use ts_rs::TS;

use crate::types::{EntityKind, OrderStatus};

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations and domain logic failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid user input (non-positive dimensions, bad quantities, ...).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A process lacks a pricing parameter its kind requires.
    ///
    /// ## When This Occurs
    /// - Embroidery tier missing from `price_by_size`
    /// - Roll material width configured as zero
    #[error("Process {process_id} is missing pricing parameter '{parameter}'")]
    PricingNotConfigured {
        process_id: String,
        parameter: String,
    },

    /// A pricing rule was requested for a process of another kind.
    #[error("Process {process_id} is {actual}, expected {expected}")]
    ProcessKindMismatch {
        process_id: String,
        expected: String,
        actual: String,
    },

    /// Order status change not allowed by the order state machine.
    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        order_id: String,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Order is delivered or cancelled; its contents are frozen.
    #[error("Order {order_id} is {status} and can no longer be edited")]
    OrderNotEditable { order_id: String, status: OrderStatus },

    /// Referenced entity exists but has been soft-deleted.
    #[error("{kind} {id} has been deleted")]
    Inactive { kind: EntityKind, id: String },

    /// Product does not offer the requested size.
    #[error("Size '{size}' is not available for product {product_id}")]
    SizeUnavailable { product_id: String, size: String },

    /// Product does not offer the requested color.
    #[error("Color '{color}' is not available for product {product_id}")]
    ColorUnavailable { product_id: String, color: String },

    /// A soft delete was refused by a referential-integrity guard.
    #[error("{0}")]
    Integrity(#[from] IntegrityViolation),
}

impl CoreError {
    /// Creates a PricingNotConfigured error.
    pub fn not_configured(process_id: impl Into<String>, parameter: impl Into<String>) -> Self {
        CoreError::PricingNotConfigured {
            process_id: process_id.into(),
            parameter: parameter.into(),
        }
    }

    /// Whether this error was caused by caller input rather than setup data.
    pub fn is_input_error(&self) -> bool {
        matches!(self, CoreError::Validation(_))
    }

    /// Whether this error points at an incompletely configured process.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            CoreError::PricingNotConfigured { .. } | CoreError::ProcessKindMismatch { .. }
        )
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Measurement below the smallest accepted value.
    #[error("{field} must be at least {min}")]
    BelowMinimum { field: String, min: f64 },

    /// Invalid format (e.g., invalid UUID, invalid email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    pub fn must_be_positive(field: impl Into<String>) -> Self {
        ValidationError::MustBePositive {
            field: field.into(),
        }
    }

    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
}

// =============================================================================
// Integrity Violation
// =============================================================================

/// One live reference that prevents a soft delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Blocker {
    /// Kind of the referencing entity.
    pub kind: EntityKind,
    /// Identifier of the referencing entity.
    pub id: String,
    /// Status of the referencing order, when the blocker is an order.
    pub status: Option<OrderStatus>,
}

/// A soft delete refused because live records still reference the target.
///
/// Returned as a value (a structured refusal), never as a panic. The
/// storage layer wraps it in `DeleteOutcome::Refused`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityViolation {
    pub kind: EntityKind,
    pub id: String,
    pub blockers: Vec<Blocker>,
}

impl IntegrityViolation {
    /// Distinct order statuses among the blockers, in first-seen order.
    pub fn blocking_statuses(&self) -> Vec<OrderStatus> {
        let mut statuses = Vec::new();
        for status in self.blockers.iter().filter_map(|b| b.status) {
            if !statuses.contains(&status) {
                statuses.push(status);
            }
        }
        statuses
    }
}

impl fmt::Display for IntegrityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} is still referenced by {} record(s):",
            self.kind,
            self.id,
            self.blockers.len()
        )?;
        for blocker in &self.blockers {
            match blocker.status {
                Some(status) => write!(f, " {} {} ({})", blocker.kind, blocker.id, status)?,
                None => write!(f, " {} {}", blocker.kind, blocker.id)?,
            }
        }
        Ok(())
    }
}

impl std::error::Error for IntegrityViolation {}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
