//! # Validation Module
//!
//! Input validation for the shop: names, quantities, design dimensions,
//! prices and percentages.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Route layer (forms)                                          │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Services (stitch-db)                                         │
//! │  └── THIS MODULE: Business rule validation before any save             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Pricing (stitch-core)                                        │
//! │  └── Dimensions re-checked at the formula, never silently defaulted    │
//! │                                                                         │
//! │  The key/value store has no constraints, so layer 2 is the last gate.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stitch_core::validation::{validate_dimension_cm, validate_quantity};
//!
//! validate_dimension_cm("width_cm", 10.0).unwrap();
//! validate_quantity(50).unwrap();
//! assert!(validate_dimension_cm("height_cm", 0.0).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::{Money, Percent};
use crate::{MAX_DIMENSION_CM, MAX_NAME_LENGTH, MAX_PRICE_CENTS, MAX_QUANTITY, MIN_DIMENSION_CM};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (client, product, process).
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most `MAX_NAME_LENGTH` characters
///
/// ```rust
/// use stitch_core::validation::validate_name;
///
/// assert!(validate_name("name", "Basic tee").is_ok());
/// assert!(validate_name("name", "   ").is_err());
/// ```
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required(field));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

/// Validates an optional email address.
///
/// Only the shape is checked: one `@` with text on both sides and a dot in
/// the domain.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must look like user@domain.tld".to_string(),
    };

    let (user, domain) = email.split_once('@').ok_or_else(invalid)?;
    if user.is_empty() || domain.contains('@') || !domain.contains('.') {
        return Err(invalid());
    }
    if domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid());
    }

    Ok(())
}

/// Validates a garment size or color label.
pub fn validate_variant(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an order quantity (line items, customizations).
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed `MAX_QUANTITY`
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::must_be_positive("quantity"));
    }

    if qty > MAX_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a design dimension in centimetres.
///
/// ## Rules
/// - Must be finite and strictly positive
/// - At least `MIN_DIMENSION_CM` (one millimetre)
/// - Must not exceed `MAX_DIMENSION_CM`
///
/// ```rust
/// use stitch_core::validation::validate_dimension_cm;
///
/// assert!(validate_dimension_cm("width_cm", 27.5).is_ok());
/// assert!(validate_dimension_cm("width_cm", -1.0).is_err());
/// assert!(validate_dimension_cm("width_cm", f64::NAN).is_err());
/// assert!(validate_dimension_cm("width_cm", 0.01).is_err());
/// ```
pub fn validate_dimension_cm(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::must_be_positive(field));
    }

    if value < MIN_DIMENSION_CM {
        return Err(ValidationError::BelowMinimum {
            field: field.to_string(),
            min: MIN_DIMENSION_CM,
        });
    }

    if value > MAX_DIMENSION_CM {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_DIMENSION_CM as i64,
        });
    }

    Ok(())
}

/// Validates a price.
///
/// ## Rules
/// - Must be non-negative
/// - Zero is allowed (promotional items, free setup)
/// - At most `MAX_PRICE_CENTS`
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() || price.cents() > MAX_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a payment amount. Must be strictly positive.
pub fn validate_payment_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::must_be_positive("payment amount"));
    }

    Ok(())
}

/// Validates a percentage (tax rate, profit margin, discount).
///
/// ## Rules
/// - Between 0% and 100% inclusive
pub fn validate_percent(field: &str, rate: Percent) -> ValidationResult<()> {
    if rate > Percent::FULL {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: Percent::FULL.bps() as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
