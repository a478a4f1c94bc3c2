//! # Pricing Engine
//!
//! Pure functions that turn a design, a quantity and a [`Process`] record
//! into a price. Nothing here reads storage or the clock.
//!
//! ## Calculators
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        quote(process, spec, qty)                        │
//! │                                   │                                     │
//! │         ┌─────────────────────────┼─────────────────────────┐           │
//! │         ▼                         ▼                         ▼           │
//! │   roll_quote()             embroidery_price()         vinyl_price()     │
//! │   DTF / SUBLIMATION        EMBROIDERY                 VINYL             │
//! │   metres of roll ×         tier price × qty           area × rate ×     │
//! │   price per metre          + optional setup           qty               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Roll Packing
//! ```text
//!        material_width_cm (27.5)
//!   ┌──────────┬──────────┬─────┐
//!   │  design  │  design  │waste│  copies_per_row = floor(27.5 / 10) = 2
//!   ├──────────┼──────────┼─────┤
//!   │  design  │  design  │     │  copies_per_linear_meter = floor(100 / 10) = 10
//!   ├──────────┼──────────┤     │
//!   │   ...    │   ...    │     │  50 copies / 20 per metre → 3 metres
//!   └──────────┴──────────┴─────┘
//! ```
//!
//! Metres are rounded up with exact integer ceiling division, so the billed
//! length always covers the requested quantity and is a whole number of
//! metres.
//!
//! ## Errors
//! - Non-finite dimensions, or dimensions outside
//!   `MIN_DIMENSION_CM..=MAX_DIMENSION_CM` → `CoreError::Validation`
//! - Embroidery or vinyl quantity outside `1..=MAX_QUANTITY`, or a roll
//!   quantity above `MAX_QUANTITY` → `CoreError::Validation`
//! - A price that would leave the i64 cent range → `CoreError::Validation`
//! - Missing or unusable process parameters → `CoreError::PricingNotConfigured`
//! - Spec of another kind than the process → `CoreError::ProcessKindMismatch`

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::process::{CustomizationSpec, Process, ProcessKind, SizeTier};
use crate::validation::{validate_dimension_cm, validate_quantity};

/// Centimetres in one linear metre of roll.
const CM_PER_METER: f64 = 100.0;

/// A product of configured rates and quantity that does not fit in cents.
fn price_overflow() -> CoreError {
    ValidationError::OutOfRange {
        field: "price".to_string(),
        min: 0,
        max: i64::MAX,
    }
    .into()
}

// =============================================================================
// Roll Quote (DTF / Sublimation)
// =============================================================================

/// Packing result and price for a roll-fed process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RollQuote {
    pub copies_per_row: u64,
    pub copies_per_linear_meter: u64,
    pub copies_per_square_meter: u64,
    pub meters_needed: u64,
    pub price: Money,
}

impl RollQuote {
    fn empty() -> Self {
        RollQuote {
            copies_per_row: 0,
            copies_per_linear_meter: 0,
            copies_per_square_meter: 0,
            meters_needed: 0,
            price: Money::zero(),
        }
    }
}

/// Computes metres of material and price for `quantity` copies of a
/// `width_cm × height_cm` design.
///
/// A design wider than the roll still consumes a full row, so capacity is
/// never reported as zero. A quantity of zero or less costs nothing and
/// skips the packing math.
///
/// ```rust
/// use chrono::Utc;
/// use stitch_core::pricing::roll_quote;
/// use stitch_core::process::{Process, ProcessKind};
///
/// let dtf = Process::with_defaults("DTF", ProcessKind::Dtf, Utc::now());
/// let quote = roll_quote(&dtf, 10.0, 10.0, 50).unwrap();
/// assert_eq!(quote.meters_needed, 3);
/// assert_eq!(quote.price.cents(), 60_000);
/// ```
pub fn roll_quote(
    process: &Process,
    width_cm: f64,
    height_cm: f64,
    quantity: i64,
) -> CoreResult<RollQuote> {
    let params = process.roll()?;

    validate_dimension_cm("width_cm", width_cm)?;
    validate_dimension_cm("height_cm", height_cm)?;

    if quantity <= 0 {
        return Ok(RollQuote::empty());
    }
    validate_quantity(quantity)?;

    if !params.material_width_cm.is_finite() || params.material_width_cm <= 0.0 {
        return Err(CoreError::not_configured(&process.id, "material_width_cm"));
    }
    if params.price_per_meter.is_negative() {
        return Err(CoreError::not_configured(&process.id, "price_per_meter"));
    }

    let copies_per_row = ((params.material_width_cm / width_cm).floor() as u64).max(1);
    let copies_per_linear_meter = ((CM_PER_METER / height_cm).floor() as u64).max(1);
    let copies_per_square_meter = copies_per_row
        .checked_mul(copies_per_linear_meter)
        .ok_or_else(price_overflow)?;
    let meters_needed = (quantity as u64).div_ceil(copies_per_square_meter);

    let price = i64::try_from(meters_needed)
        .ok()
        .and_then(|meters| params.price_per_meter.checked_mul(meters))
        .ok_or_else(price_overflow)?;

    Ok(RollQuote {
        copies_per_row,
        copies_per_linear_meter,
        copies_per_square_meter,
        meters_needed,
        price,
    })
}

// =============================================================================
// Embroidery
// =============================================================================

/// `price_by_size[tier] × quantity`, plus the setup price when requested.
///
/// A tier missing from the process is a configuration error; it is never
/// priced as zero. The quantity must be in `1..=MAX_QUANTITY`: zero pieces
/// never pay the setup fee alone.
pub fn embroidery_price(
    process: &Process,
    tier: SizeTier,
    include_setup: bool,
    quantity: i64,
) -> CoreResult<Money> {
    let params = process.embroidery()?;

    validate_quantity(quantity)?;

    let unit = params.price_by_size.get(&tier).copied().ok_or_else(|| {
        CoreError::not_configured(&process.id, format!("price_by_size.{}", tier))
    })?;

    let setup = if include_setup {
        params.setup_price
    } else {
        Money::zero()
    };

    unit.checked_mul(quantity)
        .and_then(|pieces| pieces.checked_add(setup))
        .ok_or_else(price_overflow)
}

// =============================================================================
// Vinyl
// =============================================================================

/// `width × height × rate × quantity`, rounded half up to the cent once.
///
/// Unregistered vinyl types are priced at the base rate. The quantity must
/// be in `1..=MAX_QUANTITY`.
pub fn vinyl_price(
    process: &Process,
    width_cm: f64,
    height_cm: f64,
    vinyl_type: &str,
    quantity: i64,
) -> CoreResult<Money> {
    let params = process.vinyl()?;

    validate_dimension_cm("width_cm", width_cm)?;
    validate_dimension_cm("height_cm", height_cm)?;
    validate_quantity(quantity)?;

    let rate = params.rate_for(vinyl_type);
    if rate < 0 {
        return Err(CoreError::not_configured(&process.id, "rate_by_vinyl_type"));
    }

    let area = width_cm * height_cm;
    // rate is in hundredths of a cent
    let cents = area * rate as f64 * quantity as f64 / 100.0;
    if cents.is_nan() || cents >= i64::MAX as f64 {
        return Err(price_overflow());
    }
    Ok(Money::from_fractional_cents(cents))
}

// =============================================================================
// Dispatch
// =============================================================================

/// Price of one customization request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Quote {
    pub process_kind: ProcessKind,
    pub quantity: i64,
    /// Price for the whole quantity.
    pub total: Money,
    /// `total / quantity`, rounded half up; zero when quantity is zero.
    pub unit_price: Money,
    /// Roll metres, for DTF and sublimation only.
    pub meters_needed: Option<u64>,
}

/// Prices `spec` with whichever calculator matches the process kind.
pub fn quote(process: &Process, spec: &CustomizationSpec, quantity: i64) -> CoreResult<Quote> {
    let kind = process.kind();

    let (total, meters_needed) = match spec {
        CustomizationSpec::RollPrint {
            width_cm,
            height_cm,
        } if kind.is_roll() => {
            let roll = roll_quote(process, *width_cm, *height_cm, quantity)?;
            (roll.price, Some(roll.meters_needed))
        }
        CustomizationSpec::Embroidery {
            tier,
            include_setup,
        } if kind == ProcessKind::Embroidery => (
            embroidery_price(process, *tier, *include_setup, quantity)?,
            None,
        ),
        CustomizationSpec::Vinyl {
            width_cm,
            height_cm,
            vinyl_type,
        } if kind == ProcessKind::Vinyl => (
            vinyl_price(process, *width_cm, *height_cm, vinyl_type, quantity)?,
            None,
        ),
        other => {
            return Err(CoreError::ProcessKindMismatch {
                process_id: process.id.clone(),
                expected: spec_kind_label(other).to_string(),
                actual: kind.to_string(),
            })
        }
    };

    Ok(Quote {
        process_kind: kind,
        quantity,
        total,
        unit_price: per_unit(total, quantity),
        meters_needed,
    })
}

fn spec_kind_label(spec: &CustomizationSpec) -> &'static str {
    match spec {
        CustomizationSpec::RollPrint { .. } => "DTF or SUBLIMATION",
        CustomizationSpec::Embroidery { .. } => ProcessKind::Embroidery.as_str(),
        CustomizationSpec::Vinyl { .. } => ProcessKind::Vinyl.as_str(),
    }
}

fn per_unit(total: Money, quantity: i64) -> Money {
    if quantity <= 0 {
        return Money::zero();
    }
    let cents = total.cents();
    Money::from_cents((cents + quantity / 2) / quantity)
}

// =============================================================================
// Unit Tests
// =============================================================================
