//! # Processes
//!
//! A process is a priced customization technique. Each kind carries its own
//! parameter set:
//!
//! ```text
//! ┌──────────────┬──────────────────────────────────────────────────────────┐
//! │ Kind         │ Parameters                                               │
//! ├──────────────┼──────────────────────────────────────────────────────────┤
//! │ DTF          │ material_width_cm, price_per_meter                       │
//! │ SUBLIMATION  │ material_width_cm, price_per_meter                       │
//! │ EMBROIDERY   │ setup_price, price_by_size {SMALL..EXTRA_LARGE}          │
//! │ VINYL        │ base_rate_centicents, rate_by_vinyl_type {name}          │
//! └──────────────┴──────────────────────────────────────────────────────────┘
//! ```
//!
//! The kind is derived from the [`PricingParams`] variant, so a process can
//! never hold parameters of two kinds at once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{impl_entity, new_id, Entity, EntityKind, Lifecycle};

// =============================================================================
// Kinds & Tiers
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessKind {
    Dtf,
    Sublimation,
    Embroidery,
    Vinyl,
}

impl ProcessKind {
    pub const ALL: [ProcessKind; 4] = [
        ProcessKind::Dtf,
        ProcessKind::Sublimation,
        ProcessKind::Embroidery,
        ProcessKind::Vinyl,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            ProcessKind::Dtf => "DTF",
            ProcessKind::Sublimation => "SUBLIMATION",
            ProcessKind::Embroidery => "EMBROIDERY",
            ProcessKind::Vinyl => "VINYL",
        }
    }

    /// Roll-fed kinds share the packing calculator.
    pub const fn is_roll(&self) -> bool {
        matches!(self, ProcessKind::Dtf | ProcessKind::Sublimation)
    }
}

impl fmt::Display for ProcessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Embroidery design size bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SizeTier {
    Small,
    Medium,
    Large,
    ExtraLarge,
}

impl SizeTier {
    pub const ALL: [SizeTier; 4] = [
        SizeTier::Small,
        SizeTier::Medium,
        SizeTier::Large,
        SizeTier::ExtraLarge,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            SizeTier::Small => "SMALL",
            SizeTier::Medium => "MEDIUM",
            SizeTier::Large => "LARGE",
            SizeTier::ExtraLarge => "EXTRA_LARGE",
        }
    }
}

impl fmt::Display for SizeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Pricing Parameters
// =============================================================================

/// Fixed-width roll material (DTF film, sublimation paper).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RollPricing {
    pub material_width_cm: f64,
    pub price_per_meter: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EmbroideryPricing {
    pub setup_price: Money,
    pub price_by_size: BTreeMap<SizeTier, Money>,
}

/// Vinyl rates are per square centimetre and may carry fractions of a
/// cent, so they are kept in hundredths of a cent: `0.02` per cm² is
/// `200`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VinylPricing {
    pub base_rate_centicents: i64,
    pub rate_by_vinyl_type: BTreeMap<String, i64>,
}

impl VinylPricing {
    /// Rate for a vinyl type, falling back to the base rate when the type
    /// is not registered.
    pub fn rate_for(&self, vinyl_type: &str) -> i64 {
        self.rate_by_vinyl_type
            .get(vinyl_type)
            .copied()
            .unwrap_or(self.base_rate_centicents)
    }
}

/// Kind-specific pricing parameters. The variant *is* the process kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PricingParams {
    Dtf(RollPricing),
    Sublimation(RollPricing),
    Embroidery(EmbroideryPricing),
    Vinyl(VinylPricing),
}

impl PricingParams {
    pub fn kind(&self) -> ProcessKind {
        match self {
            PricingParams::Dtf(_) => ProcessKind::Dtf,
            PricingParams::Sublimation(_) => ProcessKind::Sublimation,
            PricingParams::Embroidery(_) => ProcessKind::Embroidery,
            PricingParams::Vinyl(_) => ProcessKind::Vinyl,
        }
    }

    /// Factory parameters for a new process of the given kind.
    pub fn defaults(kind: ProcessKind) -> Self {
        match kind {
            ProcessKind::Dtf => PricingParams::Dtf(RollPricing {
                material_width_cm: 27.5,
                price_per_meter: Money::from_cents(20_000),
            }),
            ProcessKind::Sublimation => PricingParams::Sublimation(RollPricing {
                material_width_cm: 60.0,
                price_per_meter: Money::from_cents(18_000),
            }),
            ProcessKind::Embroidery => PricingParams::Embroidery(EmbroideryPricing {
                setup_price: Money::from_cents(5_000),
                price_by_size: BTreeMap::from([
                    (SizeTier::Small, Money::from_cents(3_000)),
                    (SizeTier::Medium, Money::from_cents(5_000)),
                    (SizeTier::Large, Money::from_cents(8_000)),
                    (SizeTier::ExtraLarge, Money::from_cents(12_000)),
                ]),
            }),
            ProcessKind::Vinyl => PricingParams::Vinyl(VinylPricing {
                base_rate_centicents: 200,
                rate_by_vinyl_type: [
                    ("Standard", 200),
                    ("Textile", 300),
                    ("Reflective", 500),
                    ("Glitter", 600),
                    ("Flock", 400),
                    ("Holographic", 700),
                ]
                .into_iter()
                .map(|(name, rate)| (name.to_string(), rate))
                .collect(),
            }),
        }
    }
}

// =============================================================================
// Process
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Process {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub pricing: PricingParams,
    pub lifecycle: Lifecycle,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Process, EntityKind::Process);

impl Process {
    pub fn new(name: impl Into<String>, pricing: PricingParams, now: DateTime<Utc>) -> Self {
        Process {
            id: new_id(),
            name: name.into(),
            description: None,
            pricing,
            lifecycle: Lifecycle::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// A process of `kind` with factory parameters.
    pub fn with_defaults(name: impl Into<String>, kind: ProcessKind, now: DateTime<Utc>) -> Self {
        Process::new(name, PricingParams::defaults(kind), now)
    }

    pub fn kind(&self) -> ProcessKind {
        self.pricing.kind()
    }

    /// Replaces the parameter set. The kind of a process never changes.
    pub fn reconfigure(&mut self, pricing: PricingParams, now: DateTime<Utc>) -> CoreResult<()> {
        if pricing.kind() != self.kind() {
            return Err(self.mismatch(pricing.kind().as_str()));
        }
        self.pricing = pricing;
        self.touch(now);
        Ok(())
    }

    /// Roll parameters; fails unless the process is DTF or sublimation.
    pub fn roll(&self) -> CoreResult<&RollPricing> {
        match &self.pricing {
            PricingParams::Dtf(roll) | PricingParams::Sublimation(roll) => Ok(roll),
            _ => Err(self.mismatch("DTF or SUBLIMATION")),
        }
    }

    pub fn embroidery(&self) -> CoreResult<&EmbroideryPricing> {
        match &self.pricing {
            PricingParams::Embroidery(params) => Ok(params),
            _ => Err(self.mismatch(ProcessKind::Embroidery.as_str())),
        }
    }

    pub fn vinyl(&self) -> CoreResult<&VinylPricing> {
        match &self.pricing {
            PricingParams::Vinyl(params) => Ok(params),
            _ => Err(self.mismatch(ProcessKind::Vinyl.as_str())),
        }
    }

    fn mismatch(&self, expected: &str) -> CoreError {
        CoreError::ProcessKindMismatch {
            process_id: self.id.clone(),
            expected: expected.to_string(),
            actual: self.kind().to_string(),
        }
    }
}

// =============================================================================
// Customization Spec
// =============================================================================

/// What the customer wants printed or stitched, independent of price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomizationSpec {
    /// DTF or sublimation transfer of a rectangular design.
    RollPrint { width_cm: f64, height_cm: f64 },
    Embroidery { tier: SizeTier, include_setup: bool },
    Vinyl {
        width_cm: f64,
        height_cm: f64,
        vinyl_type: String,
    },
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_follows_variant() {
        for kind in ProcessKind::ALL {
            assert_eq!(PricingParams::defaults(kind).kind(), kind);
        }
    }

    #[test]
    fn test_reconfigure_rejects_other_kind() {
        let now = Utc::now();
        let mut dtf = Process::with_defaults("DTF", ProcessKind::Dtf, now);

        let err = dtf
            .reconfigure(PricingParams::defaults(ProcessKind::Vinyl), now)
            .unwrap_err();
        assert!(err.is_configuration_error());

        let wider = PricingParams::Dtf(RollPricing {
            material_width_cm: 58.0,
            price_per_meter: Money::from_cents(35_000),
        });
        dtf.reconfigure(wider.clone(), now).unwrap();
        assert_eq!(dtf.pricing, wider);
    }

    #[test]
    fn test_accessors_report_mismatch() {
        let now = Utc::now();
        let vinyl = Process::with_defaults("Vinyl", ProcessKind::Vinyl, now);
        assert!(vinyl.vinyl().is_ok());
        assert!(matches!(
            vinyl.roll(),
            Err(CoreError::ProcessKindMismatch { .. })
        ));
        assert!(vinyl.embroidery().is_err());

        let sub = Process::with_defaults("Sublimation", ProcessKind::Sublimation, now);
        assert_eq!(sub.roll().unwrap().material_width_cm, 60.0);
    }

    #[test]
    fn test_vinyl_rate_fallback() {
        let PricingParams::Vinyl(vinyl) = PricingParams::defaults(ProcessKind::Vinyl) else {
            panic!("expected vinyl defaults");
        };
        assert_eq!(vinyl.rate_for("Glitter"), 600);
        assert_eq!(vinyl.rate_for("Unobtainium"), vinyl.base_rate_centicents);
    }

    #[test]
    fn test_pricing_params_wire_format() {
        let json = serde_json::to_value(PricingParams::defaults(ProcessKind::Embroidery)).unwrap();
        assert_eq!(json["kind"], "EMBROIDERY");
        assert_eq!(json["price_by_size"]["EXTRA_LARGE"], 12_000);

        let back: PricingParams = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind(), ProcessKind::Embroidery);
    }
}
