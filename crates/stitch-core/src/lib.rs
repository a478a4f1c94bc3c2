//! # stitch-core: Pure Business Logic for Stitchworks
//!
//! Pricing, order totals, lifecycle rules and integrity checks for a
//! textile-customization shop (DTF, sublimation, embroidery and vinyl).
//! Every function here is pure: no storage, no network, no clock reads.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stitchworks Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Route layer (external: forms, templates)           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            stitch-db services (OrderService, CatalogService)    │   │
//! │  │            load ──► call core ──► save                          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ stitch-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │  types  │ │ process │ │ pricing │ │ totals  │ │integrity│  │   │
//! │  │   │  Order  │ │  kinds  │ │  roll   │ │ order   │ │ delete  │  │   │
//! │  │   │LineItem │ │  tiers  │ │embroid. │ │ money   │ │ guards  │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Client, Product, Order, LineItem, Customization)
//! - [`process`] - Process kinds and their pricing parameters
//! - [`pricing`] - DTF/sublimation packing, embroidery and vinyl calculators
//! - [`totals`] - Order totals aggregator
//! - [`integrity`] - Soft-delete preconditions
//! - [`reports`] - Margin and revenue summaries
//! - [`money`] - Integer money and basis-point percentages
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use stitch_core::pricing::embroidery_price;
//! use stitch_core::process::{Process, ProcessKind, SizeTier};
//!
//! let embroidery = Process::with_defaults("Embroidery", ProcessKind::Embroidery, Utc::now());
//!
//! // 5 large pieces at 80.00 plus 50.00 setup
//! let price = embroidery_price(&embroidery, SizeTier::Large, true, 5).unwrap();
//! assert_eq!(price.cents(), 45_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod integrity;
pub mod money;
pub mod pricing;
pub mod process;
pub mod reports;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{Blocker, CoreError, CoreResult, IntegrityViolation, ValidationError};
pub use money::{Money, Percent};
pub use process::{CustomizationSpec, PricingParams, Process, ProcessKind, SizeTier};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Tax rate applied to new orders unless configured otherwise (16%).
pub const DEFAULT_TAX_RATE: Percent = Percent::from_bps(1600);

/// Profit margin recorded on new orders unless configured otherwise (30%).
pub const DEFAULT_PROFIT_MARGIN: Percent = Percent::from_bps(3000);

/// Days between order creation and estimated delivery.
pub const DEFAULT_DELIVERY_LEAD_DAYS: i64 = 7;

/// Maximum quantity on a single line item or customization.
///
/// Catches typos like 10000 instead of 100.
pub const MAX_QUANTITY: i64 = 10_000;

/// Longest accepted design edge, in centimetres.
pub const MAX_DIMENSION_CM: f64 = 500.0;

/// Shortest accepted design edge, in centimetres (one millimetre).
///
/// Keeps copies-per-row on a roll within a sane integer range.
pub const MIN_DIMENSION_CM: f64 = 0.1;

/// Largest accepted price, in cents ($1,000,000.00).
///
/// Bounded so `price × MAX_QUANTITY` and order sums stay inside i64.
pub const MAX_PRICE_CENTS: i64 = 100_000_000;

/// Longest accepted display name.
pub const MAX_NAME_LENGTH: usize = 200;
