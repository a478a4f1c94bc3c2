//! # Money Module
//!
//! Provides the `Money` and `Percent` types used by every price in the shop.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    170.00 × 16% = 27.200000000000003  ❌                                │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents + Basis Points                             │
//! │    17000 cents × 1600 bps / 10000 = 2720 cents  ✅                      │
//! │                                                                         │
//! │  Order totals are recomputed on every mutation, so the arithmetic       │
//! │  must be exact and repeatable: same inputs, same cents.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stitch_core::money::{Money, Percent};
//!
//! let tee = Money::from_cents(12_500);      // $125.00
//! let line = tee * 4_i64;                    // $500.00
//! let tax = line.percent(Percent::from_bps(1600));
//! assert_eq!(tax.cents(), 8_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Where Money Flows
/// ```text
/// Process pricing ──► Customization.unit_price ──► Customization.subtotal ─┐
///                                                                          │
/// Product.base_price ──► LineItem.unit_price ──► LineItem.subtotal ────────┤
///                                                                          ▼
///                           Order.subtotal ──► tax ──► total ──► outstanding
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use stitch_core::money::Money;
    ///
    /// let price = Money::from_cents(20_000); // $200.00
    /// assert_eq!(price.cents(), 20_000);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole units and cents.
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` is -$5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Converts a fractional amount of cents to Money, rounding half away
    /// from zero.
    ///
    /// This is the single place where area-based prices (vinyl) leave
    /// floating point. Non-finite input yields zero.
    pub fn from_fractional_cents(cents: f64) -> Self {
        if !cents.is_finite() {
            return Money::zero();
        }
        Money(cents.round() as i64)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit portion.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Applies a percentage, rounding halves away from zero to the cent.
    ///
    /// Used for tax and for the profit-margin report. Negative amounts round
    /// symmetrically: `-$0.05 × 50%` is `-$0.03`, mirroring `$0.05 × 50%`.
    ///
    /// ## Implementation
    /// Integer math on the magnitude, `(|amount| * bps + 5000) / 10000`,
    /// widened to i128 so large order totals cannot overflow; the sign is
    /// reapplied afterwards.
    ///
    /// ```rust
    /// use stitch_core::money::{Money, Percent};
    ///
    /// let subtotal = Money::from_cents(17_000);
    /// let tax = subtotal.percent(Percent::from_bps(1600));
    /// assert_eq!(tax.cents(), 2_720); // $27.20
    /// ```
    pub fn percent(&self, rate: Percent) -> Money {
        let magnitude = ((self.0 as i128).abs() * rate.bps() as i128 + 5000) / 10000;
        let cents = if self.0 < 0 { -magnitude } else { magnitude };
        Money::from_cents(cents as i64)
    }

    /// Multiplies by a quantity, or `None` when the product leaves the i64
    /// range.
    ///
    /// Pricing goes through this instead of `*` because quantities and
    /// configured rates arrive from outside.
    ///
    /// ```rust
    /// use stitch_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(250).checked_mul(4), Some(Money::from_cents(1_000)));
    /// assert_eq!(Money::from_cents(i64::MAX).checked_mul(2), None);
    /// ```
    #[inline]
    pub const fn checked_mul(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Adds two amounts, or `None` on i64 overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Returns the amount after a percentage discount.
    ///
    /// ```rust
    /// use stitch_core::money::{Money, Percent};
    ///
    /// let base = Money::from_cents(10_000);
    /// assert_eq!(base.discounted(Percent::from_bps(1000)).cents(), 9_000);
    /// ```
    pub fn discounted(&self, discount: Percent) -> Money {
        *self - self.percent(discount)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.units().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Mul<u64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u64) -> Self {
        Money(self.0 * qty as i64)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Percent
// =============================================================================

/// A percentage in basis points (1 bps = 0.01%).
///
/// Used for tax (IVA, 1600 = 16%), profit margin and discounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Percent(u32);

impl Percent {
    /// 100%.
    pub const FULL: Percent = Percent(10_000);

    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Percent(bps)
    }

    /// Creates a percentage from a human value (`16.0` → 16%).
    ///
    /// Negative or non-finite values clamp to zero.
    pub fn from_percentage(pct: f64) -> Self {
        if !pct.is_finite() || pct <= 0.0 {
            return Percent(0);
        }
        Percent((pct * 100.0).round() as u32)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Percent(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Percent {
    fn default() -> Self {
        Percent::zero()
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
