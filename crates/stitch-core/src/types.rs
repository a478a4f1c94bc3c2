//! # Domain Types
//!
//! Core domain types for the shop: clients, garments, orders, line items
//! and the customizations applied to them. Processes live in
//! [`crate::process`].
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Client ◄── client_id ── Order ◄── order_id ── LineItem                │
//! │                                                    ▲                    │
//! │  Product ◄──────────── product_id ─────────────────┘                    │
//! │                                                                         │
//! │  LineItem ◄── line_item_id ── Customization ── process_id ──► Process  │
//! │                                                                         │
//! │  Ownership is by identifier only: an Order never embeds its items,     │
//! │  a LineItem never embeds its customizations.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Soft Delete
//! Every entity carries a [`Lifecycle`] instead of a bare `is_active` flag.
//! Leaving `Active` is guarded by [`crate::integrity`]; returning to
//! `Active` is always allowed.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{Money, Percent};
use crate::pricing::Quote;
use crate::process::CustomizationSpec;

// =============================================================================
// Entity Kind & Lifecycle
// =============================================================================

/// The storage type of an entity (the "type" in `get(type, id)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Client,
    Product,
    Process,
    Order,
    LineItem,
    Customization,
}

impl EntityKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Client => "CLIENT",
            EntityKind::Product => "PRODUCT",
            EntityKind::Process => "PROCESS",
            EntityKind::Order => "ORDER",
            EntityKind::LineItem => "LINE_ITEM",
            EntityKind::Customization => "CUSTOMIZATION",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical presence of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Lifecycle {
    #[default]
    Active,
    Deleted,
}

impl Lifecycle {
    #[inline]
    pub const fn is_active(&self) -> bool {
        matches!(self, Lifecycle::Active)
    }
}

/// A record the storage collaborator can persist.
///
/// The storage adapter serializes the whole value; implementors never
/// rewrite their own fields to make themselves storable.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    fn id(&self) -> &str;

    fn lifecycle(&self) -> Lifecycle;

    fn set_lifecycle(&mut self, lifecycle: Lifecycle);

    /// Bumps the modification timestamp.
    fn touch(&mut self, now: DateTime<Utc>);

    fn is_active(&self) -> bool {
        self.lifecycle().is_active()
    }

    /// Moves the record to `Deleted`. Callers run the integrity guard first.
    fn mark_deleted(&mut self, now: DateTime<Utc>) {
        self.set_lifecycle(Lifecycle::Deleted);
        self.touch(now);
    }

    /// Moves the record back to `Active`.
    fn restore(&mut self, now: DateTime<Utc>) {
        self.set_lifecycle(Lifecycle::Active);
        self.touch(now);
    }

    /// Fails with `CoreError::Inactive` unless the record is active.
    fn ensure_active(&self) -> CoreResult<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(CoreError::Inactive {
                kind: Self::KIND,
                id: self.id().to_string(),
            })
        }
    }
}

macro_rules! impl_entity {
    ($ty:ty, $kind:expr) => {
        impl Entity for $ty {
            const KIND: EntityKind = $kind;

            fn id(&self) -> &str {
                &self.id
            }

            fn lifecycle(&self) -> Lifecycle {
                self.lifecycle
            }

            fn set_lifecycle(&mut self, lifecycle: Lifecycle) {
                self.lifecycle = lifecycle;
            }

            fn touch(&mut self, now: DateTime<Utc>) {
                self.updated_at = now;
            }
        }
    };
}

pub(crate) use impl_entity;

/// Generates a new entity identifier (UUID v4).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// =============================================================================
// Client
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientType {
    #[default]
    Individual,
    Business,
}

/// A customer placing orders.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub company: Option<String>,
    /// Fiscal identifier (NIT / RFC / VAT number).
    pub tax_id: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub client_type: ClientType,
    pub notes: Option<String>,
    /// Delivered orders attributed to this client.
    pub order_count: i64,
    /// Sum of delivered order totals.
    pub total_spent: Money,
    pub lifecycle: Lifecycle,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Client, EntityKind::Client);

impl Client {
    pub fn new(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Client {
            id: new_id(),
            name: name.into(),
            surname: None,
            email: None,
            phone: None,
            address: None,
            company: None,
            tax_id: None,
            city: None,
            region: None,
            client_type: ClientType::Individual,
            notes: None,
            order_count: 0,
            total_spent: Money::zero(),
            lifecycle: Lifecycle::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// "name surname", else "name (company)", else "name".
    pub fn display_name(&self) -> String {
        match (self.surname.as_deref(), self.company.as_deref()) {
            (Some(surname), _) if !surname.is_empty() => format!("{} {}", self.name, surname),
            (_, Some(company)) if !company.is_empty() => format!("{} ({})", self.name, company),
            _ => self.name.clone(),
        }
    }

    /// Attributes a delivered order to the client statistics.
    pub fn record_order(&mut self, order_total: Money, now: DateTime<Utc>) {
        self.order_count += 1;
        self.total_spent += order_total;
        self.touch(now);
    }
}

// =============================================================================
// Product
// =============================================================================

/// A garment in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// T-shirt, hoodie, cap, ...
    pub category: String,
    pub base_price: Money,
    pub description: Option<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    /// Units delivered across all orders.
    pub times_ordered: i64,
    /// Garment revenue across delivered orders.
    pub total_sold: Money,
    pub lifecycle: Lifecycle,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Product, EntityKind::Product);

/// Sizes offered when a product is created without an explicit list.
pub const DEFAULT_SIZES: &[&str] = &["S", "M", "L", "XL"];

/// Colors offered when a product is created without an explicit list.
pub const DEFAULT_COLORS: &[&str] = &["White", "Black"];

impl Product {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        base_price: Money,
        now: DateTime<Utc>,
    ) -> Self {
        Product {
            id: new_id(),
            name: name.into(),
            category: category.into(),
            base_price,
            description: None,
            sizes: DEFAULT_SIZES.iter().map(|s| s.to_string()).collect(),
            colors: DEFAULT_COLORS.iter().map(|c| c.to_string()).collect(),
            times_ordered: 0,
            total_sold: Money::zero(),
            lifecycle: Lifecycle::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_size(&self, size: &str) -> bool {
        self.sizes.iter().any(|s| s == size)
    }

    pub fn has_color(&self, color: &str) -> bool {
        self.colors.iter().any(|c| c == color)
    }

    /// Fails unless both size and color are offered.
    pub fn ensure_variant(&self, size: &str, color: &str) -> CoreResult<()> {
        if !self.has_size(size) {
            return Err(CoreError::SizeUnavailable {
                product_id: self.id.clone(),
                size: size.to_string(),
            });
        }
        if !self.has_color(color) {
            return Err(CoreError::ColorUnavailable {
                product_id: self.id.clone(),
                color: color.to_string(),
            });
        }
        Ok(())
    }

    pub fn price_with_discount(&self, discount: Percent) -> Money {
        self.base_price.discounted(discount)
    }

    pub fn record_sale(&mut self, quantity: i64, revenue: Money, now: DateTime<Utc>) {
        self.times_ordered += quantity;
        self.total_sold += revenue;
        self.touch(now);
    }
}

// =============================================================================
// Order Status & Priority
// =============================================================================

/// Order workflow state.
///
/// ```text
/// PENDING ──► IN_PROGRESS ──► COMPLETED ──► DELIVERED
///    │             │              │
///    └─────────────┴──────────────┴──────► CANCELLED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Delivered and cancelled orders accept no further transitions.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, InProgress)
                | (InProgress, Completed)
                | (Completed, Delivered)
                | (Pending, Cancelled)
                | (InProgress, Cancelled)
                | (Completed, Cancelled)
        )
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::InProgress => "IN_PROGRESS",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

// =============================================================================
// Order
// =============================================================================

/// One client order. Totals are derived values maintained by
/// [`crate::totals`]; never edit them by hand.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: String,
    /// Human-facing number, e.g. `ORD-20261016103000-3F2A`.
    pub order_number: String,
    pub client_id: String,
    pub description: Option<String>,
    pub status: OrderStatus,
    pub priority: Priority,
    pub profit_margin: Percent,
    pub tax_rate: Percent,
    /// Σ (item subtotal + item customization subtotal) over active items.
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
    /// Margin report only; never subtracted from `total`.
    pub profit: Money,
    pub amount_paid: Money,
    pub outstanding: Money,
    pub fully_paid: bool,
    pub item_count: i64,
    #[ts(as = "String")]
    pub estimated_delivery: DateTime<Utc>,
    pub notes: Option<String>,
    pub lifecycle: Lifecycle,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Order, EntityKind::Order);

impl Order {
    /// Creates an empty PENDING order.
    pub fn new(
        client_id: impl Into<String>,
        order_number: impl Into<String>,
        tax_rate: Percent,
        profit_margin: Percent,
        estimated_delivery: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Order {
            id: new_id(),
            order_number: order_number.into(),
            client_id: client_id.into(),
            description: None,
            status: OrderStatus::Pending,
            priority: Priority::Normal,
            profit_margin,
            tax_rate,
            subtotal: Money::zero(),
            tax: Money::zero(),
            total: Money::zero(),
            profit: Money::zero(),
            amount_paid: Money::zero(),
            outstanding: Money::zero(),
            fully_paid: true,
            item_count: 0,
            estimated_delivery,
            notes: None,
            lifecycle: Lifecycle::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Moves the order along its state machine.
    pub fn transition_to(&mut self, next: OrderStatus, now: DateTime<Utc>) -> CoreResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(CoreError::InvalidStatusTransition {
                order_id: self.id.clone(),
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.touch(now);
        Ok(())
    }

    /// Fails when the order is soft-deleted or in a terminal status.
    pub fn ensure_editable(&self) -> CoreResult<()> {
        self.ensure_active()?;
        if self.status.is_terminal() {
            return Err(CoreError::OrderNotEditable {
                order_id: self.id.clone(),
                status: self.status,
            });
        }
        Ok(())
    }

    /// Adds a payment. Balance fields are refreshed by the next totals pass.
    pub fn add_payment(&mut self, amount: Money, now: DateTime<Utc>) -> CoreResult<()> {
        if !amount.is_positive() {
            return Err(ValidationError::must_be_positive("payment amount").into());
        }
        self.amount_paid += amount;
        self.touch(now);
        Ok(())
    }

    /// Past its estimated delivery date and still not finished.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        if matches!(
            self.status,
            OrderStatus::Completed | OrderStatus::Delivered | OrderStatus::Cancelled
        ) {
            return false;
        }
        now > self.estimated_delivery
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One garment row in an order: product, size, color and quantity.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub size: String,
    pub color: String,
    pub quantity: i64,
    /// Garment price per unit, captured when the item is added.
    pub unit_price: Money,
    /// `unit_price × quantity`.
    pub subtotal: Money,
    /// Σ subtotal of this item's active customizations.
    pub customization_subtotal: Money,
    pub lifecycle: Lifecycle,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl_entity!(LineItem, EntityKind::LineItem);

impl LineItem {
    pub fn new(
        order_id: impl Into<String>,
        product_id: impl Into<String>,
        size: impl Into<String>,
        color: impl Into<String>,
        quantity: i64,
        unit_price: Money,
        now: DateTime<Utc>,
    ) -> Self {
        LineItem {
            id: new_id(),
            order_id: order_id.into(),
            product_id: product_id.into(),
            size: size.into(),
            color: color.into(),
            quantity,
            unit_price,
            subtotal: unit_price * quantity,
            customization_subtotal: Money::zero(),
            lifecycle: Lifecycle::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Garment subtotal plus customizations.
    pub fn line_total(&self) -> Money {
        self.subtotal + self.customization_subtotal
    }
}

// =============================================================================
// Customization
// =============================================================================

/// One application of a process onto a line item.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Customization {
    pub id: String,
    pub line_item_id: String,
    pub process_id: String,
    pub quantity: i64,
    /// Per-piece price; for quoted customizations this is the rounded
    /// display value, not the billing basis.
    pub unit_price: Money,
    /// See [`Customization::billed_subtotal`].
    pub subtotal: Money,
    /// Placement on the garment ("Left chest", "Upper back", ...).
    pub position: Option<String>,
    /// Design the price was quoted for; `None` when priced by hand.
    pub spec: Option<CustomizationSpec>,
    /// Exact price of the whole quantity when priced from `spec`.
    #[serde(default)]
    pub quoted_total: Option<Money>,
    pub lifecycle: Lifecycle,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Customization, EntityKind::Customization);

impl Customization {
    pub fn new(
        line_item_id: impl Into<String>,
        process_id: impl Into<String>,
        quantity: i64,
        unit_price: Money,
        now: DateTime<Utc>,
    ) -> Self {
        Customization {
            id: new_id(),
            line_item_id: line_item_id.into(),
            process_id: process_id.into(),
            quantity,
            unit_price,
            subtotal: unit_price * quantity,
            position: None,
            spec: None,
            quoted_total: None,
            lifecycle: Lifecycle::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// A customization priced from `spec`, billed at exactly `quote.total`.
    pub fn quoted(
        line_item_id: impl Into<String>,
        process_id: impl Into<String>,
        spec: CustomizationSpec,
        quote: &Quote,
        now: DateTime<Utc>,
    ) -> Self {
        let mut custom = Customization::new(
            line_item_id,
            process_id,
            quote.quantity,
            quote.unit_price,
            now,
        );
        custom.spec = Some(spec);
        custom.apply_quote(quote, now);
        custom
    }

    /// Re-prices after a new quote for the same spec.
    pub fn apply_quote(&mut self, quote: &Quote, now: DateTime<Utc>) {
        self.quantity = quote.quantity;
        self.unit_price = quote.unit_price;
        self.quoted_total = Some(quote.total);
        self.subtotal = quote.total;
        self.updated_at = now;
    }

    /// What the line is charged: the quoted total when priced from a spec,
    /// else `unit_price × quantity`.
    ///
    /// A quoted total is not `unit_price × quantity` in general: 7 DTF
    /// prints on one 200.00 metre bill 200.00, while the rounded unit price
    /// 28.57 × 7 would be 199.99.
    pub fn billed_subtotal(&self) -> Money {
        self.quoted_total.unwrap_or(self.unit_price * self.quantity)
    }
}

/// Standard placements offered for customizations.
pub const PLACEMENTS: &[&str] = &[
    "Left chest",
    "Right chest",
    "Center chest",
    "Upper back",
    "Center back",
    "Lower back",
    "Left sleeve",
    "Right sleeve",
    "Collar",
    "Custom",
];

// =============================================================================
// Unit Tests
// =============================================================================
