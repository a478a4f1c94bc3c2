//! # Order Service
//!
//! Every mutation of an order's contents ends in [`OrderService::recompute_totals`],
//! inside the same call:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_line_item / update_line_item / remove_line_item                    │
//! │  add_customization / update_customization / remove_customization        │
//! │  record_payment                                                         │
//! │        │                                                                │
//! │        ├── validate input (stitch-core::validation)                     │
//! │        ├── load order, check it is still editable                       │
//! │        ├── save the changed child record                                │
//! │        ▼                                                                │
//! │  recompute_totals(order_id)                                             │
//! │        ├── load active line items + their active customizations         │
//! │        ├── totals::compute_order_totals (repairs stale subtotals)       │
//! │        ├── save repaired children                                       │
//! │        └── save the order                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};
use uuid::Uuid;

use stitch_core::pricing::{self, Quote};
use stitch_core::totals::{apply_totals, compute_order_totals};
use stitch_core::validation::{
    validate_payment_amount, validate_percent, validate_price, validate_quantity, validate_variant,
};
use stitch_core::{
    Client, CoreError, Customization, CustomizationSpec, Entity, LineItem, Money, Order,
    OrderStatus, Percent, Priority, Process, Product, ValidationError,
};

use super::{load, load_active};
use crate::config::ShopConfig;
use crate::error::DbResult;
use crate::storage::Storage;

// =============================================================================
// Requests & Views
// =============================================================================

/// Input for [`OrderService::create_order`]. Unset rates fall back to the
/// shop configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewOrder {
    pub client_id: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub notes: Option<String>,
    pub tax_rate: Option<Percent>,
    pub profit_margin: Option<Percent>,
    pub estimated_delivery: Option<DateTime<Utc>>,
}

/// Input for [`OrderService::add_line_item`]. Without `unit_price` the
/// product's base price is used.
#[derive(Debug, Clone, Deserialize)]
pub struct NewLineItem {
    pub product_id: String,
    pub size: String,
    pub color: String,
    pub quantity: i64,
    #[serde(default)]
    pub unit_price: Option<Money>,
}

/// Partial update of a line item; `None` keeps the current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LineItemUpdate {
    pub quantity: Option<i64>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub unit_price: Option<Money>,
}

/// Input for [`OrderService::add_customization`].
///
/// With a `spec` the price is quoted from the process; otherwise
/// `unit_price` is required.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCustomization {
    pub process_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub spec: Option<CustomizationSpec>,
    #[serde(default)]
    pub unit_price: Option<Money>,
    #[serde(default)]
    pub position: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineItemDetail {
    pub item: LineItem,
    pub product: Option<Product>,
    pub customizations: Vec<Customization>,
}

/// An order with everything a detail page shows.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    pub order: Order,
    pub client: Option<Client>,
    pub items: Vec<LineItemDetail>,
}

/// `ORD-YYYYMMDDHHMMSS-XXXX`; the suffix keeps orders created in the same
/// second apart.
pub fn generate_order_number(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string()[..4].to_uppercase();
    format!("ORD-{}-{}", now.format("%Y%m%d%H%M%S"), suffix)
}

// =============================================================================
// Service
// =============================================================================

/// Order operations over a storage collaborator.
#[derive(Debug, Clone)]
pub struct OrderService<S: Storage> {
    store: S,
    config: ShopConfig,
}

impl<S: Storage> OrderService<S> {
    pub fn new(store: S, config: ShopConfig) -> Self {
        OrderService { store, config }
    }

    pub fn config(&self) -> &ShopConfig {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Orders
    // -------------------------------------------------------------------------

    /// Creates an empty PENDING order for an active client.
    pub async fn create_order(&self, new: NewOrder) -> DbResult<Order> {
        let client: Client = load_active(&self.store, &new.client_id).await?;

        let tax_rate = new.tax_rate.unwrap_or(self.config.tax_rate);
        validate_percent("tax_rate", tax_rate)?;
        let profit_margin = new.profit_margin.unwrap_or(self.config.profit_margin);
        validate_percent("profit_margin", profit_margin)?;

        let now = Utc::now();
        let estimated_delivery = new
            .estimated_delivery
            .unwrap_or_else(|| now + Duration::days(self.config.delivery_lead_days));

        let mut order = Order::new(
            &client.id,
            generate_order_number(now),
            tax_rate,
            profit_margin,
            estimated_delivery,
            now,
        );
        order.description = new.description;
        order.priority = new.priority;
        order.notes = new.notes;

        self.store.save(&order).await?;

        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            client_id = %client.id,
            "Order created"
        );
        Ok(order)
    }

    pub async fn get_order(&self, order_id: &str) -> DbResult<Order> {
        load(&self.store, order_id).await
    }

    /// Active orders, optionally narrowed to one status.
    pub async fn list_orders(&self, status: Option<OrderStatus>) -> DbResult<Vec<Order>> {
        self.store
            .find_by_condition(move |o: &Order| {
                o.is_active() && status.map_or(true, |s| o.status == s)
            })
            .await
    }

    /// Active orders of one client.
    pub async fn orders_for_client(&self, client_id: &str) -> DbResult<Vec<Order>> {
        self.store
            .find_by_condition(|o: &Order| o.is_active() && o.client_id == client_id)
            .await
    }

    /// Moves the order along its status machine.
    ///
    /// Delivery credits the client and product statistics.
    pub async fn change_status(&self, order_id: &str, status: OrderStatus) -> DbResult<Order> {
        let mut order: Order = load_active(&self.store, order_id).await?;
        let from = order.status;

        order.transition_to(status, Utc::now())?;
        self.store.save(&order).await?;

        info!(order_id = %order.id, from = %from, to = %status, "Order status changed");

        let order = self.recompute_totals(order_id).await?;
        if status == OrderStatus::Delivered {
            self.credit_delivery(&order).await?;
        }
        Ok(order)
    }

    async fn credit_delivery(&self, order: &Order) -> DbResult<()> {
        let now = Utc::now();

        if let Some(mut client) = self.store.get::<Client>(&order.client_id).await? {
            client.record_order(order.total, now);
            self.store.save(&client).await?;
        }

        for item in self.active_items(&order.id).await? {
            if let Some(mut product) = self.store.get::<Product>(&item.product_id).await? {
                product.record_sale(item.quantity, item.subtotal, now);
                self.store.save(&product).await?;
            }
        }

        debug!(order_id = %order.id, total = %order.total, "Delivery statistics recorded");
        Ok(())
    }

    /// Adds a payment and refreshes the balance.
    pub async fn record_payment(&self, order_id: &str, amount: Money) -> DbResult<Order> {
        validate_payment_amount(amount)?;

        let mut order: Order = load_active(&self.store, order_id).await?;
        if order.status == OrderStatus::Cancelled {
            return Err(CoreError::OrderNotEditable {
                order_id: order.id.clone(),
                status: order.status,
            }
            .into());
        }

        order.add_payment(amount, Utc::now())?;
        self.store.save(&order).await?;

        info!(order_id = %order.id, amount = %amount, "Payment recorded");
        self.recompute_totals(order_id).await
    }

    /// Soft-deletes the order together with its line items and
    /// customizations. Deleting an already deleted order is a no-op.
    pub async fn delete_order(&self, order_id: &str) -> DbResult<Order> {
        let mut order: Order = load(&self.store, order_id).await?;
        if !order.is_active() {
            return Ok(order);
        }

        let now = Utc::now();
        let items = self.active_items(order_id).await?;
        let item_ids: HashSet<String> = items.iter().map(|i| i.id.clone()).collect();

        for mut custom in self.active_customizations(item_ids).await? {
            custom.mark_deleted(now);
            self.store.save(&custom).await?;
        }
        for mut item in items {
            item.mark_deleted(now);
            self.store.save(&item).await?;
        }

        order.mark_deleted(now);
        self.store.save(&order).await?;

        info!(order_id = %order.id, "Order deleted");
        Ok(order)
    }

    /// The order with its client, active items, products and customizations.
    pub async fn order_detail(&self, order_id: &str) -> DbResult<OrderDetail> {
        let order: Order = load(&self.store, order_id).await?;
        let client = self.store.get::<Client>(&order.client_id).await?;

        let items = self.active_items(order_id).await?;
        let item_ids: HashSet<String> = items.iter().map(|i| i.id.clone()).collect();
        let customizations = self.active_customizations(item_ids).await?;

        let mut details = Vec::with_capacity(items.len());
        for item in items {
            let product = self.store.get::<Product>(&item.product_id).await?;
            let customizations = customizations
                .iter()
                .filter(|c| c.line_item_id == item.id)
                .cloned()
                .collect();
            details.push(LineItemDetail {
                item,
                product,
                customizations,
            });
        }

        Ok(OrderDetail {
            order,
            client,
            items: details,
        })
    }

    // -------------------------------------------------------------------------
    // Line Items
    // -------------------------------------------------------------------------

    /// Adds a garment row to an editable order.
    pub async fn add_line_item(&self, order_id: &str, new: NewLineItem) -> DbResult<LineItem> {
        validate_quantity(new.quantity)?;
        validate_variant("size", &new.size)?;
        validate_variant("color", &new.color)?;

        let order: Order = load(&self.store, order_id).await?;
        order.ensure_editable()?;

        let product: Product = load_active(&self.store, &new.product_id).await?;
        product.ensure_variant(&new.size, &new.color)?;

        let unit_price = new.unit_price.unwrap_or(product.base_price);
        validate_price("unit_price", unit_price)?;

        let item = LineItem::new(
            &order.id,
            &product.id,
            new.size,
            new.color,
            new.quantity,
            unit_price,
            Utc::now(),
        );
        self.store.save(&item).await?;

        debug!(
            order_id = %order.id,
            item_id = %item.id,
            product_id = %product.id,
            quantity = item.quantity,
            "Line item added"
        );

        self.recompute_totals(&order.id).await?;
        load(&self.store, &item.id).await
    }

    /// Changes quantity, variant or price of a line item.
    pub async fn update_line_item(&self, item_id: &str, update: LineItemUpdate) -> DbResult<LineItem> {
        let mut item: LineItem = load_active(&self.store, item_id).await?;
        let order: Order = load(&self.store, &item.order_id).await?;
        order.ensure_editable()?;

        if let Some(quantity) = update.quantity {
            validate_quantity(quantity)?;
            item.quantity = quantity;
        }
        if let Some(unit_price) = update.unit_price {
            validate_price("unit_price", unit_price)?;
            item.unit_price = unit_price;
        }
        if update.size.is_some() || update.color.is_some() {
            let size = update.size.unwrap_or_else(|| item.size.clone());
            let color = update.color.unwrap_or_else(|| item.color.clone());
            validate_variant("size", &size)?;
            validate_variant("color", &color)?;

            let product: Product = load(&self.store, &item.product_id).await?;
            product.ensure_variant(&size, &color)?;
            item.size = size;
            item.color = color;
        }

        item.subtotal = item.unit_price * item.quantity;
        item.touch(Utc::now());
        self.store.save(&item).await?;

        debug!(item_id = %item.id, quantity = item.quantity, "Line item updated");

        self.recompute_totals(&order.id).await?;
        load(&self.store, item_id).await
    }

    /// Soft-deletes a line item and its customizations.
    pub async fn remove_line_item(&self, item_id: &str) -> DbResult<Order> {
        let mut item: LineItem = load_active(&self.store, item_id).await?;
        let order: Order = load(&self.store, &item.order_id).await?;
        order.ensure_editable()?;

        let now = Utc::now();
        let ids = HashSet::from([item.id.clone()]);
        for mut custom in self.active_customizations(ids).await? {
            custom.mark_deleted(now);
            self.store.save(&custom).await?;
        }

        item.mark_deleted(now);
        self.store.save(&item).await?;

        debug!(order_id = %order.id, item_id = %item.id, "Line item removed");
        self.recompute_totals(&order.id).await
    }

    // -------------------------------------------------------------------------
    // Customizations
    // -------------------------------------------------------------------------

    /// Prices a design without saving anything.
    ///
    /// The quantity is held to the same `1..=MAX_QUANTITY` range as a saved
    /// customization, so a quote always matches what adding it would bill.
    pub async fn quote_customization(
        &self,
        process_id: &str,
        spec: &CustomizationSpec,
        quantity: i64,
    ) -> DbResult<Quote> {
        validate_quantity(quantity)?;
        let process: Process = load_active(&self.store, process_id).await?;
        Ok(pricing::quote(&process, spec, quantity)?)
    }

    /// Applies a process to a line item.
    pub async fn add_customization(
        &self,
        item_id: &str,
        new: NewCustomization,
    ) -> DbResult<Customization> {
        validate_quantity(new.quantity)?;

        let item: LineItem = load_active(&self.store, item_id).await?;
        let order: Order = load(&self.store, &item.order_id).await?;
        order.ensure_editable()?;

        let process: Process = load_active(&self.store, &new.process_id).await?;
        let now = Utc::now();
        let mut custom = match (new.spec, new.unit_price) {
            (Some(spec), _) => {
                let quote = pricing::quote(&process, &spec, new.quantity)?;
                Customization::quoted(&item.id, &process.id, spec, &quote, now)
            }
            (None, Some(unit_price)) => {
                validate_price("unit_price", unit_price)?;
                Customization::new(&item.id, &process.id, new.quantity, unit_price, now)
            }
            (None, None) => return Err(ValidationError::required("spec").into()),
        };
        custom.position = new.position;
        self.store.save(&custom).await?;

        debug!(
            item_id = %item.id,
            customization_id = %custom.id,
            process = %process.kind(),
            subtotal = %custom.subtotal,
            "Customization added"
        );

        self.recompute_totals(&order.id).await?;
        Ok(custom)
    }

    /// Changes the quantity of a customization, re-quoting it when it was
    /// priced from a design.
    pub async fn update_customization(
        &self,
        customization_id: &str,
        quantity: i64,
    ) -> DbResult<Customization> {
        validate_quantity(quantity)?;

        let mut custom: Customization = load_active(&self.store, customization_id).await?;
        let item: LineItem = load(&self.store, &custom.line_item_id).await?;
        let order: Order = load(&self.store, &item.order_id).await?;
        order.ensure_editable()?;

        let now = Utc::now();
        if let Some(spec) = &custom.spec {
            let process: Process = load(&self.store, &custom.process_id).await?;
            let quote = pricing::quote(&process, spec, quantity)?;
            custom.apply_quote(&quote, now);
        } else {
            custom.quantity = quantity;
            custom.subtotal = custom.billed_subtotal();
            custom.touch(now);
        }
        self.store.save(&custom).await?;

        debug!(customization_id = %custom.id, quantity, "Customization updated");

        self.recompute_totals(&order.id).await?;
        Ok(custom)
    }

    pub async fn remove_customization(&self, customization_id: &str) -> DbResult<Order> {
        let mut custom: Customization = load_active(&self.store, customization_id).await?;
        let item: LineItem = load(&self.store, &custom.line_item_id).await?;
        let order: Order = load(&self.store, &item.order_id).await?;
        order.ensure_editable()?;

        custom.mark_deleted(Utc::now());
        self.store.save(&custom).await?;

        debug!(customization_id = %custom.id, "Customization removed");
        self.recompute_totals(&order.id).await
    }

    // -------------------------------------------------------------------------
    // Totals
    // -------------------------------------------------------------------------

    /// Recomputes and persists the order totals from its active children.
    ///
    /// Stale child subtotals are repaired and saved; running this twice in a
    /// row writes nothing the second time.
    pub async fn recompute_totals(&self, order_id: &str) -> DbResult<Order> {
        let mut order: Order = load(&self.store, order_id).await?;
        let mut items = self.active_items(order_id).await?;
        let item_ids: HashSet<String> = items.iter().map(|i| i.id.clone()).collect();
        let mut customs = self.active_customizations(item_ids).await?;

        let result = compute_order_totals(&order, &mut items, &mut customs);
        let now = Utc::now();

        if result.has_repairs() {
            debug!(
                order_id = %order.id,
                items = result.repaired_items.len(),
                customizations = result.repaired_customizations.len(),
                "Recomputed stale subtotals"
            );
        }

        for custom in customs
            .iter_mut()
            .filter(|c| result.repaired_customizations.contains(&c.id))
        {
            custom.touch(now);
            self.store.save(&*custom).await?;
        }
        for item in items
            .iter_mut()
            .filter(|i| result.repaired_items.contains(&i.id))
        {
            item.touch(now);
            self.store.save(&*item).await?;
        }

        if apply_totals(&mut order, &result.totals) {
            order.touch(now);
            self.store.save(&order).await?;
            debug!(
                order_id = %order.id,
                subtotal = %order.subtotal,
                total = %order.total,
                outstanding = %order.outstanding,
                "Order totals updated"
            );
        }

        Ok(order)
    }

    async fn active_items(&self, order_id: &str) -> DbResult<Vec<LineItem>> {
        self.store
            .find_by_condition(|i: &LineItem| i.is_active() && i.order_id == order_id)
            .await
    }

    async fn active_customizations(&self, item_ids: HashSet<String>) -> DbResult<Vec<Customization>> {
        self.store
            .find_by_condition(move |c: &Customization| {
                c.is_active() && item_ids.contains(&c.line_item_id)
            })
            .await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::storage::MemoryStore;
    use stitch_core::process::{ProcessKind, SizeTier};

    struct Shop {
        service: OrderService<MemoryStore>,
        store: MemoryStore,
        client: Client,
        tee: Product,
        dtf: Process,
        embroidery: Process,
    }

    async fn shop() -> Shop {
        let store = MemoryStore::new();
        let now = Utc::now();

        let client = Client::new("Ana", now);
        let tee = Product::new("Basic tee", "T-shirt", Money::from_cents(5_000), now);
        let dtf = Process::with_defaults("DTF", ProcessKind::Dtf, now);
        let embroidery = Process::with_defaults("Embroidery", ProcessKind::Embroidery, now);
        store.save(&client).await.unwrap();
        store.save(&tee).await.unwrap();
        store.save(&dtf).await.unwrap();
        store.save(&embroidery).await.unwrap();

        Shop {
            service: OrderService::new(store.clone(), ShopConfig::default()),
            store,
            client,
            tee,
            dtf,
            embroidery,
        }
    }

    fn tee_row(shop: &Shop, size: &str, quantity: i64) -> NewLineItem {
        NewLineItem {
            product_id: shop.tee.id.clone(),
            size: size.to_string(),
            color: "White".to_string(),
            quantity,
            unit_price: None,
        }
    }

    async fn new_order(shop: &Shop) -> Order {
        shop.service
            .create_order(NewOrder {
                client_id: shop.client.id.clone(),
                ..Default::default()
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_order_applies_config() {
        let shop = shop().await;
        let order = new_order(&shop).await;

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.tax_rate, Percent::from_bps(1600));
        assert_eq!(order.profit_margin, Percent::from_bps(3000));
        assert!(order.order_number.starts_with("ORD-"));
        assert_eq!(order.order_number.len(), "ORD-20261016103000-ABCD".len());
        assert_eq!((order.estimated_delivery - order.created_at).num_days(), 7);
    }

    #[tokio::test]
    async fn test_create_order_requires_active_client() {
        let shop = shop().await;

        let err = shop
            .service
            .create_order(NewOrder {
                client_id: "missing".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let mut client = shop.client.clone();
        client.mark_deleted(Utc::now());
        shop.store.save(&client).await.unwrap();
        let err = shop
            .service
            .create_order(NewOrder {
                client_id: client.id.clone(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Inactive { .. })));
    }

    #[tokio::test]
    async fn test_reference_order_totals() {
        let shop = shop().await;
        let order = new_order(&shop).await;

        let first = shop
            .service
            .add_line_item(&order.id, tee_row(&shop, "M", 2))
            .await
            .unwrap();
        shop.service
            .add_line_item(&order.id, tee_row(&shop, "L", 1))
            .await
            .unwrap();
        shop.service
            .add_customization(
                &first.id,
                NewCustomization {
                    process_id: shop.dtf.id.clone(),
                    quantity: 1,
                    spec: None,
                    unit_price: Some(Money::from_cents(2_000)),
                    position: Some("Left chest".to_string()),
                },
            )
            .await
            .unwrap();

        let order = shop.service.get_order(&order.id).await.unwrap();
        assert_eq!(order.subtotal, Money::from_cents(17_000));
        assert_eq!(order.tax, Money::from_cents(2_720));
        assert_eq!(order.total, Money::from_cents(19_720));
        assert_eq!(order.outstanding, Money::from_cents(19_720));
        assert_eq!(order.item_count, 2);

        let item: LineItem = shop.store.get(&first.id).await.unwrap().unwrap();
        assert_eq!(item.customization_subtotal, Money::from_cents(2_000));
    }

    #[tokio::test]
    async fn test_quoted_customization() {
        let shop = shop().await;
        let order = new_order(&shop).await;
        let item = shop
            .service
            .add_line_item(&order.id, tee_row(&shop, "M", 5))
            .await
            .unwrap();

        let custom = shop
            .service
            .add_customization(
                &item.id,
                NewCustomization {
                    process_id: shop.embroidery.id.clone(),
                    quantity: 5,
                    spec: Some(CustomizationSpec::Embroidery {
                        tier: SizeTier::Large,
                        include_setup: true,
                    }),
                    unit_price: None,
                    position: None,
                },
            )
            .await
            .unwrap();

        // (80 × 5 + 50) / 5
        assert_eq!(custom.unit_price, Money::from_cents(9_000));
        assert_eq!(custom.subtotal, Money::from_cents(45_000));

        let custom = shop.service.update_customization(&custom.id, 10).await.unwrap();
        // (80 × 10 + 50) / 10
        assert_eq!(custom.unit_price, Money::from_cents(8_500));

        let order = shop.service.get_order(&order.id).await.unwrap();
        assert_eq!(order.subtotal, Money::from_cents(25_000 + 85_000));
    }

    #[tokio::test]
    async fn test_quoted_customization_bills_exact_quote_for_uneven_quantity() {
        let shop = shop().await;
        let order = new_order(&shop).await;
        let item = shop
            .service
            .add_line_item(&order.id, tee_row(&shop, "M", 7))
            .await
            .unwrap();

        let print = CustomizationSpec::RollPrint {
            width_cm: 10.0,
            height_cm: 10.0,
        };
        let quote = shop
            .service
            .quote_customization(&shop.dtf.id, &print, 7)
            .await
            .unwrap();
        let dtf = shop
            .service
            .add_customization(
                &item.id,
                NewCustomization {
                    process_id: shop.dtf.id.clone(),
                    quantity: 7,
                    spec: Some(print),
                    unit_price: None,
                    position: None,
                },
            )
            .await
            .unwrap();
        // one metre at 200.00; 28.57 × 7 would be 199.99
        assert_eq!(quote.total, Money::from_cents(20_000));
        assert_eq!(dtf.subtotal, quote.total);
        assert_eq!(dtf.unit_price, Money::from_cents(2_857));

        let badge = shop
            .service
            .add_customization(
                &item.id,
                NewCustomization {
                    process_id: shop.embroidery.id.clone(),
                    quantity: 3,
                    spec: Some(CustomizationSpec::Embroidery {
                        tier: SizeTier::Large,
                        include_setup: true,
                    }),
                    unit_price: None,
                    position: None,
                },
            )
            .await
            .unwrap();
        // 80.00 × 3 + 50.00; 96.67 × 3 would be 290.01
        assert_eq!(badge.subtotal, Money::from_cents(29_000));

        let dtf = shop.service.update_customization(&dtf.id, 9).await.unwrap();
        assert_eq!(dtf.subtotal, Money::from_cents(20_000));

        let order = shop.service.recompute_totals(&order.id).await.unwrap();
        assert_eq!(order.subtotal, Money::from_cents(35_000 + 20_000 + 29_000));
    }

    #[tokio::test]
    async fn test_customization_rejects_wrong_process_kind() {
        let shop = shop().await;
        let order = new_order(&shop).await;
        let item = shop
            .service
            .add_line_item(&order.id, tee_row(&shop, "M", 1))
            .await
            .unwrap();

        let err = shop
            .service
            .add_customization(
                &item.id,
                NewCustomization {
                    process_id: shop.dtf.id.clone(),
                    quantity: 1,
                    spec: Some(CustomizationSpec::Embroidery {
                        tier: SizeTier::Small,
                        include_setup: false,
                    }),
                    unit_price: None,
                    position: None,
                },
            )
            .await
            .unwrap_err();
        assert!(err.as_core().is_some_and(|e| e.is_configuration_error()));
    }

    #[tokio::test]
    async fn test_line_item_validation() {
        let shop = shop().await;
        let order = new_order(&shop).await;

        let err = shop
            .service
            .add_line_item(&order.id, tee_row(&shop, "M", 0))
            .await
            .unwrap_err();
        assert!(err.as_core().is_some_and(|e| e.is_input_error()));

        let err = shop
            .service
            .add_line_item(&order.id, tee_row(&shop, "XXXL", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::SizeUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_update_and_remove_line_item() {
        let shop = shop().await;
        let order = new_order(&shop).await;
        let item = shop
            .service
            .add_line_item(&order.id, tee_row(&shop, "M", 1))
            .await
            .unwrap();

        let item = shop
            .service
            .update_line_item(
                &item.id,
                LineItemUpdate {
                    quantity: Some(4),
                    color: Some("Black".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(item.subtotal, Money::from_cents(20_000));
        assert_eq!(item.color, "Black");

        let order = shop.service.remove_line_item(&item.id).await.unwrap();
        assert!(order.subtotal.is_zero());
        assert_eq!(order.item_count, 0);
        assert!(order.fully_paid);
    }

    #[tokio::test]
    async fn test_remove_line_item_drops_its_customizations() {
        let shop = shop().await;
        let order = new_order(&shop).await;
        let item = shop
            .service
            .add_line_item(&order.id, tee_row(&shop, "M", 1))
            .await
            .unwrap();
        let custom = shop
            .service
            .add_customization(
                &item.id,
                NewCustomization {
                    process_id: shop.dtf.id.clone(),
                    quantity: 1,
                    spec: None,
                    unit_price: Some(Money::from_cents(1_500)),
                    position: None,
                },
            )
            .await
            .unwrap();

        shop.service.remove_line_item(&item.id).await.unwrap();
        let custom: Customization = shop.store.get(&custom.id).await.unwrap().unwrap();
        assert!(!custom.is_active());
    }

    #[tokio::test]
    async fn test_payments_update_balance() {
        let shop = shop().await;
        let order = new_order(&shop).await;
        shop.service
            .add_line_item(&order.id, tee_row(&shop, "M", 2))
            .await
            .unwrap();

        // 100.00 + 16% = 116.00
        let order = shop
            .service
            .record_payment(&order.id, Money::from_cents(6_000))
            .await
            .unwrap();
        assert_eq!(order.outstanding, Money::from_cents(5_600));
        assert!(!order.fully_paid);

        let order = shop
            .service
            .record_payment(&order.id, Money::from_cents(5_600))
            .await
            .unwrap();
        assert!(order.outstanding.is_zero());
        assert!(order.fully_paid);

        assert!(shop
            .service
            .record_payment(&order.id, Money::zero())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_delivery_credits_statistics() {
        let shop = shop().await;
        let order = new_order(&shop).await;
        shop.service
            .add_line_item(&order.id, tee_row(&shop, "M", 3))
            .await
            .unwrap();

        for status in [
            OrderStatus::InProgress,
            OrderStatus::Completed,
            OrderStatus::Delivered,
        ] {
            shop.service.change_status(&order.id, status).await.unwrap();
        }

        let client: Client = shop.store.get(&shop.client.id).await.unwrap().unwrap();
        assert_eq!(client.order_count, 1);
        assert_eq!(client.total_spent, Money::from_cents(17_400));

        let tee: Product = shop.store.get(&shop.tee.id).await.unwrap().unwrap();
        assert_eq!(tee.times_ordered, 3);
        assert_eq!(tee.total_sold, Money::from_cents(15_000));
    }

    #[tokio::test]
    async fn test_terminal_order_is_frozen() {
        let shop = shop().await;
        let order = new_order(&shop).await;
        shop.service
            .change_status(&order.id, OrderStatus::Cancelled)
            .await
            .unwrap();

        let err = shop
            .service
            .add_line_item(&order.id, tee_row(&shop, "M", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::OrderNotEditable { .. })));

        let err = shop
            .service
            .change_status(&order.id, OrderStatus::InProgress)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::InvalidStatusTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_recompute_repairs_stale_records_and_is_idempotent() {
        let shop = shop().await;
        let order = new_order(&shop).await;
        let item = shop
            .service
            .add_line_item(&order.id, tee_row(&shop, "M", 2))
            .await
            .unwrap();

        let mut stale = item.clone();
        stale.subtotal = Money::zero();
        shop.store.save(&stale).await.unwrap();

        let first = shop.service.recompute_totals(&order.id).await.unwrap();
        let repaired: LineItem = shop.store.get(&item.id).await.unwrap().unwrap();
        assert_eq!(repaired.subtotal, Money::from_cents(10_000));

        let second = shop.service.recompute_totals(&order.id).await.unwrap();
        assert_eq!(first.subtotal, second.subtotal);
        assert_eq!(first.total, second.total);
        assert_eq!(first.profit, second.profit);
        assert_eq!(first.outstanding, second.outstanding);
        assert_eq!(first.updated_at, second.updated_at);
    }

    #[tokio::test]
    async fn test_order_detail_and_delete() {
        let shop = shop().await;
        let order = new_order(&shop).await;
        let item = shop
            .service
            .add_line_item(&order.id, tee_row(&shop, "M", 1))
            .await
            .unwrap();
        shop.service
            .add_customization(
                &item.id,
                NewCustomization {
                    process_id: shop.dtf.id.clone(),
                    quantity: 1,
                    spec: Some(CustomizationSpec::RollPrint {
                        width_cm: 10.0,
                        height_cm: 10.0,
                    }),
                    unit_price: None,
                    position: None,
                },
            )
            .await
            .unwrap();

        let detail = shop.service.order_detail(&order.id).await.unwrap();
        assert_eq!(detail.client.as_ref().map(|c| c.id.as_str()), Some(shop.client.id.as_str()));
        assert_eq!(detail.items.len(), 1);
        assert_eq!(detail.items[0].customizations.len(), 1);
        // one metre of DTF film
        assert_eq!(detail.items[0].customizations[0].unit_price, Money::from_cents(20_000));

        let deleted = shop.service.delete_order(&order.id).await.unwrap();
        assert!(!deleted.is_active());
        assert!(shop.service.list_orders(None).await.unwrap().is_empty());
        let item: LineItem = shop.store.get(&item.id).await.unwrap().unwrap();
        assert!(!item.is_active());
    }

    #[tokio::test]
    async fn test_quote_customization() {
        let shop = shop().await;
        let quote = shop
            .service
            .quote_customization(
                &shop.dtf.id,
                &CustomizationSpec::RollPrint {
                    width_cm: 10.0,
                    height_cm: 10.0,
                },
                50,
            )
            .await
            .unwrap();
        assert_eq!(quote.meters_needed, Some(3));
        assert_eq!(quote.total, Money::from_cents(60_000));
    }

    #[tokio::test]
    async fn test_quote_customization_rejects_out_of_range_quantity() {
        let shop = shop().await;
        let large_print = CustomizationSpec::RollPrint {
            width_cm: 400.0,
            height_cm: 400.0,
        };
        for quantity in [0, i64::MAX / 2] {
            let err = shop
                .service
                .quote_customization(&shop.dtf.id, &large_print, quantity)
                .await
                .unwrap_err();
            assert!(err.as_core().is_some_and(|e| e.is_input_error()));
        }
    }

    #[tokio::test]
    async fn test_order_flow_on_sqlite() {
        use crate::pool::{Database, DbConfig};

        let store = Database::new(DbConfig::in_memory()).await.unwrap().store();
        let now = Utc::now();
        let client = Client::new("Ana", now);
        let tee = Product::new("Basic tee", "T-shirt", Money::from_cents(5_000), now);
        let vinyl = Process::with_defaults("Vinyl", ProcessKind::Vinyl, now);
        store.save(&client).await.unwrap();
        store.save(&tee).await.unwrap();
        store.save(&vinyl).await.unwrap();

        let service = OrderService::new(store.clone(), ShopConfig::default());
        let order = service
            .create_order(NewOrder {
                client_id: client.id.clone(),
                tax_rate: Some(Percent::zero()),
                ..Default::default()
            })
            .await
            .unwrap();
        let item = service
            .add_line_item(
                &order.id,
                NewLineItem {
                    product_id: tee.id.clone(),
                    size: "S".to_string(),
                    color: "Black".to_string(),
                    quantity: 2,
                    unit_price: None,
                },
            )
            .await
            .unwrap();
        service
            .add_customization(
                &item.id,
                NewCustomization {
                    process_id: vinyl.id.clone(),
                    quantity: 2,
                    spec: Some(CustomizationSpec::Vinyl {
                        width_cm: 10.0,
                        height_cm: 10.0,
                        vinyl_type: "Glitter".to_string(),
                    }),
                    unit_price: None,
                    position: None,
                },
            )
            .await
            .unwrap();

        // 100 cm² × 0.06 = 6.00 per piece
        let order = service.get_order(&order.id).await.unwrap();
        assert_eq!(order.subtotal, Money::from_cents(10_000 + 1_200));
        assert_eq!(order.total, order.subtotal);
        assert_eq!(store.count::<Customization>().await.unwrap(), 1);
    }

    #[test]
    fn test_order_number_format() {
        let now = "2026-10-16T10:30:00Z".parse::<DateTime<Utc>>().unwrap();
        let number = generate_order_number(now);
        assert!(number.starts_with("ORD-20261016103000-"));
        assert_eq!(number.len(), 23);
    }
}
