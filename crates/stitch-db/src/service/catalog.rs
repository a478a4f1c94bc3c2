//! # Catalog Service
//!
//! Clients, products and processes, including their guarded soft delete.
//!
//! ## Delete Flow
//! ```text
//! delete_client(id)
//!    │
//!    ├── load client            (already deleted → Deleted, nothing written)
//!    ├── re-read its orders     (fresh, right before the flip)
//!    ├── integrity::check_client_deletable
//!    │        │
//!    │        ├── Err(violation) ──► warn!, DeleteOutcome::Refused(violation)
//!    │        └── Ok ──► mark_deleted, save, DeleteOutcome::Deleted
//! ```
//!
//! Products and processes follow the same shape with their own guard.

use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

use stitch_core::integrity::{
    check_client_deletable, check_process_deletable, check_product_deletable, IntegrityResult,
};
use stitch_core::validation::{validate_email, validate_name, validate_price, validate_variant};
use stitch_core::{
    Client, ClientType, Customization, Entity, LineItem, Money, Order, PricingParams, Process,
    ProcessKind, Product,
};

use super::{load, load_active, DeleteOutcome};
use crate::error::DbResult;
use crate::storage::Storage;

// =============================================================================
// Requests
// =============================================================================

/// Editable client fields, used for both create and update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewClient {
    pub name: String,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub company: Option<String>,
    pub tax_id: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub client_type: ClientType,
    pub notes: Option<String>,
}

impl NewClient {
    fn validate(&self) -> DbResult<()> {
        validate_name("name", &self.name)?;
        if let Some(email) = self.email.as_deref().filter(|e| !e.trim().is_empty()) {
            validate_email(email)?;
        }
        Ok(())
    }

    fn apply(self, client: &mut Client) {
        client.name = self.name.trim().to_string();
        client.surname = self.surname;
        client.email = self.email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty());
        client.phone = self.phone;
        client.address = self.address;
        client.company = self.company;
        client.tax_id = self.tax_id;
        client.city = self.city;
        client.region = self.region;
        client.client_type = self.client_type;
        client.notes = self.notes;
    }
}

/// Editable product fields. Empty size/color lists keep the defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub base_price: Money,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
}

impl NewProduct {
    fn validate(&self) -> DbResult<()> {
        validate_name("name", &self.name)?;
        validate_name("category", &self.category)?;
        validate_price("base_price", self.base_price)?;
        for size in &self.sizes {
            validate_variant("size", size)?;
        }
        for color in &self.colors {
            validate_variant("color", color)?;
        }
        Ok(())
    }

    fn apply(self, product: &mut Product) {
        product.name = self.name.trim().to_string();
        product.category = self.category.trim().to_string();
        product.base_price = self.base_price;
        product.description = self.description;
        if !self.sizes.is_empty() {
            product.sizes = self.sizes;
        }
        if !self.colors.is_empty() {
            product.colors = self.colors;
        }
    }
}

fn default_process_name(kind: ProcessKind) -> &'static str {
    match kind {
        ProcessKind::Dtf => "DTF",
        ProcessKind::Sublimation => "Sublimation",
        ProcessKind::Embroidery => "Embroidery",
        ProcessKind::Vinyl => "Vinyl",
    }
}

// =============================================================================
// Service
// =============================================================================

#[derive(Debug, Clone)]
pub struct CatalogService<S: Storage> {
    store: S,
}

impl<S: Storage> CatalogService<S> {
    pub fn new(store: S) -> Self {
        CatalogService { store }
    }

    /// Flips an entity back to `Active`.
    pub async fn restore<E: Entity>(&self, id: &str) -> DbResult<E> {
        let mut entity: E = load(&self.store, id).await?;
        if !entity.is_active() {
            entity.restore(Utc::now());
            self.store.save(&entity).await?;
            info!(kind = %E::KIND, id = %id, "Entity restored");
        }
        Ok(entity)
    }

    async fn guarded_delete<E: Entity>(
        &self,
        mut entity: E,
        check: IntegrityResult,
    ) -> DbResult<DeleteOutcome> {
        if let Err(violation) = check {
            warn!(
                kind = %E::KIND,
                id = %entity.id(),
                blockers = violation.blockers.len(),
                "Delete refused: {}",
                violation
            );
            return Ok(DeleteOutcome::Refused(violation));
        }

        entity.mark_deleted(Utc::now());
        self.store.save(&entity).await?;

        info!(kind = %E::KIND, id = %entity.id(), "Entity deleted");
        Ok(DeleteOutcome::Deleted)
    }

    // -------------------------------------------------------------------------
    // Clients
    // -------------------------------------------------------------------------

    pub async fn create_client(&self, new: NewClient) -> DbResult<Client> {
        new.validate()?;

        let mut client = Client::new("", Utc::now());
        new.apply(&mut client);
        self.store.save(&client).await?;

        info!(client_id = %client.id, name = %client.display_name(), "Client created");
        Ok(client)
    }

    pub async fn update_client(&self, client_id: &str, update: NewClient) -> DbResult<Client> {
        update.validate()?;

        let mut client: Client = load_active(&self.store, client_id).await?;
        update.apply(&mut client);
        client.touch(Utc::now());
        self.store.save(&client).await?;

        info!(client_id = %client.id, "Client updated");
        Ok(client)
    }

    pub async fn get_client(&self, client_id: &str) -> DbResult<Client> {
        load(&self.store, client_id).await
    }

    pub async fn list_clients(&self) -> DbResult<Vec<Client>> {
        self.store.find_all_active().await
    }

    /// Soft-deletes a client unless it still has open orders.
    pub async fn delete_client(&self, client_id: &str) -> DbResult<DeleteOutcome> {
        let client: Client = load(&self.store, client_id).await?;
        if !client.is_active() {
            return Ok(DeleteOutcome::Deleted);
        }

        let orders: Vec<Order> = self
            .store
            .find_by_condition(|o: &Order| o.client_id == client_id)
            .await?;

        let check = check_client_deletable(client_id, &orders);
        self.guarded_delete(client, check).await
    }

    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    pub async fn create_product(&self, new: NewProduct) -> DbResult<Product> {
        new.validate()?;

        let mut product = Product::new("", "", Money::zero(), Utc::now());
        new.apply(&mut product);
        self.store.save(&product).await?;

        info!(
            product_id = %product.id,
            name = %product.name,
            base_price = %product.base_price,
            "Product created"
        );
        Ok(product)
    }

    /// Replaces editable fields. Prices already captured on line items are
    /// left alone.
    pub async fn update_product(&self, product_id: &str, update: NewProduct) -> DbResult<Product> {
        update.validate()?;

        let mut product: Product = load_active(&self.store, product_id).await?;
        update.apply(&mut product);
        product.touch(Utc::now());
        self.store.save(&product).await?;

        info!(product_id = %product.id, "Product updated");
        Ok(product)
    }

    pub async fn get_product(&self, product_id: &str) -> DbResult<Product> {
        load(&self.store, product_id).await
    }

    pub async fn list_products(&self) -> DbResult<Vec<Product>> {
        self.store.find_all_active().await
    }

    /// Soft-deletes a product unless an open order still uses it.
    pub async fn delete_product(&self, product_id: &str) -> DbResult<DeleteOutcome> {
        let product: Product = load(&self.store, product_id).await?;
        if !product.is_active() {
            return Ok(DeleteOutcome::Deleted);
        }

        let items: Vec<LineItem> = self
            .store
            .find_by_condition(|i: &LineItem| i.is_active() && i.product_id == product_id)
            .await?;
        let orders: Vec<Order> = self.store.find_all_active().await?;

        let check = check_product_deletable(product_id, &items, &orders);
        self.guarded_delete(product, check).await
    }

    // -------------------------------------------------------------------------
    // Processes
    // -------------------------------------------------------------------------

    pub async fn create_process(
        &self,
        name: &str,
        description: Option<String>,
        pricing: PricingParams,
    ) -> DbResult<Process> {
        validate_name("name", name)?;

        let mut process = Process::new(name.trim(), pricing, Utc::now());
        process.description = description;
        self.store.save(&process).await?;

        info!(process_id = %process.id, kind = %process.kind(), "Process created");
        Ok(process)
    }

    /// Replaces the pricing parameters of a process; the kind is fixed.
    pub async fn reconfigure_process(
        &self,
        process_id: &str,
        pricing: PricingParams,
    ) -> DbResult<Process> {
        let mut process: Process = load_active(&self.store, process_id).await?;
        process.reconfigure(pricing, Utc::now())?;
        self.store.save(&process).await?;

        info!(process_id = %process.id, kind = %process.kind(), "Process reconfigured");
        Ok(process)
    }

    pub async fn get_process(&self, process_id: &str) -> DbResult<Process> {
        load(&self.store, process_id).await
    }

    pub async fn list_processes(&self) -> DbResult<Vec<Process>> {
        self.store.find_all_active().await
    }

    /// Creates a process with factory pricing for every kind that has no
    /// active process yet. Returns the processes created.
    pub async fn install_default_processes(&self) -> DbResult<Vec<Process>> {
        let existing = self.list_processes().await?;
        let now = Utc::now();

        let mut created = Vec::new();
        for kind in ProcessKind::ALL {
            if existing.iter().any(|p| p.kind() == kind) {
                continue;
            }
            let process = Process::with_defaults(default_process_name(kind), kind, now);
            self.store.save(&process).await?;
            created.push(process);
        }

        if !created.is_empty() {
            info!(count = created.len(), "Installed default processes");
        }
        Ok(created)
    }

    /// Soft-deletes a process unless an active customization uses it.
    pub async fn delete_process(&self, process_id: &str) -> DbResult<DeleteOutcome> {
        let process: Process = load(&self.store, process_id).await?;
        if !process.is_active() {
            return Ok(DeleteOutcome::Deleted);
        }

        let customizations: Vec<Customization> = self
            .store
            .find_by_condition(|c: &Customization| c.is_active() && c.process_id == process_id)
            .await?;

        let check = check_process_deletable(process_id, &customizations);
        self.guarded_delete(process, check).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
