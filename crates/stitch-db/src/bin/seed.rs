//! # Seed Data Generator
//!
//! Populates the database with a starter catalog for development.
//!
//! ## Usage
//! ```bash
//! # Seed the database named by STITCH_DATABASE_PATH (default stitchworks.db)
//! cargo run -p stitch-db --bin seed
//!
//! # Specify database path
//! cargo run -p stitch-db --bin seed -- --db ./data/stitch_dev.db
//!
//! # Catalog only, no demo order
//! cargo run -p stitch-db --bin seed -- --no-demo
//! ```
//!
//! ## Generated Data
//! - One process per kind (DTF, sublimation, embroidery, vinyl) with factory pricing
//! - Garments across categories (t-shirts, hoodies, caps, ...)
//! - A demo client with one order: two line items and three customizations

use std::env;

use chrono::Utc;
use stitch_core::{CustomizationSpec, Money, ProcessKind, SizeTier};
use stitch_db::{
    CatalogService, Database, NewClient, NewCustomization, NewLineItem, NewOrder, NewProduct,
    OrderService, ShopConfig,
};
use tracing_subscriber::EnvFilter;

/// Garments: (name, category, price in cents, sizes)
const GARMENTS: &[(&str, &str, i64, &[&str])] = &[
    ("Basic cotton tee", "T-shirt", 4_500, &["S", "M", "L", "XL"]),
    ("Premium cotton tee", "T-shirt", 7_500, &["S", "M", "L", "XL", "XXL"]),
    ("Polyester sport tee", "T-shirt", 6_000, &["S", "M", "L", "XL"]),
    ("Polo shirt", "Polo", 9_500, &["S", "M", "L", "XL"]),
    ("Pullover hoodie", "Hoodie", 18_000, &["S", "M", "L", "XL", "XXL"]),
    ("Zip hoodie", "Hoodie", 21_000, &["S", "M", "L", "XL"]),
    ("Trucker cap", "Cap", 5_500, &["One size"]),
    ("Canvas tote bag", "Bag", 3_500, &["One size"]),
    ("Kitchen apron", "Apron", 6_500, &["One size"]),
];

/// Colors offered on every seeded garment
const COLORS: &[&str] = &["White", "Black", "Navy", "Red", "Heather grey"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let mut config = ShopConfig::from_env()?;
    let mut demo = true;

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--no-demo" => demo = false,
            "--help" | "-h" => {
                println!("Stitchworks Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: $STITCH_DATABASE_PATH or stitchworks.db)");
                println!("      --no-demo      Seed the catalog only");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Stitchworks Seed Data Generator");
    println!("==================================");
    println!("Database: {}", config.database_path.display());
    println!();

    let db = Database::new(config.db_config()).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let store = db.store();
    let catalog = CatalogService::new(store.clone());
    let orders = OrderService::new(store.clone(), config);

    // Processes
    let installed = catalog.install_default_processes().await?;
    println!("✓ Installed {} default processes", installed.len());

    // Garments
    let existing = store.count::<stitch_core::Product>().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let mut products = Vec::new();
    for (name, category, price_cents, sizes) in GARMENTS {
        let product = catalog
            .create_product(NewProduct {
                name: name.to_string(),
                category: category.to_string(),
                base_price: Money::from_cents(*price_cents),
                description: None,
                sizes: sizes.iter().map(|s| s.to_string()).collect(),
                colors: COLORS.iter().map(|c| c.to_string()).collect(),
            })
            .await?;
        products.push(product);
    }
    println!("✓ Created {} garments", products.len());

    if !demo {
        println!();
        println!("✓ Seed complete!");
        return Ok(());
    }

    // Demo order
    let processes = catalog.list_processes().await?;
    let process = |kind: ProcessKind| {
        processes
            .iter()
            .find(|p| p.kind() == kind)
            .map(|p| p.id.clone())
            .ok_or_else(|| format!("no active {} process", kind))
    };

    let client = catalog
        .create_client(NewClient {
            name: "Demo".to_string(),
            surname: Some("Customer".to_string()),
            email: Some("demo@stitchworks.local".to_string()),
            company: Some("Demo Running Club".to_string()),
            ..Default::default()
        })
        .await?;

    let order = orders
        .create_order(NewOrder {
            client_id: client.id.clone(),
            description: Some("Club shirts and hoodies".to_string()),
            ..Default::default()
        })
        .await?;

    let shirts = orders
        .add_line_item(
            &order.id,
            NewLineItem {
                product_id: products[2].id.clone(),
                size: "M".to_string(),
                color: "Navy".to_string(),
                quantity: 20,
                unit_price: None,
            },
        )
        .await?;
    let hoodies = orders
        .add_line_item(
            &order.id,
            NewLineItem {
                product_id: products[4].id.clone(),
                size: "L".to_string(),
                color: "Black".to_string(),
                quantity: 5,
                unit_price: None,
            },
        )
        .await?;

    orders
        .add_customization(
            &shirts.id,
            NewCustomization {
                process_id: process(ProcessKind::Sublimation)?,
                quantity: 20,
                spec: Some(CustomizationSpec::RollPrint {
                    width_cm: 28.0,
                    height_cm: 35.0,
                }),
                unit_price: None,
                position: Some("Center chest".to_string()),
            },
        )
        .await?;
    orders
        .add_customization(
            &hoodies.id,
            NewCustomization {
                process_id: process(ProcessKind::Embroidery)?,
                quantity: 5,
                spec: Some(CustomizationSpec::Embroidery {
                    tier: SizeTier::Small,
                    include_setup: true,
                }),
                unit_price: None,
                position: Some("Left chest".to_string()),
            },
        )
        .await?;
    orders
        .add_customization(
            &hoodies.id,
            NewCustomization {
                process_id: process(ProcessKind::Vinyl)?,
                quantity: 5,
                spec: Some(CustomizationSpec::Vinyl {
                    width_cm: 30.0,
                    height_cm: 8.0,
                    vinyl_type: "Reflective".to_string(),
                }),
                unit_price: None,
                position: Some("Upper back".to_string()),
            },
        )
        .await?;

    let order = orders.record_payment(&order.id, Money::from_cents(50_000)).await?;

    println!("✓ Created demo order {}", order.order_number);
    println!("  Subtotal:    {}", order.subtotal);
    println!("  Tax:         {}", order.tax);
    println!("  Total:       {}", order.total);
    println!("  Paid:        {}", order.amount_paid);
    println!("  Outstanding: {}", order.outstanding);
    println!("  Due:         {}", order.estimated_delivery.format("%Y-%m-%d"));

    let overdue = orders
        .list_orders(None)
        .await?
        .iter()
        .filter(|o| o.is_overdue(Utc::now()))
        .count();
    println!("  Overdue orders: {}", overdue);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
