//! # Seed Data Generator
//!
//! Populates a database with hardware-store products for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database
//! cargo run -p vendo-db --bin seed
//!
//! # Specify database path
//! cargo run -p vendo-db --bin seed -- --db ./data/vendo.db
//! ```
//!
//! ## Generated Products
//! - Standard goods counted in units (`quantity`)
//! - Iron bars counted in bars (`stock_barre`)
//! - Ceramic tiles counted in boxes (`stock_boite`)
//! - A few legacy rows with bars recorded under the standard category

use anyhow::Context;
use std::env;
use tracing_subscriber::EnvFilter;
use vendo_core::{Product, ProductCategory, StockSlot};
use vendo_db::{Database, DbConfig};

/// (name, purchase price in centimes, units on hand)
const STANDARD: &[(&str, i64, i64)] = &[
    ("Ciment gris 42.5kg", 85_000, 120),
    ("Clous 3 pouces (kg)", 15_000, 60),
    ("Peinture blanche 1 gal", 120_000, 25),
    ("Tuyau PVC 1/2", 9_500, 200),
    ("Fil electrique 2.5mm (rouleau)", 210_000, 15),
    ("Cadenas 40mm", 18_000, 40),
];

/// (name, purchase price, bars on hand)
const IRON: &[(&str, i64, i64)] = &[
    ("Fer 3/8", 28_000, 300),
    ("Fer 1/2", 45_000, 250),
    ("Fer 5/8", 68_000, 90),
    ("Fer 3/4", 95_000, 40),
];

/// (name, purchase price, boxes on hand)
const CERAMIC: &[(&str, i64, i64)] = &[
    ("Ceramique 30x30 beige", 110_000, 80),
    ("Ceramique 40x40 gris", 145_000, 55),
    ("Ceramique 60x60 blanc", 260_000, 20),
];

/// Miscategorized rows: bars recorded on standard products.
const LEGACY_BARS: &[(&str, i64, i64)] = &[("Fer 1/4 (ancien stock)", 18_000, 35)];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./vendo_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Vendo Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./vendo_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Vendo Seed Data Generator");
    println!("=========================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .with_context(|| format!("opening {db_path}"))?;

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("Database already has {} products, skipping seed.", existing);
        println!("Delete the database file to regenerate.");
        return Ok(());
    }

    let mut products = Vec::new();
    for (name, cost, units) in STANDARD {
        products.push(
            Product::new(*name, ProductCategory::Standard)
                .with_quantity(*units)
                .with_purchase_price(*cost)
                .with_alert_threshold(10),
        );
    }
    for (name, cost, bars) in IRON {
        products.push(
            Product::new(*name, ProductCategory::Iron)
                .with_bars(*bars)
                .with_purchase_price(*cost)
                .with_alert_threshold(25),
        );
    }
    for (name, cost, boxes) in CERAMIC {
        products.push(
            Product::new(*name, ProductCategory::Ceramic)
                .with_boxes(*boxes)
                .with_purchase_price(*cost)
                .with_alert_threshold(5),
        );
    }
    for (name, cost, bars) in LEGACY_BARS {
        products.push(
            Product::new(*name, ProductCategory::Standard)
                .with_bars(*bars)
                .with_purchase_price(*cost)
                .with_alert_threshold(5),
        );
    }

    let mut tx = db.begin().await?;
    for product in &products {
        db.products()
            .insert(&mut *tx, product)
            .await
            .with_context(|| format!("inserting {}", product.name))?;

        let slot = StockSlot::of(product);
        println!(
            "  {:<32} {:<9} {:>5} {}",
            product.name,
            product.category.as_str(),
            slot.current,
            slot.field.label()
        );
    }
    tx.commit().await?;

    println!();
    println!("Seeded {} products.", products.len());

    Ok(())
}
