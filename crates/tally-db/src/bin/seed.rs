//! # Seed Data Generator
//!
//! Fills a store with a small shop: units, products and a handful of
//! receipts, some of them closed. Prints the sales aggregate as JSON.
//!
//! ## Usage
//! ```bash
//! # Backend from POS_REPOSITORY_KIND (memory by default)
//! cargo run -p tally-db --bin seed
//!
//! # SQLite file
//! cargo run -p tally-db --bin seed -- --db ./data/tally.db
//!
//! # Force the in-memory backend
//! cargo run -p tally-db --bin seed -- --memory
//! ```
//!
//! Logs go to stderr (`RUST_LOG` overrides the default filter); stdout only
//! carries the JSON report.

use std::env;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tally_core::{Money, Product, Receipt, ReceiptStatus, Sales, StoreError, Unit};
use tally_db::{Backend, StoreConfig, Stores};

/// Units of measure.
const UNITS: &[&str] = &["kg", "piece", "litre"];

/// (unit index, name, barcode, price in cents)
const PRODUCTS: &[(usize, &str, &str, i64)] = &[
    (0, "Apple", "123", 150),
    (0, "Banana", "124", 99),
    (0, "Potato", "125", 80),
    (1, "Bread", "200", 250),
    (1, "Chocolate Bar", "201", 120),
    (1, "Eggs Dozen", "202", 399),
    (2, "Whole Milk", "300", 115),
    (2, "Orange Juice", "301", 325),
];

/// Baskets as (product index, quantity) pairs. Every other basket is closed.
const BASKETS: &[&[(usize, i64)]] = &[
    &[(0, 3)],
    &[(3, 1), (6, 2)],
    &[(1, 6), (4, 2), (7, 1)],
    &[(5, 1)],
    &[(2, 10), (3, 2)],
];

#[derive(Debug, Serialize)]
struct Report {
    units: usize,
    products: usize,
    receipts: usize,
    sales: Sales,
    sample: Option<Receipt>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut config = StoreConfig::from_env()?;

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.backend = Backend::Sqlite;
                    config.database_path = PathBuf::from(&args[i + 1]);
                    i += 1;
                }
            }
            "--memory" | "-m" => {
                config.backend = Backend::Memory;
            }
            "--help" | "-h" => {
                println!("Tally POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Seed a SQLite file");
                println!("  -m, --memory       Seed the in-memory backend");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(arg = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    let stores = Stores::open(&config).await?;
    info!(backend = ?config.backend, "Stores ready");

    let mut units = Vec::with_capacity(UNITS.len());
    for name in UNITS {
        let unit = Unit::new(*name);
        match stores.units.create(&unit).await {
            Ok(()) => units.push(unit),
            // A reused database file already holds the seed set.
            Err(StoreError::AlreadyExists { .. }) => {
                warn!(name = %name, "Unit already seeded, skipping");
                if let Some(existing) = stores
                    .units
                    .read_all()
                    .await?
                    .into_iter()
                    .find(|u| u.name == *name)
                {
                    units.push(existing);
                }
            }
            Err(e) => return Err(e.into()),
        }
    }

    let mut products = Vec::with_capacity(PRODUCTS.len());
    for (unit_idx, name, barcode, price) in PRODUCTS {
        let Some(unit) = units.get(*unit_idx) else {
            continue;
        };
        let product = Product::new(&unit.id, *name, *barcode, Money::from_cents(*price));
        match stores.products.create(&product).await {
            Ok(()) => products.push(product),
            Err(StoreError::AlreadyExists { .. }) => {
                warn!(barcode = %barcode, "Product already seeded, skipping");
                if let Some(existing) = stores
                    .products
                    .read_all()
                    .await?
                    .into_iter()
                    .find(|p| p.barcode == *barcode)
                {
                    products.push(existing);
                }
            }
            Err(e) => return Err(e.into()),
        }
    }

    let mut sample = None;
    for (n, basket) in BASKETS.iter().enumerate() {
        let receipt = Receipt::new();
        stores.receipts.create(&receipt).await?;

        let mut current = receipt;
        for (product_idx, quantity) in basket.iter() {
            if let Some(product) = products.get(*product_idx) {
                current = stores
                    .receipts
                    .add_product(&current.id, &product.id, *quantity)
                    .await?;
            }
        }

        if n % 2 == 0 {
            stores
                .receipts
                .update_status(&current.id, ReceiptStatus::Closed)
                .await?;
            current.status = ReceiptStatus::Closed;
        }

        info!(
            id = %current.id,
            total = %current.total(),
            status = %current.status,
            "Seeded receipt"
        );
        sample.get_or_insert(current);
    }

    let report = Report {
        units: units.len(),
        products: products.len(),
        receipts: BASKETS.len(),
        sales: stores.sales.read().await?,
        sample,
    };

    info!(revenue = %report.sales.revenue(), closed = report.sales.n_receipts, "Seed complete");
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tally=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
