//! Demo catalog seeder.
//!
//! Fills an empty database with grocery products so the panel has
//! something to show during development:
//!
//! ```bash
//! cargo run -p gestio-db --bin seed                     # 60 products
//! cargo run -p gestio-db --bin seed -- --count 120
//! cargo run -p gestio-db --bin seed -- --db ./demo.db
//! ```
//!
//! Names combine a base article with a size variant ("Yerba Mate 1kg").
//! Prices and stock are derived from the position in the catalog, so the
//! output is deterministic and a handful of items always sit under the
//! default low-stock threshold.

use std::env;

use gestio_core::{NewProduct, DEFAULT_STOCK_THRESHOLD};
use gestio_db::{Database, DbConfig};

/// Base articles per aisle.
const AISLES: &[(&str, &[&str])] = &[
    (
        "Almacen",
        &[
            "Yerba Mate",
            "Azucar",
            "Harina 000",
            "Arroz",
            "Fideos Spaghetti",
            "Aceite de Girasol",
            "Sal Fina",
            "Cafe Molido",
        ],
    ),
    (
        "Bebidas",
        &[
            "Agua Mineral",
            "Gaseosa Cola",
            "Jugo de Naranja",
            "Soda",
            "Te Negro",
            "Mate Cocido",
            "Cerveza Rubia",
            "Vino Tinto",
        ],
    ),
    (
        "Lacteos",
        &[
            "Leche Entera",
            "Leche Descremada",
            "Yogurt Natural",
            "Queso Cremoso",
            "Queso Rallado",
            "Manteca",
            "Crema de Leche",
            "Dulce de Leche",
        ],
    ),
    (
        "Limpieza",
        &[
            "Lavandina",
            "Detergente",
            "Jabon en Polvo",
            "Esponja",
            "Papel Higienico",
            "Servilletas",
            "Desodorante de Ambiente",
            "Trapo de Piso",
        ],
    ),
    (
        "Panaderia",
        &[
            "Pan Flauta",
            "Pan Lactal",
            "Facturas Surtidas",
            "Medialunas",
            "Bizcochos",
            "Pan Rallado",
            "Grisines",
            "Budin de Vainilla",
        ],
    ),
];

/// Size suffixes with their price bump in cents.
const SIZES: &[(&str, i64)] = &[("500g", 0), ("1kg", 150), ("x6", 300)];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 60;
    let mut db_path = String::from("./gestio.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(60);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("seed - fill an empty Gestio database with demo products");
                println!();
                println!("Usage: seed [--count <N>] [--db <PATH>]");
                println!();
                println!("  -c, --count <N>   how many products to insert (default: 60)");
                println!("  -d, --db <PATH>   SQLite file to seed (default: ./gestio.db)");
                println!("  -h, --help        this message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Gestio demo seed");
    println!("  database: {}", db_path);
    println!("  target:   {} products", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Database ready, schema up to date");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Catalog already holds {} products; nothing to do.", existing);
        println!("  The seeder only fills an empty database. Remove the file to start over.");
        return Ok(());
    }

    // Walk aisle x article x size until the target is reached
    let mut batch = Vec::with_capacity(count);
    'fill: for (aisle_no, (_aisle, articles)) in AISLES.iter().enumerate() {
        for (article_no, article) in articles.iter().enumerate() {
            for (size_no, (size, bump)) in SIZES.iter().enumerate() {
                if batch.len() >= count {
                    break 'fill;
                }
                let position = aisle_no * 100 + article_no * 10 + size_no;
                batch.push(demo_product(article, size, *bump, position));
            }
        }
    }
    if batch.len() < count {
        println!("  catalog tops out at {} distinct products", batch.len());
    }

    let start = std::time::Instant::now();
    let mut inserted = 0;

    for product in &batch {
        if let Err(e) = db.products().insert(product).await {
            eprintln!("insert failed for {}: {}", product.name, e);
        } else {
            inserted += 1;
        }
    }

    println!("✓ Inserted {} products in {:?}", inserted, start.elapsed());

    let low = db.products().below_stock(DEFAULT_STOCK_THRESHOLD).await?;
    println!(
        "  {} of them sit under the stock threshold of {}",
        low.len(),
        DEFAULT_STOCK_THRESHOLD
    );

    if let Some(hit) = db.products().find("yerba").await? {
        println!("  prefix check: 'yerba' resolves to {}", hit.name);
    }

    println!("✓ Done");

    Ok(())
}

/// Deterministic price and stock derived from the catalog position.
fn demo_product(article: &str, size: &str, bump_cents: i64, position: usize) -> NewProduct {
    // Base price $0.99 - $8.98 plus the size bump
    let cents = 99 + ((position * 17) % 800) as i64 + bump_cents;
    let stock = (position % 21) as i64;

    NewProduct::new(&format!("{} {}", article, size), cents as f64 / 100.0, stock)
}
