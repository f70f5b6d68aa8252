//! # Product Repository
//!
//! Every query that touches the `products` table.
//!
//! ## Surface
//! - catalog CRUD behind the panel forms
//! - case-insensitive prefix search for the sale screen
//! - low-stock listing for alerts and the dashboard
//!
//! ## Prefix Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How Prefix Search Works                              │
//! │                                                                         │
//! │  User types: "YERBA"                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. Exact ID match: SELECT ... WHERE id = 'YERBA'    → no row          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  2. Range scan on name_lower (indexed):                                │
//! │     WHERE name_lower >= 'yerba' AND name_lower < 'yerba\u{f8ff}'       │
//! │     ORDER BY name_lower LIMIT 1                                        │
//! │       │                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │ products (idx_products_name_lower)      │                           │
//! │  │                                         │                           │
//! │  │ yerba mate 1kg      | ...               │ ← MATCH (first in range) │
//! │  │ yerba mate suave    | ...               │                           │
//! │  │ yogurt natural      | ...               │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Result: "Yerba Mate 1kg"                                              │
//! │                                                                         │
//! │  The upper bound uses a sentinel above any practical character,        │
//! │  so the range covers exactly the names starting with the prefix.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use gestio_core::{NewProduct, Product, NAME_PREFIX_SENTINEL};

/// Catalog access, handed out by `Database::products()`.
///
/// ## Usage
/// ```rust,ignore
/// let products = db.products();
///
/// let hit = products.find("yerba").await?;   // id or name prefix
/// let page = products.list().await?;         // full catalog, sorted
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

const PRODUCT_COLUMNS: &str = "id, name, name_lower, price, stock, created_at, updated_at";

impl ProductRepository {
    /// Wraps a pool handle; cloning the repository is cheap.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists all products ordered by lowercased name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name_lower"
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Looks up one product by primary key.
    ///
    /// `None` for an unknown id; `Err` only for storage faults.
    pub async fn get(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Stores a validated product, minting its id and timestamps.
    ///
    /// Returns the row as stored so callers see the generated fields.
    pub async fn insert(&self, new: &NewProduct) -> DbResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: new.name.clone(),
            name_lower: new.name_lower.clone(),
            price: new.price,
            stock: new.stock,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (id, name, name_lower, price, stock, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.name_lower)
        .bind(product.price)
        .bind(product.stock)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Rewrites a product's editable fields.
    ///
    /// `created_at` is preserved; `updated_at` is set to now. Fails with
    /// [`DbError::NotFound`] when the id is unknown.
    pub async fn update(&self, id: &str, changes: &NewProduct) -> DbResult<Product> {
        debug!(id = %id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                name_lower = ?3,
                price = ?4,
                stock = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.name_lower)
        .bind(changes.price)
        .bind(changes.stock)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Removes a product from the catalog.
    ///
    /// Sales that reference it keep their lines; history is immutable and
    /// outlives the catalog entry. Fails with [`DbError::NotFound`] when
    /// the id is unknown.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Finds a single product by id or name prefix.
    ///
    /// ## Resolution Order
    /// 1. Exact id match wins, even when another product's name starts
    ///    with the same text
    /// 2. Otherwise the query is lowercased and matched as a prefix of
    ///    `name_lower`; the first product in `name_lower` order is returned
    ///
    /// The caller trims the query. `None` when nothing matched either way.
    pub async fn find(&self, query: &str) -> DbResult<Option<Product>> {
        debug!(query = %query, "Searching product");

        // Exact ID match first
        if let Some(product) = self.get(query).await? {
            return Ok(Some(product));
        }

        // Prefix range scan over name_lower
        let prefix = query.to_lowercase();
        let upper = format!("{prefix}{NAME_PREFIX_SENTINEL}");

        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE name_lower >= ?1 AND name_lower < ?2
            ORDER BY name_lower
            LIMIT 1
            "#
        ))
        .bind(&prefix)
        .bind(&upper)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists products with stock strictly below the threshold.
    ///
    /// Ordered by stock ascending so the most urgent products come first;
    /// ties break on name for a stable listing.
    pub async fn below_stock(&self, threshold: i64) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE stock < ?1
            ORDER BY stock ASC, name_lower ASC
            "#
        ))
        .bind(threshold)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Counts total products (for diagnostics and seeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
