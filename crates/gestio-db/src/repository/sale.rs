//! # Sale Repository
//!
//! Database operations for sales and sale items.
//!
//! ## Registration Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Sale Registration                                   │
//! │                                                                         │
//! │  register(lines, total)                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN TRANSACTION                                                      │
//! │       │                                                                 │
//! │       │  For every line, in submission order:                           │
//! │       │                                                                 │
//! │       ├── UPDATE products SET stock = stock - qty                       │
//! │       │   WHERE id = ? AND stock >= qty                                 │
//! │       │        │                                                        │
//! │       │        ├── 1 row   → next line                                  │
//! │       │        └── 0 rows  → SELECT to tell apart:                      │
//! │       │                      missing product / insufficient stock       │
//! │       │                      → error, transaction rolls back            │
//! │       │                                                                 │
//! │       ├── INSERT INTO sales                                             │
//! │       ├── INSERT INTO sale_items (one row per line)                     │
//! │       ▼                                                                 │
//! │  COMMIT ← stock and ledger change together or not at all                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The decrement is conditional (`stock >= qty`) so a concurrent sale can
//! never drive stock negative; the losing writer gets a friendly error
//! instead of a constraint violation.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use gestio_core::{CoreError, Sale, SaleLine, SaleSummary};

/// Error raised while registering a sale.
///
/// Business outcomes (missing product, insufficient stock) surface as
/// [`CoreError`] so callers can report them without string matching;
/// everything else is infrastructure and stays a [`DbError`].
#[derive(Debug, Error)]
pub enum RegisterSaleError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<sqlx::Error> for RegisterSaleError {
    fn from(err: sqlx::Error) -> Self {
        RegisterSaleError::Db(DbError::from(err))
    }
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Registers a sale: decrements stock and writes the ledger entry in
    /// one transaction.
    ///
    /// Lines are processed in submission order. The same product may appear
    /// on several lines; each decrement sees the stock left by the previous
    /// one, so an over-committed cart fails exactly where coverage runs out.
    ///
    /// ## Arguments
    /// * `lines` - Validated sale lines (non-empty, quantity >= 1)
    /// * `total` - Total as submitted by the caller, stored as-is
    ///
    /// ## Returns
    /// * `Ok(Sale)` - The persisted sale
    /// * `Err(Core(ProductNotFound))` - A line references a missing product
    /// * `Err(Core(InsufficientStock))` - A line exceeds remaining stock
    pub async fn register(
        &self,
        lines: &[SaleLine],
        total: f64,
    ) -> Result<Sale, RegisterSaleError> {
        let sale_id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(id = %sale_id, lines = lines.len(), "Registering sale");

        let mut tx = self.pool.begin().await?;

        for line in lines {
            let result = sqlx::query(
                r#"
                UPDATE products
                SET stock = stock - ?2, updated_at = ?3
                WHERE id = ?1 AND stock >= ?2
                "#,
            )
            .bind(&line.product_id)
            .bind(line.quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                // Inside the transaction, so the diagnosis sees the same
                // state the failed decrement saw.
                let current = sqlx::query_as::<_, (String, i64)>(
                    "SELECT name, stock FROM products WHERE id = ?1",
                )
                .bind(&line.product_id)
                .fetch_optional(&mut *tx)
                .await?;

                let err = match current {
                    None => CoreError::ProductNotFound(line.product_id.clone()),
                    Some((name, available)) => CoreError::InsufficientStock {
                        name,
                        available,
                        requested: line.quantity,
                    },
                };
                return Err(err.into());
            }
        }

        sqlx::query("INSERT INTO sales (id, total, created_at) VALUES (?1, ?2, ?3)")
            .bind(&sale_id)
            .bind(total)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        for (line_no, line) in lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO sale_items (sale_id, line_no, product_id, quantity)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(&sale_id)
            .bind(line_no as i64)
            .bind(&line.product_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        debug!(id = %sale_id, total = %total, "Sale registered");

        Ok(Sale {
            id: sale_id,
            lines: lines.to_vec(),
            total,
            created_at: now,
        })
    }

    /// Lists sale summaries within an optional date window, newest first.
    ///
    /// Bounds are half-open: `from <= created_at < to`. A `None` bound is
    /// simply absent from the filter.
    pub async fn list_between(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> DbResult<Vec<SaleSummary>> {
        let summaries = sqlx::query_as::<_, SaleSummary>(
            r#"
            SELECT
                s.id,
                COALESCE(SUM(i.quantity), 0) AS item_count,
                s.total,
                s.created_at
            FROM sales s
            LEFT JOIN sale_items i ON i.sale_id = s.id
            WHERE (?1 IS NULL OR s.created_at >= ?1)
              AND (?2 IS NULL OR s.created_at < ?2)
            GROUP BY s.id, s.total, s.created_at
            ORDER BY s.created_at DESC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = summaries.len(), "Listed sales");
        Ok(summaries)
    }

    /// Gets a sale with its lines, in line order.
    ///
    /// ## Returns
    /// * `Ok(Some(Sale))` - Sale found
    /// * `Ok(None)` - Sale not found
    pub async fn get(&self, id: &str) -> DbResult<Option<Sale>> {
        let row = sqlx::query_as::<_, (String, f64, DateTime<Utc>)>(
            "SELECT id, total, created_at FROM sales WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some((id, total, created_at)) = row else {
            return Ok(None);
        };

        let lines = sqlx::query_as::<_, SaleLine>(
            r#"
            SELECT product_id, quantity
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY line_no
            "#,
        )
        .bind(&id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Sale {
            id,
            lines,
            total,
            created_at,
        }))
    }

    /// Counts total sales (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::TimeZone;
    use gestio_core::NewProduct;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn line(product_id: &str, quantity: i64) -> SaleLine {
        SaleLine {
            product_id: product_id.to_string(),
            quantity,
        }
    }

    #[tokio::test]
    async fn test_register_decrements_stock_and_persists() {
        let db = test_db().await;
        let products = db.products();
        let sales = db.sales();

        let yerba = products
            .insert(&NewProduct::new("Yerba Mate 1kg", 8.5, 10))
            .await
            .unwrap();
        let cafe = products
            .insert(&NewProduct::new("Cafe Molido 500g", 6.0, 5))
            .await
            .unwrap();

        let sale = sales
            .register(&[line(&yerba.id, 3), line(&cafe.id, 1)], 31.5)
            .await
            .unwrap();

        // Total is stored exactly as submitted
        assert_eq!(sale.total, 31.5);
        assert_eq!(sale.lines.len(), 2);

        assert_eq!(products.get(&yerba.id).await.unwrap().unwrap().stock, 7);
        assert_eq!(products.get(&cafe.id).await.unwrap().unwrap().stock, 4);

        let fetched = sales.get(&sale.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, sale.id);
        assert_eq!(fetched.total, 31.5);
        assert_eq!(fetched.lines, vec![line(&yerba.id, 3), line(&cafe.id, 1)]);
    }

    #[tokio::test]
    async fn test_register_insufficient_stock_rolls_back() {
        let db = test_db().await;
        let products = db.products();
        let sales = db.sales();

        let pan = products
            .insert(&NewProduct::new("Pan Flauta", 1.2, 10))
            .await
            .unwrap();
        let sal = products
            .insert(&NewProduct::new("Sal Fina", 0.9, 1))
            .await
            .unwrap();

        let err = sales
            .register(&[line(&pan.id, 2), line(&sal.id, 5)], 7.0)
            .await
            .unwrap_err();

        match err {
            RegisterSaleError::Core(CoreError::InsufficientStock {
                name,
                available,
                requested,
            }) => {
                assert_eq!(name, "Sal Fina");
                assert_eq!(available, 1);
                assert_eq!(requested, 5);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // The first line's decrement must have been rolled back
        assert_eq!(products.get(&pan.id).await.unwrap().unwrap().stock, 10);
        assert_eq!(products.get(&sal.id).await.unwrap().unwrap().stock, 1);
        assert_eq!(sales.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_register_missing_product_rolls_back() {
        let db = test_db().await;
        let products = db.products();
        let sales = db.sales();

        let pan = products
            .insert(&NewProduct::new("Pan Flauta", 1.2, 10))
            .await
            .unwrap();

        let err = sales
            .register(&[line(&pan.id, 1), line("ghost", 1)], 2.4)
            .await
            .unwrap_err();

        match err {
            RegisterSaleError::Core(CoreError::ProductNotFound(id)) => {
                assert_eq!(id, "ghost");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert_eq!(products.get(&pan.id).await.unwrap().unwrap().stock, 10);
        assert_eq!(sales.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_register_duplicate_product_decrements_sequentially() {
        let db = test_db().await;
        let products = db.products();
        let sales = db.sales();

        let arroz = products
            .insert(&NewProduct::new("Arroz 1kg", 2.2, 3))
            .await
            .unwrap();

        // 2 + 2 > 3: the second line sees the stock left by the first
        let err = sales
            .register(&[line(&arroz.id, 2), line(&arroz.id, 2)], 8.8)
            .await
            .unwrap_err();

        match err {
            RegisterSaleError::Core(CoreError::InsufficientStock {
                available,
                requested,
                ..
            }) => {
                assert_eq!(available, 1);
                assert_eq!(requested, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // Rollback restores the full stock
        assert_eq!(products.get(&arroz.id).await.unwrap().unwrap().stock, 3);

        // A covered duplicate cart goes through
        let sale = sales
            .register(&[line(&arroz.id, 2), line(&arroz.id, 1)], 6.6)
            .await
            .unwrap();
        assert_eq!(sale.lines.len(), 2);
        assert_eq!(products.get(&arroz.id).await.unwrap().unwrap().stock, 0);
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let db = test_db().await;
        assert!(db.sales().get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_between_filters_and_orders() {
        let db = test_db().await;
        let sales = db.sales();

        // Insert ledger rows directly so the timestamps are deterministic
        let day14 = Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap();
        let day15 = Utc.with_ymd_and_hms(2026, 3, 15, 14, 5, 0).unwrap();

        for (id, total, at) in [("s1", 8.5, day14), ("s2", 22.0, day15)] {
            sqlx::query("INSERT INTO sales (id, total, created_at) VALUES (?1, ?2, ?3)")
                .bind(id)
                .bind(total)
                .bind(at)
                .execute(db.pool())
                .await
                .unwrap();
        }
        sqlx::query(
            "INSERT INTO sale_items (sale_id, line_no, product_id, quantity) \
             VALUES ('s2', 0, 'p1', 2), ('s2', 1, 'p2', 3)",
        )
        .execute(db.pool())
        .await
        .unwrap();

        // No bounds: everything, newest first
        let all = sales.list_between(None, None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "s2");
        assert_eq!(all[0].item_count, 5);
        assert_eq!(all[1].id, "s1");
        assert_eq!(all[1].item_count, 0);

        // Half-open window covering only the 14th
        let day15_start = Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap();
        let only14 = sales
            .list_between(Some(day14), Some(day15_start))
            .await
            .unwrap();
        assert_eq!(only14.len(), 1);
        assert_eq!(only14[0].id, "s1");

        // Lower bound after everything
        let future = Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap();
        assert!(sales.list_between(Some(future), None).await.unwrap().is_empty());
    }
}
