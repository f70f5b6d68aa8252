//! # Schema Migrations
//!
//! The panel's schema ships inside the binary: `sqlx::migrate!` embeds
//! every file under `migrations/sqlite/` at compile time, and
//! [`run_migrations`] applies whatever the target database is missing.
//! Applied versions are tracked in `_sqlx_migrations`, so the call is
//! idempotent and cheap once the schema is current.
//!
//! Current files:
//! ```text
//! migrations/sqlite/
//! └── 001_initial_schema.sql   products, sales, sale_items + indexes
//! ```
//!
//! Migrations are append-only: a shipped file must never change, or the
//! checksum comparison fails on existing databases. Schema changes get a
//! new `NNN_description.sql` file.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// Migrations embedded from `migrations/sqlite/` (workspace root).
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies pending migrations in filename order, each in its own
/// transaction.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    debug!(embedded = MIGRATOR.migrations.len(), "Running migrator");

    MIGRATOR.run(pool).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    #[tokio::test]
    async fn test_initial_schema_creates_core_tables() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        run_migrations(&pool).await.unwrap();

        for table in ["products", "sales", "sale_items"] {
            let found: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            )
            .bind(table)
            .fetch_one(&pool)
            .await
            .unwrap();
            assert_eq!(found, 1, "missing table: {table}");
        }
    }
}
