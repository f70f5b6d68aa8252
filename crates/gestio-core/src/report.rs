//! # Report Module
//!
//! Pure aggregation behind the dashboard, the low-stock alerts, and the
//! sales ledger export. Everything here takes already-fetched rows and
//! returns values; the repositories own the queries.
//!
//! ## Dashboard Flow
//! ```text
//! products ──► dashboard_metrics(threshold) ──► { total_products,
//!                                                 low_stock_count,
//!                                                 inventory_value,
//!                                                 top_low_stock[≤5] }
//! ```

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::types::{DashboardMetrics, LowStockProduct, Product, SaleSummary};
use crate::TOP_LOW_STOCK_LIMIT;

// =============================================================================
// Dashboard
// =============================================================================

/// Rounds a monetary value to 2 decimal places.
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Aggregates the whole catalog in one pass.
///
/// `inventory_value` is `Σ(price × stock)` rounded to 2 decimals;
/// `top_low_stock` holds the 5 lowest-stock products under the threshold,
/// ascending by stock. The sort is stable, so equal stocks keep the order
/// they were encountered in.
///
/// ## Example
/// ```rust
/// use gestio_core::report::round2;
///
/// assert_eq!(round2(19.996), 20.0);
/// assert_eq!(round2(2.0 * 1.0 + 10.0 * 2.0), 22.0);
/// ```
pub fn dashboard_metrics(products: &[Product], threshold: i64) -> DashboardMetrics {
    let mut inventory_value = 0.0;
    let mut low_stock: Vec<LowStockProduct> = Vec::new();

    for product in products {
        inventory_value += product.inventory_value();
        if product.is_low_stock(threshold) {
            low_stock.push(product.into());
        }
    }

    let low_stock_count = low_stock.len();
    low_stock.sort_by_key(|p| p.stock);
    low_stock.truncate(TOP_LOW_STOCK_LIMIT);

    DashboardMetrics {
        total_products: products.len(),
        low_stock_count,
        inventory_value: round2(inventory_value),
        top_low_stock: low_stock,
    }
}

// =============================================================================
// Sales Ledger
// =============================================================================

/// Header row of the sales CSV export.
pub const SALES_CSV_HEADER: &str = "id,date,items,total";

/// Timestamp format shared by the ledger listing and the CSV export.
pub fn format_sale_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M").to_string()
}

/// Renders sale summaries as CSV, one row per sale, in the order given.
///
/// None of the cells can contain a comma or a quote (UUIDs, a fixed
/// timestamp format, integers, and a 2-decimal total), so no quoting
/// pass is needed.
pub fn render_sales_csv(sales: &[SaleSummary]) -> String {
    let mut csv = String::from(SALES_CSV_HEADER);
    csv.push('\n');

    for sale in sales {
        csv.push_str(&format!(
            "{},{},{},{:.2}\n",
            sale.id,
            format_sale_timestamp(sale.created_at),
            sale.item_count,
            sale.total,
        ));
    }

    csv
}

// =============================================================================
// Date Bounds
// =============================================================================

/// Converts optional report dates into UTC timestamp bounds.
///
/// `from` becomes the start of that day (inclusive); `to` becomes the
/// start of the FOLLOWING day (exclusive), so a single-day report with
/// `from == to` covers the full day.
pub fn date_range_bounds(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    let lower = from.map(day_start_utc);
    let upper = to.and_then(|date| date.succ_opt()).map(day_start_utc);
    (lower, upper)
}

fn day_start_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn product(id: &str, price: f64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Producto {id}"),
            name_lower: format!("producto {id}"),
            price,
            stock,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(19.996), 20.0);
        assert_eq!(round2(3.14159), 3.14);
        assert_eq!(round2(0.1 + 0.2), 0.3);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_dashboard_metrics_counts_and_value() {
        let products = vec![
            product("a", 1.0, 2),
            product("b", 2.0, 10),
            product("c", 3.0, 0),
        ];

        let metrics = dashboard_metrics(&products, 5);

        assert_eq!(metrics.total_products, 3);
        assert_eq!(metrics.low_stock_count, 2);
        assert_eq!(metrics.inventory_value, 22.0);

        // Ascending by stock: the empty shelf first.
        let tops: Vec<(&str, i64)> = metrics
            .top_low_stock
            .iter()
            .map(|p| (p.id.as_str(), p.stock))
            .collect();
        assert_eq!(tops, vec![("c", 0), ("a", 2)]);
    }

    #[test]
    fn test_dashboard_top_list_is_capped_and_stable() {
        let products = vec![
            product("a", 1.0, 3),
            product("b", 1.0, 1),
            product("c", 1.0, 3),
            product("d", 1.0, 0),
            product("e", 1.0, 2),
            product("f", 1.0, 4),
            product("g", 1.0, 4),
        ];

        let metrics = dashboard_metrics(&products, 5);

        assert_eq!(metrics.low_stock_count, 7);
        assert_eq!(metrics.top_low_stock.len(), 5);

        // Stable sort: "a" (stock 3) was seen before "c" (stock 3).
        let ids: Vec<&str> = metrics.top_low_stock.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["d", "b", "e", "a", "c"]);
    }

    #[test]
    fn test_dashboard_metrics_empty_catalog() {
        let metrics = dashboard_metrics(&[], 5);
        assert_eq!(metrics.total_products, 0);
        assert_eq!(metrics.low_stock_count, 0);
        assert_eq!(metrics.inventory_value, 0.0);
        assert!(metrics.top_low_stock.is_empty());
    }

    #[test]
    fn test_render_sales_csv() {
        let sales = vec![
            SaleSummary {
                id: "s2".to_string(),
                item_count: 5,
                total: 22.0,
                created_at: Utc.with_ymd_and_hms(2026, 3, 15, 14, 5, 0).unwrap(),
            },
            SaleSummary {
                id: "s1".to_string(),
                item_count: 1,
                total: 8.5,
                created_at: Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 59).unwrap(),
            },
        ];

        let csv = render_sales_csv(&sales);

        assert_eq!(
            csv,
            "id,date,items,total\n\
             s2,2026-03-15 14:05,5,22.00\n\
             s1,2026-03-14 09:30,1,8.50\n"
        );
    }

    #[test]
    fn test_render_sales_csv_empty() {
        assert_eq!(render_sales_csv(&[]), "id,date,items,total\n");
    }

    #[test]
    fn test_date_range_bounds() {
        let from = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let to = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();

        let (lower, upper) = date_range_bounds(Some(from), Some(to));

        assert_eq!(lower.unwrap(), Utc.with_ymd_and_hms(2026, 3, 14, 0, 0, 0).unwrap());
        // Exclusive upper bound: start of the NEXT day.
        assert_eq!(upper.unwrap(), Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap());

        assert_eq!(date_range_bounds(None, None), (None, None));
    }
}
