//! # Report Service
//!
//! Dashboard aggregates, low-stock alerts, the sales ledger and its CSV
//! export. Date filters arrive as raw `YYYY-MM-DD` strings and both
//! bounds are validated before either is applied.

use tracing::debug;

use gestio_core::report::{date_range_bounds, dashboard_metrics, render_sales_csv};
use gestio_core::validation::parse_report_date;
use gestio_core::{
    CoreError, DashboardMetrics, Product, Sale, SaleSummary, ValidationErrors,
};
use gestio_db::{ProductRepository, SaleRepository};

use crate::error::ApiResult;

/// Reporting and export operations.
#[derive(Debug, Clone)]
pub struct ReportService {
    products: ProductRepository,
    sales: SaleRepository,
    threshold: i64,
}

impl ReportService {
    pub fn new(products: ProductRepository, sales: SaleRepository, threshold: i64) -> Self {
        ReportService {
            products,
            sales,
            threshold,
        }
    }

    /// Low-stock threshold the reports run with.
    pub fn threshold(&self) -> i64 {
        self.threshold
    }

    /// Catalog-wide dashboard aggregates.
    pub async fn dashboard(&self) -> ApiResult<DashboardMetrics> {
        let products = self.products.list().await?;
        let metrics = dashboard_metrics(&products, self.threshold);

        debug!(
            products = metrics.total_products,
            low_stock = metrics.low_stock_count,
            "Dashboard computed"
        );
        Ok(metrics)
    }

    /// Every product under the threshold, lowest stock first.
    pub async fn low_stock(&self) -> ApiResult<Vec<Product>> {
        Ok(self.products.below_stock(self.threshold).await?)
    }

    /// Sale summaries within an optional date window, newest first.
    ///
    /// Both bounds are parsed before either is applied, so a request with
    /// two bad dates reports both fields at once.
    pub async fn sales_between(
        &self,
        from: Option<&str>,
        to: Option<&str>,
    ) -> ApiResult<Vec<SaleSummary>> {
        let mut errors = ValidationErrors::new();
        let from = errors.capture(parse_report_date(from, "from")).flatten();
        let to = errors.capture(parse_report_date(to, "to")).flatten();
        errors.into_result(())?;

        let (lower, upper) = date_range_bounds(from, to);
        Ok(self.sales.list_between(lower, upper).await?)
    }

    /// One sale with its lines.
    pub async fn sale_detail(&self, id: &str) -> ApiResult<Sale> {
        self.sales
            .get(id)
            .await?
            .ok_or_else(|| CoreError::SaleNotFound(id.to_string()).into())
    }

    /// The filtered ledger rendered as CSV.
    pub async fn export_csv(&self, from: Option<&str>, to: Option<&str>) -> ApiResult<String> {
        let sales = self.sales_between(from, to).await?;
        Ok(render_sales_csv(&sales))
    }
}
