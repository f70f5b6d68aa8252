//! # Sale Service
//!
//! Sale registration: line validation, a friendly pre-check against the
//! catalog, then the transactional decrement-and-record in the repository.

use tracing::{debug, info};

use gestio_core::validation::validate_sale_lines;
use gestio_core::{CoreError, Sale, SaleLine};
use gestio_db::{ProductRepository, SaleRepository};

use crate::error::ApiResult;

/// Sale registration.
#[derive(Debug, Clone)]
pub struct SaleService {
    products: ProductRepository,
    sales: SaleRepository,
}

impl SaleService {
    pub fn new(products: ProductRepository, sales: SaleRepository) -> Self {
        SaleService { products, sales }
    }

    /// Registers a sale from validated-on-entry cart lines.
    ///
    /// Each line is pre-checked against the catalog so the common failures
    /// (unknown product, not enough stock) report before any write. The
    /// repository re-verifies under its transaction, so a race between the
    /// pre-check and the commit still cannot oversell.
    pub async fn register(&self, lines: &[SaleLine], total: f64) -> ApiResult<Sale> {
        validate_sale_lines(lines)?;

        debug!(lines = lines.len(), total = %total, "Registering sale");

        for line in lines {
            let product = self
                .products
                .get(&line.product_id)
                .await?
                .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;

            if !product.has_stock_for(line.quantity) {
                return Err(CoreError::InsufficientStock {
                    name: product.name,
                    available: product.stock,
                    requested: line.quantity,
                }
                .into());
            }
        }

        let sale = self.sales.register(lines, total).await?;

        info!(id = %sale.id, lines = sale.lines.len(), total = %sale.total, "Sale registered");
        Ok(sale)
    }
}
