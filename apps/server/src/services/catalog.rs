//! # Catalog Service
//!
//! Product CRUD and lookup on top of the product repository. Form fields
//! arrive as raw strings and are validated here, so both the public API
//! and the panel share one rule set.

use tracing::{debug, info};

use gestio_core::validation::{parse_search_query, validate_product_form};
use gestio_core::{CoreError, Product};
use gestio_db::ProductRepository;

use crate::error::{ApiError, ApiResult};

/// Product catalog operations.
#[derive(Debug, Clone)]
pub struct CatalogService {
    products: ProductRepository,
}

impl CatalogService {
    pub fn new(products: ProductRepository) -> Self {
        CatalogService { products }
    }

    /// Every product in the catalog.
    pub async fn list(&self) -> ApiResult<Vec<Product>> {
        Ok(self.products.list().await?)
    }

    /// One product by id.
    pub async fn get(&self, id: &str) -> ApiResult<Product> {
        self.products
            .get(id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()).into())
    }

    /// Validates raw form fields and inserts the product.
    pub async fn create(
        &self,
        name: Option<&str>,
        price: Option<&str>,
        stock: Option<&str>,
    ) -> ApiResult<Product> {
        let new = validate_product_form(name, price, stock)?;
        let product = self.products.insert(&new).await?;

        info!(id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    /// Validates raw form fields and overwrites the product.
    pub async fn update(
        &self,
        id: &str,
        name: Option<&str>,
        price: Option<&str>,
        stock: Option<&str>,
    ) -> ApiResult<Product> {
        let changes = validate_product_form(name, price, stock)?;
        let product = self.products.update(id, &changes).await?;

        info!(id = %product.id, name = %product.name, "Product updated");
        Ok(product)
    }

    /// Deletes the product.
    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.products.delete(id).await?;

        info!(id = %id, "Product deleted");
        Ok(())
    }

    /// Looks a product up by exact id, exact name or name prefix.
    pub async fn find(&self, query: Option<&str>) -> ApiResult<Product> {
        let query = parse_search_query(query)?;

        debug!(query = %query, "Product search");

        self.products
            .find(&query)
            .await?
            .ok_or_else(|| ApiError::not_found("Product", &query))
    }
}
