//! Product use cases on top of `catalog-db`, with the variant-consistency rule
//! applied where storefront reads need it.

use catalog_core::{
    filter_variants_by_price_table, NewProduct, Product, ProductFilters, ProductUpdate,
};
use catalog_db::{DbError, FilterSummary, ProductScope};
use sqlx::PgPool;

/// Owns the connection pool; constructed once in `main` and shared through
/// [`crate::api::AppState`].
#[derive(Debug, Clone)]
pub struct ProductService {
    pool: PgPool,
}

impl ProductService {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn health(&self) -> Result<(), DbError> {
        catalog_db::health_check(&self.pool).await
    }

    /// Active products matching `filters`, dropping those left without a
    /// consistent variant.
    pub async fn list(&self, filters: &ProductFilters) -> Result<Vec<Product>, DbError> {
        let products = catalog_db::list_products(&self.pool, filters).await?;
        let fetched = products.len();
        let visible: Vec<Product> = products
            .into_iter()
            .filter_map(filter_variants_by_price_table)
            .collect();

        if visible.len() < fetched {
            tracing::debug!(
                fetched,
                visible = visible.len(),
                "products without consistent variants dropped"
            );
        }
        Ok(visible)
    }

    /// `None` when the product is missing, deleted, or has no consistent variant.
    pub async fn get(&self, id: i64) -> Result<Option<Product>, DbError> {
        let product = catalog_db::get_product(&self.pool, id, ProductScope::Active).await?;
        Ok(product.and_then(filter_variants_by_price_table))
    }

    pub async fn create(&self, product: &NewProduct) -> Result<Product, DbError> {
        let created = catalog_db::create_product(&self.pool, product).await?;
        tracing::info!(
            product_id = created.id,
            reference = %created.reference,
            "product created"
        );
        Ok(created)
    }

    /// Applies a partial update, then re-reads through the consistency rule.
    ///
    /// Returns [`DbError::NotFound`] when no active product has this id, and
    /// `Ok(None)` when the updated product has no consistent variant.
    pub async fn update(
        &self,
        id: i64,
        update: &ProductUpdate,
    ) -> Result<Option<Product>, DbError> {
        if update.has_nested_variants() {
            tracing::warn!(
                product_id = id,
                "nested variants in update payload are ignored"
            );
        }

        let updated = catalog_db::update_product(&self.pool, id, update).await?;
        tracing::info!(product_id = id, "product updated");
        Ok(filter_variants_by_price_table(updated))
    }

    /// `None` when the id is unknown or already deleted.
    pub async fn delete(&self, id: i64) -> Result<Option<Product>, DbError> {
        let deleted = catalog_db::soft_delete_product(&self.pool, id).await?;
        if deleted.is_some() {
            tracing::info!(product_id = id, "product soft-deleted");
        }
        Ok(deleted)
    }

    pub async fn list_deleted(&self) -> Result<Vec<Product>, DbError> {
        catalog_db::list_deleted_products(&self.pool).await
    }

    pub async fn get_deleted(&self, id: i64) -> Result<Option<Product>, DbError> {
        catalog_db::get_product(&self.pool, id, ProductScope::Deleted).await
    }

    pub async fn filter_summary(&self) -> Result<FilterSummary, DbError> {
        catalog_db::product_filter_summary(&self.pool).await
    }

    pub async fn count(&self, filters: &ProductFilters) -> Result<i64, DbError> {
        catalog_db::count_products(&self.pool, filters).await
    }
}
