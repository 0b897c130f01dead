use std::collections::HashMap;

use catalog_core::{PriceTableSku, Product, ProductFilters, Sku, Variant};
use sqlx::PgPool;

use super::types::{
    PriceTableSkuRow, ProductRow, ProductScope, SkuRow, VariantRow, ACTIVE_FILTER_PREDICATE,
    PRODUCT_COLUMNS, PRODUCT_FROM,
};
use crate::DbError;

/// Lists non-deleted products matching `filters`, with their full variant tree.
///
/// Ordered by product id. Pagination (when present) is applied to product
/// rows before any variant filtering done by callers, so a page may shrink
/// after the consistency rule runs.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a query fails.
pub async fn list_products(
    pool: &PgPool,
    filters: &ProductFilters,
) -> Result<Vec<Product>, DbError> {
    let sql = format!(
        "SELECT {PRODUCT_COLUMNS} {PRODUCT_FROM} \
         WHERE {ACTIVE_FILTER_PREDICATE} \
         ORDER BY p.id \
         LIMIT COALESCE($6, 9223372036854775807) \
         OFFSET COALESCE($7, 0)"
    );

    let rows = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(filters.brand.as_deref())
        .bind(filters.category.as_deref())
        .bind(filters.gender.map(|g| g.as_str()))
        .bind(filters.product_type.map(|t| t.as_str()))
        .bind(filters.prompt_delivery)
        .bind(filters.pagination.map(|p| p.limit))
        .bind(filters.pagination.map(|p| p.offset()))
        .fetch_all(pool)
        .await?;

    hydrate(pool, rows).await
}

/// Fetches one product by id on the given side of the soft-delete marker.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a query fails.
pub async fn get_product(
    pool: &PgPool,
    id: i64,
    scope: ProductScope,
) -> Result<Option<Product>, DbError> {
    let sql = format!(
        "SELECT {PRODUCT_COLUMNS} {PRODUCT_FROM} WHERE p.id = $1 AND {}",
        scope.predicate()
    );

    let row = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };
    Ok(hydrate(pool, vec![row]).await?.pop())
}

/// Lists soft-deleted products with their full variant tree, ordered by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a query fails.
pub async fn list_deleted_products(pool: &PgPool) -> Result<Vec<Product>, DbError> {
    let sql = format!(
        "SELECT {PRODUCT_COLUMNS} {PRODUCT_FROM} WHERE {} ORDER BY p.id",
        ProductScope::Deleted.predicate()
    );

    let rows = sqlx::query_as::<_, ProductRow>(&sql)
        .fetch_all(pool)
        .await?;

    hydrate(pool, rows).await
}

/// Loads variants, SKUs, and price-table associations for `rows` with one
/// query per level and stitches them into domain products.
///
/// Children are attached in ascending id order, which is the storage order
/// the price-table rule relies on.
async fn hydrate(pool: &PgPool, rows: Vec<ProductRow>) -> Result<Vec<Product>, DbError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let product_ids: Vec<i64> = rows.iter().map(|r| r.id).collect();

    let variant_rows = sqlx::query_as::<_, VariantRow>(
        "SELECT id, product_id, name, hex_code \
         FROM variants \
         WHERE product_id = ANY($1) \
         ORDER BY id",
    )
    .bind(&product_ids)
    .fetch_all(pool)
    .await?;

    let variant_ids: Vec<i64> = variant_rows.iter().map(|v| v.id).collect();

    let sku_rows = sqlx::query_as::<_, SkuRow>(
        "SELECT id, variant_id, size, stock, price, code, min_quantity, multiple_quantity, \
                erp_id, cest, height, length, ncm, weight, width \
         FROM skus \
         WHERE variant_id = ANY($1) \
         ORDER BY id",
    )
    .bind(&variant_ids)
    .fetch_all(pool)
    .await?;

    let sku_ids: Vec<i64> = sku_rows.iter().map(|s| s.id).collect();

    let association_rows = sqlx::query_as::<_, PriceTableSkuRow>(
        "SELECT id, sku_id, price_table_id, price \
         FROM price_tables_skus \
         WHERE sku_id = ANY($1) \
         ORDER BY id",
    )
    .bind(&sku_ids)
    .fetch_all(pool)
    .await?;

    let mut associations_by_sku: HashMap<i64, Vec<PriceTableSku>> = HashMap::new();
    for row in association_rows {
        associations_by_sku
            .entry(row.sku_id)
            .or_default()
            .push(row.into());
    }

    let mut skus_by_variant: HashMap<i64, Vec<Sku>> = HashMap::new();
    for row in sku_rows {
        let mut sku = Sku::from(row);
        sku.price_tables_skus = associations_by_sku.remove(&sku.id).unwrap_or_default();
        skus_by_variant.entry(sku.variant_id).or_default().push(sku);
    }

    let mut variants_by_product: HashMap<i64, Vec<Variant>> = HashMap::new();
    for row in variant_rows {
        let mut variant = Variant::from(row);
        variant.skus = skus_by_variant.remove(&variant.id).unwrap_or_default();
        variants_by_product
            .entry(variant.product_id)
            .or_default()
            .push(variant);
    }

    rows.into_iter()
        .map(|row| {
            let mut product = row.into_product()?;
            product.variants = variants_by_product
                .remove(&product.id)
                .unwrap_or_default();
            Ok(product)
        })
        .collect()
}
