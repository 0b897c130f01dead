use catalog_core::{NewProduct, Product, ProductUpdate};
use sqlx::{PgPool, Postgres, Transaction};

use super::read::get_product;
use super::types::ProductScope;
use crate::DbError;

/// Inserts a product with its variants, SKUs, and price-table associations in
/// one transaction, then reads the stored tree back.
///
/// Any failing insert rolls back the whole structure.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if an insert fails (including unique and foreign
/// key violations), or [`DbError::NotFound`] if the committed product cannot be
/// read back.
pub async fn create_product(pool: &PgPool, product: &NewProduct) -> Result<Product, DbError> {
    let mut tx = pool.begin().await?;

    let product_id = insert_product_tree(&mut tx, product).await?;

    tx.commit().await?;
    tracing::debug!(
        product_id,
        variants = product.variants.len(),
        skus = product.sku_count(),
        "product created"
    );

    get_product(pool, product_id, ProductScope::Active)
        .await?
        .ok_or(DbError::NotFound)
}

async fn insert_product_tree(
    tx: &mut Transaction<'_, Postgres>,
    product: &NewProduct,
) -> Result<i64, DbError> {
    let product_id: i64 = sqlx::query_scalar(
        "INSERT INTO products \
             (name, reference, type, gender, prompt_delivery, description, company_id, erp_id, \
              brand_id, deadline_id, category_id, subcategory_id, category_order, \
              composition_data, technical_information, open_grid, ipi, is_discontinued, \
              is_launch, is_visible, colection, st) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, \
                 $9, $10, $11, $12, $13, \
                 $14, $15, COALESCE($16, FALSE), $17, COALESCE($18, FALSE), \
                 COALESCE($19, FALSE), COALESCE($20, TRUE), $21, $22) \
         RETURNING id",
    )
    .bind(&product.name)
    .bind(&product.reference)
    .bind(product.product_type.as_str())
    .bind(product.gender.as_str())
    .bind(product.prompt_delivery)
    .bind(&product.description)
    .bind(product.company_id)
    .bind(&product.erp_id)
    .bind(product.brand_id)
    .bind(product.deadline_id)
    .bind(product.category_id)
    .bind(product.subcategory_id)
    .bind(product.category_order)
    .bind(&product.composition_data)
    .bind(&product.technical_information)
    .bind(product.open_grid)
    .bind(product.ipi)
    .bind(product.is_discontinued)
    .bind(product.is_launch)
    .bind(product.is_visible)
    .bind(&product.colection)
    .bind(product.st)
    .fetch_one(&mut **tx)
    .await?;

    for variant in &product.variants {
        let variant_id: i64 = sqlx::query_scalar(
            "INSERT INTO variants (product_id, name, hex_code) \
             VALUES ($1, $2, $3) \
             RETURNING id",
        )
        .bind(product_id)
        .bind(&variant.name)
        .bind(&variant.hex_code)
        .fetch_one(&mut **tx)
        .await?;

        for sku in &variant.skus {
            let sku_id: i64 = sqlx::query_scalar(
                "INSERT INTO skus \
                     (variant_id, size, stock, price, code, min_quantity, multiple_quantity, \
                      erp_id, cest, height, length, ncm, weight, width) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
                 RETURNING id",
            )
            .bind(variant_id)
            .bind(&sku.size)
            .bind(sku.stock)
            .bind(sku.price)
            .bind(&sku.code)
            .bind(sku.min_quantity)
            .bind(sku.multiple_quantity)
            .bind(&sku.erp_id)
            .bind(&sku.cest)
            .bind(sku.height)
            .bind(sku.length)
            .bind(&sku.ncm)
            .bind(sku.weight)
            .bind(sku.width)
            .fetch_one(&mut **tx)
            .await?;

            for entry in &sku.price_tables_skus {
                sqlx::query(
                    "INSERT INTO price_tables_skus (sku_id, price_table_id, price) \
                     VALUES ($1, $2, $3)",
                )
                .bind(sku_id)
                .bind(entry.price_table_id)
                .bind(entry.price)
                .execute(&mut **tx)
                .await?;
            }
        }
    }

    Ok(product_id)
}

/// Overlays the supplied top-level fields onto a non-deleted product and bumps
/// `updated_at`. Variants and SKUs are not touched.
///
/// Required columns use `COALESCE`; nullable columns use a "supplied" flag so
/// an explicit `null` clears the value.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no active product has this id, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_product(
    pool: &PgPool,
    id: i64,
    update: &ProductUpdate,
) -> Result<Product, DbError> {
    let updated: Option<i64> = sqlx::query_scalar(
        "UPDATE products \
         SET name                  = COALESCE($2, name), \
             reference             = COALESCE($3, reference), \
             type                  = COALESCE($4, type), \
             gender                = COALESCE($5, gender), \
             prompt_delivery       = COALESCE($6, prompt_delivery), \
             company_id            = COALESCE($7, company_id), \
             brand_id              = COALESCE($8, brand_id), \
             category_id           = COALESCE($9, category_id), \
             open_grid             = COALESCE($10, open_grid), \
             is_discontinued       = COALESCE($11, is_discontinued), \
             is_launch             = COALESCE($12, is_launch), \
             is_visible            = COALESCE($13, is_visible), \
             description           = CASE WHEN $14::BOOL THEN $15 ELSE description END, \
             erp_id                = CASE WHEN $16::BOOL THEN $17 ELSE erp_id END, \
             deadline_id           = CASE WHEN $18::BOOL THEN $19 ELSE deadline_id END, \
             subcategory_id        = CASE WHEN $20::BOOL THEN $21 ELSE subcategory_id END, \
             category_order        = CASE WHEN $22::BOOL THEN $23 ELSE category_order END, \
             composition_data      = CASE WHEN $24::BOOL THEN $25 ELSE composition_data END, \
             technical_information = CASE WHEN $26::BOOL THEN $27 ELSE technical_information END, \
             ipi                   = CASE WHEN $28::BOOL THEN $29 ELSE ipi END, \
             colection             = CASE WHEN $30::BOOL THEN $31 ELSE colection END, \
             st                    = CASE WHEN $32::BOOL THEN $33 ELSE st END, \
             updated_at            = NOW() \
         WHERE id = $1 AND deleted_at IS NULL \
         RETURNING id",
    )
    .bind(id)
    .bind(update.name.as_deref())
    .bind(update.reference.as_deref())
    .bind(update.product_type.map(|t| t.as_str()))
    .bind(update.gender.map(|g| g.as_str()))
    .bind(update.prompt_delivery)
    .bind(update.company_id)
    .bind(update.brand_id)
    .bind(update.category_id)
    .bind(update.open_grid)
    .bind(update.is_discontinued)
    .bind(update.is_launch)
    .bind(update.is_visible)
    .bind(update.description.is_some())
    .bind(update.description.clone().flatten())
    .bind(update.erp_id.is_some())
    .bind(update.erp_id.clone().flatten())
    .bind(update.deadline_id.is_some())
    .bind(update.deadline_id.flatten())
    .bind(update.subcategory_id.is_some())
    .bind(update.subcategory_id.flatten())
    .bind(update.category_order.is_some())
    .bind(update.category_order.flatten())
    .bind(update.composition_data.is_some())
    .bind(update.composition_data.clone().flatten())
    .bind(update.technical_information.is_some())
    .bind(update.technical_information.clone().flatten())
    .bind(update.ipi.is_some())
    .bind(update.ipi.flatten())
    .bind(update.colection.is_some())
    .bind(update.colection.clone().flatten())
    .bind(update.st.is_some())
    .bind(update.st.flatten())
    .fetch_optional(pool)
    .await?;

    let id = updated.ok_or(DbError::NotFound)?;
    get_product(pool, id, ProductScope::Active)
        .await?
        .ok_or(DbError::NotFound)
}

/// Sets `deleted_at` on an active product. Children are left as they are.
///
/// Returns the deleted product, or `None` if the id is unknown or the product
/// was already deleted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a query fails.
pub async fn soft_delete_product(pool: &PgPool, id: i64) -> Result<Option<Product>, DbError> {
    let deleted: Option<i64> = sqlx::query_scalar(
        "UPDATE products \
         SET deleted_at = NOW() \
         WHERE id = $1 AND deleted_at IS NULL \
         RETURNING id",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match deleted {
        Some(id) => get_product(pool, id, ProductScope::Deleted).await,
        None => Ok(None),
    }
}
