use catalog_core::CatalogSeed;
use sqlx::PgPool;

use crate::DbError;

/// Rows touched by [`seed_catalog`], per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub brands: usize,
    pub categories: usize,
    pub subcategories: usize,
    pub price_tables: usize,
}

/// Upsert brands, categories (with subcategories), and price tables by name.
///
/// All upserts run inside a single transaction; if any operation fails
/// the entire batch is rolled back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_catalog(pool: &PgPool, seed: &CatalogSeed) -> Result<SeedReport, DbError> {
    let mut tx = pool.begin().await?;
    let mut report = SeedReport::default();

    for brand in &seed.brands {
        sqlx::query(
            "INSERT INTO brands (name) VALUES ($1) \
             ON CONFLICT (name) DO UPDATE SET updated_at = NOW()",
        )
        .bind(&brand.name)
        .execute(&mut *tx)
        .await?;
        report.brands += 1;
    }

    for category in &seed.categories {
        let category_id: i64 = sqlx::query_scalar(
            "INSERT INTO categories (name) VALUES ($1) \
             ON CONFLICT (name) DO UPDATE SET updated_at = NOW() \
             RETURNING id",
        )
        .bind(&category.name)
        .fetch_one(&mut *tx)
        .await?;
        report.categories += 1;

        for subcategory in &category.subcategories {
            sqlx::query(
                "INSERT INTO subcategories (category_id, name) VALUES ($1, $2) \
                 ON CONFLICT (category_id, name) DO UPDATE SET updated_at = NOW()",
            )
            .bind(category_id)
            .bind(subcategory)
            .execute(&mut *tx)
            .await?;
            report.subcategories += 1;
        }
    }

    for price_table in &seed.price_tables {
        sqlx::query(
            "INSERT INTO price_tables (name, description) VALUES ($1, $2) \
             ON CONFLICT (name) DO UPDATE SET \
                 description = EXCLUDED.description, \
                 updated_at = NOW()",
        )
        .bind(&price_table.name)
        .bind(&price_table.description)
        .execute(&mut *tx)
        .await?;
        report.price_tables += 1;
    }

    tx.commit().await?;
    tracing::info!(?report, "catalog lookups seeded");
    Ok(report)
}
