//! Counting queries over non-deleted products.

use std::collections::HashMap;

use catalog_core::ProductFilters;
use sqlx::PgPool;

use crate::products::{ACTIVE_FILTER_PREDICATE, PRODUCT_FROM};
use crate::DbError;

/// A brand with the number of active products that carry it.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct BrandCountRow {
    pub id: i64,
    pub name: String,
    pub quantity: i64,
}

/// A `{name, quantity}` bucket (genders, types, subcategories).
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct NamedCountRow {
    pub name: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySummary {
    pub name: String,
    pub quantity: i64,
    pub subcategories: Vec<NamedCountRow>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PromptDeliveryCounts {
    pub true_count: i64,
    pub false_count: i64,
}

/// Everything the storefront needs to render its filter sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSummary {
    pub brands: Vec<BrandCountRow>,
    pub categories: Vec<CategorySummary>,
    pub genders: Vec<NamedCountRow>,
    pub types: Vec<NamedCountRow>,
    pub prompt_delivery: PromptDeliveryCounts,
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryCountRow {
    id: i64,
    name: String,
    quantity: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct SubcategoryCountRow {
    category_id: i64,
    name: String,
    quantity: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct PromptDeliveryRow {
    prompt_delivery: bool,
    quantity: i64,
}

/// Counts non-deleted products matching `filters`.
///
/// Pagination is ignored, and the variant-consistency rule is not applied,
/// so the result can exceed the number of products a listing returns.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_products(pool: &PgPool, filters: &ProductFilters) -> Result<i64, DbError> {
    let sql = format!("SELECT COUNT(*) {PRODUCT_FROM} WHERE {ACTIVE_FILTER_PREDICATE}");

    let count: i64 = sqlx::query_scalar(&sql)
        .bind(filters.brand.as_deref())
        .bind(filters.category.as_deref())
        .bind(filters.gender.map(|g| g.as_str()))
        .bind(filters.product_type.map(|t| t.as_str()))
        .bind(filters.prompt_delivery)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Per-facet product counts over non-deleted products.
///
/// Brands and categories are listed by name, including those with no active
/// products. Genders and types only list values that occur.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any query fails.
pub async fn product_filter_summary(pool: &PgPool) -> Result<FilterSummary, DbError> {
    let brands = sqlx::query_as::<_, BrandCountRow>(
        "SELECT b.id, b.name, COUNT(p.id) AS quantity \
         FROM brands b \
         LEFT JOIN products p ON p.brand_id = b.id AND p.deleted_at IS NULL \
         GROUP BY b.id, b.name \
         ORDER BY b.name",
    )
    .fetch_all(pool)
    .await?;

    let category_rows = sqlx::query_as::<_, CategoryCountRow>(
        "SELECT c.id, c.name, COUNT(p.id) AS quantity \
         FROM categories c \
         LEFT JOIN products p ON p.category_id = c.id AND p.deleted_at IS NULL \
         GROUP BY c.id, c.name \
         ORDER BY c.name",
    )
    .fetch_all(pool)
    .await?;

    let subcategory_rows = sqlx::query_as::<_, SubcategoryCountRow>(
        "SELECT s.category_id, s.name, COUNT(p.id) AS quantity \
         FROM subcategories s \
         LEFT JOIN products p ON p.subcategory_id = s.id AND p.deleted_at IS NULL \
         GROUP BY s.id, s.category_id, s.name \
         ORDER BY s.name",
    )
    .fetch_all(pool)
    .await?;

    let genders = sqlx::query_as::<_, NamedCountRow>(
        "SELECT gender AS name, COUNT(*) AS quantity \
         FROM products \
         WHERE deleted_at IS NULL \
         GROUP BY gender \
         ORDER BY gender",
    )
    .fetch_all(pool)
    .await?;

    let types = sqlx::query_as::<_, NamedCountRow>(
        "SELECT type AS name, COUNT(*) AS quantity \
         FROM products \
         WHERE deleted_at IS NULL \
         GROUP BY type \
         ORDER BY type",
    )
    .fetch_all(pool)
    .await?;

    let prompt_rows = sqlx::query_as::<_, PromptDeliveryRow>(
        "SELECT prompt_delivery, COUNT(*) AS quantity \
         FROM products \
         WHERE deleted_at IS NULL \
         GROUP BY prompt_delivery",
    )
    .fetch_all(pool)
    .await?;

    Ok(FilterSummary {
        brands,
        categories: assemble_categories(category_rows, subcategory_rows),
        genders,
        types,
        prompt_delivery: fold_prompt_delivery(&prompt_rows),
    })
}

fn assemble_categories(
    categories: Vec<CategoryCountRow>,
    subcategories: Vec<SubcategoryCountRow>,
) -> Vec<CategorySummary> {
    let mut by_category: HashMap<i64, Vec<NamedCountRow>> = HashMap::new();
    for row in subcategories {
        by_category
            .entry(row.category_id)
            .or_default()
            .push(NamedCountRow {
                name: row.name,
                quantity: row.quantity,
            });
    }

    categories
        .into_iter()
        .map(|row| CategorySummary {
            subcategories: by_category.remove(&row.id).unwrap_or_default(),
            name: row.name,
            quantity: row.quantity,
        })
        .collect()
}

fn fold_prompt_delivery(rows: &[PromptDeliveryRow]) -> PromptDeliveryCounts {
    rows.iter()
        .fold(PromptDeliveryCounts::default(), |mut acc, row| {
            if row.prompt_delivery {
                acc.true_count += row.quantity;
            } else {
                acc.false_count += row.quantity;
            }
            acc
        })
}
