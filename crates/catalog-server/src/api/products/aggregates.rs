use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use catalog_core::{ProductFilters, ProductQuery};
use catalog_db::{BrandCountRow, CategorySummary, FilterSummary, NamedCountRow};
use serde::Serialize;

use super::super::{ApiError, AppState};

#[derive(Debug, Serialize)]
pub(in crate::api) struct FilterSummaryResponse {
    brands: Vec<BrandCountItem>,
    categories: Vec<CategoryCountItem>,
    genders: Vec<NamedCountItem>,
    types: Vec<NamedCountItem>,
    #[serde(rename = "promptDelivery")]
    prompt_delivery: PromptDeliveryItem,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct BrandCountItem {
    id: i64,
    name: String,
    quantity: i64,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct CategoryCountItem {
    name: String,
    quantity: i64,
    subcategories: Vec<NamedCountItem>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct NamedCountItem {
    name: String,
    quantity: i64,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct PromptDeliveryItem {
    #[serde(rename = "true")]
    true_count: i64,
    #[serde(rename = "false")]
    false_count: i64,
}

impl From<NamedCountRow> for NamedCountItem {
    fn from(row: NamedCountRow) -> Self {
        Self {
            name: row.name,
            quantity: row.quantity,
        }
    }
}

impl From<BrandCountRow> for BrandCountItem {
    fn from(row: BrandCountRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            quantity: row.quantity,
        }
    }
}

impl From<CategorySummary> for CategoryCountItem {
    fn from(summary: CategorySummary) -> Self {
        Self {
            name: summary.name,
            quantity: summary.quantity,
            subcategories: summary.subcategories.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<FilterSummary> for FilterSummaryResponse {
    fn from(summary: FilterSummary) -> Self {
        Self {
            brands: summary.brands.into_iter().map(Into::into).collect(),
            categories: summary.categories.into_iter().map(Into::into).collect(),
            genders: summary.genders.into_iter().map(Into::into).collect(),
            types: summary.types.into_iter().map(Into::into).collect(),
            prompt_delivery: PromptDeliveryItem {
                true_count: summary.prompt_delivery.true_count,
                false_count: summary.prompt_delivery.false_count,
            },
        }
    }
}

/// GET /api/products/filters
pub(in crate::api) async fn product_filters(
    State(state): State<AppState>,
) -> Result<Json<FilterSummaryResponse>, ApiError> {
    let summary = state
        .products
        .filter_summary()
        .await
        .map_err(|e| state.db_error(&e))?;

    Ok(Json(summary.into()))
}

/// GET /api/products/count
///
/// `page` and `limit` are validated like the listing but never narrow the count.
pub(in crate::api) async fn count_products(
    State(state): State<AppState>,
    query: Result<Query<ProductQuery>, QueryRejection>,
) -> Result<Json<i64>, ApiError> {
    let Query(query) = query?;
    let mut filters = ProductFilters::from_query(&query)?;
    filters.pagination = None;

    let count = state
        .products
        .count(&filters)
        .await
        .map_err(|e| state.db_error(&e))?;

    Ok(Json(count))
}

#[cfg(test)]
mod tests {
    use catalog_db::PromptDeliveryCounts;

    use super::*;

    #[test]
    fn prompt_delivery_serializes_with_boolean_keys() {
        let response = FilterSummaryResponse::from(FilterSummary {
            brands: vec![BrandCountRow {
                id: 1,
                name: "Acme".to_string(),
                quantity: 2,
            }],
            categories: vec![CategorySummary {
                name: "Shirts".to_string(),
                quantity: 2,
                subcategories: vec![NamedCountRow {
                    name: "Polo".to_string(),
                    quantity: 1,
                }],
            }],
            genders: Vec::new(),
            types: Vec::new(),
            prompt_delivery: PromptDeliveryCounts {
                true_count: 2,
                false_count: 0,
            },
        });

        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json["promptDelivery"]["true"], 2);
        assert_eq!(json["promptDelivery"]["false"], 0);
        assert_eq!(json["categories"][0]["subcategories"][0]["name"], "Polo");
        assert_eq!(json["brands"][0]["id"], 1);
    }
}
