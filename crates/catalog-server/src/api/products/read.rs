use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use catalog_core::{Product, ProductFilters, ProductQuery};

use super::super::{ApiError, AppState};
use super::parse_product_id;

/// GET /api/products
pub(in crate::api) async fn list_products(
    State(state): State<AppState>,
    query: Result<Query<ProductQuery>, QueryRejection>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let Query(query) = query?;
    let filters = ProductFilters::from_query(&query)?;

    let products = state
        .products
        .list(&filters)
        .await
        .map_err(|e| state.db_error(&e))?;

    Ok(Json(products))
}

/// GET /api/products/{id}
pub(in crate::api) async fn get_product(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let id = parse_product_id(&raw_id)?;

    state
        .products
        .get(id)
        .await
        .map_err(|e| state.db_error(&e))?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("product {id} not found")))
}

/// GET /api/products/deleted
pub(in crate::api) async fn list_deleted_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state
        .products
        .list_deleted()
        .await
        .map_err(|e| state.db_error(&e))?;

    Ok(Json(products))
}

/// GET /api/products/deleted/{id}
pub(in crate::api) async fn get_deleted_product(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let id = parse_product_id(&raw_id)?;

    state
        .products
        .get_deleted(id)
        .await
        .map_err(|e| state.db_error(&e))?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("deleted product {id} not found")))
}
