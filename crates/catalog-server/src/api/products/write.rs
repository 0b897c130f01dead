use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use catalog_core::{NewProduct, Product, ProductUpdate};
use serde::Serialize;

use super::super::{ApiError, AppState};
use super::parse_product_id;

#[derive(Debug, Serialize)]
pub(in crate::api) struct DeleteProductResponse {
    status: &'static str,
    message: String,
    product: Product,
}

/// POST /api/products: insert a product and its whole variant tree.
pub(in crate::api) async fn create_product(
    State(state): State<AppState>,
    body: Result<Json<NewProduct>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let Json(product) = body?;
    product
        .validate()
        .map_err(|e| ApiError::new("validation_error", e.to_string()))?;

    let created = state
        .products
        .create(&product)
        .await
        .map_err(|e| state.db_error(&e))?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/products/{id}: overlay the supplied top-level fields.
pub(in crate::api) async fn update_product(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Result<Json<ProductUpdate>, JsonRejection>,
) -> Result<Json<Product>, ApiError> {
    let id = parse_product_id(&raw_id)?;
    let Json(update) = body?;
    update
        .validate()
        .map_err(|e| ApiError::new("validation_error", e.to_string()))?;

    state
        .products
        .update(id, &update)
        .await
        .map_err(|e| state.db_error(&e))?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("product {id} not found")))
}

/// DELETE /api/products/{id}: mark the product deleted, keeping its children.
pub(in crate::api) async fn delete_product(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<DeleteProductResponse>, ApiError> {
    let id = parse_product_id(&raw_id)?;

    let product = state
        .products
        .delete(id)
        .await
        .map_err(|e| state.db_error(&e))?
        .ok_or_else(|| ApiError::not_found(format!("product {id} not found")))?;

    Ok(Json(DeleteProductResponse {
        status: "success",
        message: format!("product {id} deleted"),
        product,
    }))
}
