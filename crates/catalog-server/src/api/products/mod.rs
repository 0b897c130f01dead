//! Product API handlers.
//!
//! - `GET    /api/products`              list with filters
//! - `POST   /api/products`              create with nested variants and SKUs
//! - `GET    /api/products/filters`      facet counts
//! - `GET    /api/products/count`        count matching filters
//! - `GET    /api/products/deleted`      soft-deleted products
//! - `GET    /api/products/deleted/{id}` one soft-deleted product
//! - `GET    /api/products/{id}`         one active product
//! - `PUT    /api/products/{id}`         partial update
//! - `DELETE /api/products/{id}`         soft delete

mod aggregates;
mod read;
mod write;

pub(super) use aggregates::{count_products, product_filters};
pub(super) use read::{get_deleted_product, get_product, list_deleted_products, list_products};
pub(super) use write::{create_product, delete_product, update_product};

use catalog_core::validation::parse_positive_id;

use super::ApiError;

/// Parse an `{id}` path segment, rejecting anything but a positive integer.
fn parse_product_id(raw: &str) -> Result<i64, ApiError> {
    parse_positive_id(raw)
        .ok_or_else(|| ApiError::bad_request(format!("id must be a positive integer, got '{raw}'")))
}
