//! Database operations for `products` and their nested `variants`, `skus`,
//! and `price_tables_skus` rows.

mod read;
mod types;
mod write;

pub use read::{get_product, list_deleted_products, list_products};
pub use types::ProductScope;
pub use write::{create_product, soft_delete_product, update_product};

pub(crate) use types::{ACTIVE_FILTER_PREDICATE, PRODUCT_FROM};
