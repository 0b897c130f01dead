pub mod app_config;
pub mod config;
pub mod consistency;
pub mod filters;
pub mod products;
pub mod seed;
pub mod validation;

pub use app_config::{AppConfig, Environment};
pub use config::{
    load_app_config, load_app_config_from_env, log_level_from_env, seed_path_from_env,
    DEFAULT_LOG_LEVEL, DEFAULT_SEED_PATH,
};
pub use consistency::{filter_variants_by_price_table, is_consistent_variant};
pub use filters::{FilterError, Pagination, ProductFilters, ProductQuery};
pub use products::{
    BrandRef, CategoryRef, NewPriceTableSku, NewProduct, NewSku, NewVariant, PriceTableSku,
    Product, ProductGender, ProductType, ProductUpdate, Sku, SubcategoryRef, Variant,
};
pub use seed::{load_catalog_seed, parse_catalog_seed, CatalogSeed};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{0}")]
    InvalidProduct(String),
    #[error("unknown product gender: {0}")]
    UnknownGender(String),
    #[error("unknown product type: {0}")]
    UnknownProductType(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
    #[error("failed to read seed file {path}: {source}")]
    SeedFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse seed file: {0}")]
    SeedFileParse(#[from] serde_yaml::Error),
    #[error("seed validation failed: {0}")]
    Validation(String),
}
