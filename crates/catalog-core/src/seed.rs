//! Lookup data (brands, categories, price tables) loaded from YAML.
//!
//! The product API references these rows by id or name but never creates
//! them, so they are provisioned from `config/catalog.yaml`.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::ConfigError;

#[derive(Debug, Clone, Deserialize)]
pub struct BrandSeed {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategorySeed {
    pub name: String,
    #[serde(default)]
    pub subcategories: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriceTableSeed {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub brands: Vec<BrandSeed>,
    #[serde(default)]
    pub categories: Vec<CategorySeed>,
    #[serde(default)]
    pub price_tables: Vec<PriceTableSeed>,
}

/// Load and validate the catalog seed file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog_seed(path: &Path) -> Result<CatalogSeed, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SeedFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let seed = parse_catalog_seed(&content)?;
    Ok(seed)
}

/// Parse and validate seed YAML already in memory.
///
/// # Errors
///
/// Returns `ConfigError` on malformed YAML or invalid content.
pub fn parse_catalog_seed(content: &str) -> Result<CatalogSeed, ConfigError> {
    let seed: CatalogSeed = serde_yaml::from_str(content)?;
    validate_seed(&seed)?;
    Ok(seed)
}

fn validate_seed(seed: &CatalogSeed) -> Result<(), ConfigError> {
    unique_names("brand", seed.brands.iter().map(|b| b.name.as_str()))?;
    unique_names("category", seed.categories.iter().map(|c| c.name.as_str()))?;
    unique_names(
        "price table",
        seed.price_tables.iter().map(|p| p.name.as_str()),
    )?;

    for category in &seed.categories {
        unique_names(
            &format!("subcategory of '{}'", category.name),
            category.subcategories.iter().map(String::as_str),
        )?;
    }

    Ok(())
}

/// Names must be non-blank and unique. Matching is exact, like the API's
/// brand/category filters.
fn unique_names<'a>(kind: &str, names: impl Iterator<Item = &'a str>) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for name in names {
        if name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "{kind} name must be non-empty"
            )));
        }
        if !seen.insert(name) {
            return Err(ConfigError::Validation(format!(
                "duplicate {kind} name: '{name}'"
            )));
        }
    }
    Ok(())
}
