//! Catalog domain types shared by the database and HTTP layers.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::validation::is_non_empty_string;
use crate::CoreError;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Target audience of a product. Stored upper-case, parsed case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum ProductGender {
    Male,
    Female,
    Unisex,
    Kids,
}

/// Product family. Stored upper-case, parsed case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum ProductType {
    Clothing,
    Footwear,
    Accessory,
}

impl ProductGender {
    pub const ALL: [ProductGender; 4] = [Self::Male, Self::Female, Self::Unisex, Self::Kids];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "MALE",
            Self::Female => "FEMALE",
            Self::Unisex => "UNISEX",
            Self::Kids => "KIDS",
        }
    }
}

impl ProductType {
    pub const ALL: [ProductType; 3] = [Self::Clothing, Self::Footwear, Self::Accessory];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Clothing => "CLOTHING",
            Self::Footwear => "FOOTWEAR",
            Self::Accessory => "ACCESSORY",
        }
    }
}

impl FromStr for ProductGender {
    type Err = CoreError;

    /// Case-insensitive: the input is upper-cased before matching.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|g| g.as_str() == upper)
            .ok_or_else(|| CoreError::UnknownGender(s.to_string()))
    }
}

impl FromStr for ProductType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == upper)
            .ok_or_else(|| CoreError::UnknownProductType(s.to_string()))
    }
}

impl TryFrom<String> for ProductGender {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for ProductType {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for ProductGender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Read model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrandRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubcategoryRef {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
}

/// A product with its brand/category context and full variant tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub reference: String,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub gender: ProductGender,
    pub prompt_delivery: bool,
    pub description: Option<String>,
    pub company_id: i64,
    pub erp_id: Option<String>,
    pub brand_id: i64,
    pub deadline_id: Option<i64>,
    pub category_id: i64,
    pub subcategory_id: Option<i64>,
    pub category_order: Option<i32>,
    pub composition_data: Option<String>,
    pub technical_information: Option<String>,
    pub open_grid: bool,
    pub ipi: Option<Decimal>,
    pub is_discontinued: bool,
    pub is_launch: bool,
    pub is_visible: bool,
    pub colection: Option<String>,
    pub st: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub brand: BrandRef,
    pub category: CategoryRef,
    pub subcategory: Option<SubcategoryRef>,
    pub variants: Vec<Variant>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variant {
    pub id: i64,
    pub product_id: i64,
    pub name: String,
    pub hex_code: Option<String>,
    pub skus: Vec<Sku>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sku {
    pub id: i64,
    pub variant_id: i64,
    pub size: String,
    pub stock: i32,
    pub price: Decimal,
    pub code: String,
    pub min_quantity: Option<i32>,
    pub multiple_quantity: i32,
    pub erp_id: Option<String>,
    pub cest: Option<String>,
    pub height: Option<Decimal>,
    pub length: Option<Decimal>,
    pub ncm: Option<String>,
    pub weight: Option<Decimal>,
    pub width: Option<Decimal>,
    /// Storage order (ascending id); the first entry decides the SKU's price table.
    pub price_tables_skus: Vec<PriceTableSku>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceTableSku {
    pub id: i64,
    pub sku_id: i64,
    pub price_table_id: i64,
    pub price: Decimal,
}

impl Sku {
    /// Price table this SKU belongs to: the first association wins.
    #[must_use]
    pub fn price_table_id(&self) -> Option<i64> {
        self.price_tables_skus.first().map(|pts| pts.price_table_id)
    }
}

// ---------------------------------------------------------------------------
// Write model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub reference: String,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub gender: ProductGender,
    pub prompt_delivery: bool,
    pub description: Option<String>,
    pub company_id: i64,
    pub erp_id: Option<String>,
    pub brand_id: i64,
    pub deadline_id: Option<i64>,
    pub category_id: i64,
    pub subcategory_id: Option<i64>,
    pub category_order: Option<i32>,
    pub composition_data: Option<String>,
    pub technical_information: Option<String>,
    pub open_grid: Option<bool>,
    pub ipi: Option<Decimal>,
    pub is_discontinued: Option<bool>,
    pub is_launch: Option<bool>,
    pub is_visible: Option<bool>,
    pub colection: Option<String>,
    pub st: Option<Decimal>,
    #[serde(default)]
    pub variants: Vec<NewVariant>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewVariant {
    pub name: String,
    pub hex_code: Option<String>,
    #[serde(default)]
    pub skus: Vec<NewSku>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSku {
    pub size: String,
    pub stock: i32,
    pub price: Decimal,
    pub code: String,
    pub min_quantity: Option<i32>,
    pub multiple_quantity: i32,
    #[serde(alias = "erpId")]
    pub erp_id: Option<String>,
    pub cest: Option<String>,
    pub height: Option<Decimal>,
    pub length: Option<Decimal>,
    pub ncm: Option<String>,
    pub weight: Option<Decimal>,
    pub width: Option<Decimal>,
    #[serde(default)]
    pub price_tables_skus: Vec<NewPriceTableSku>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPriceTableSku {
    pub price: Decimal,
    pub price_table_id: i64,
}

impl NewProduct {
    /// Structural checks that do not need the database.
    ///
    /// Foreign keys (brand, category, price tables, ...) are left to the
    /// storage constraints.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidProduct`] describing the first violation.
    pub fn validate(&self) -> Result<(), CoreError> {
        require_text("name", &self.name)?;
        require_text("reference", &self.reference)?;

        for (vi, variant) in self.variants.iter().enumerate() {
            require_text(&format!("variants[{vi}].name"), &variant.name)?;
            for (si, sku) in variant.skus.iter().enumerate() {
                let at = format!("variants[{vi}].skus[{si}]");
                require_text(&format!("{at}.size"), &sku.size)?;
                require_text(&format!("{at}.code"), &sku.code)?;
                if sku.stock < 0 {
                    return Err(invalid(format!("{at}.stock must not be negative")));
                }
                if sku.price.is_sign_negative() {
                    return Err(invalid(format!("{at}.price must not be negative")));
                }
                if sku.multiple_quantity < 1 {
                    return Err(invalid(format!("{at}.multiple_quantity must be at least 1")));
                }
                if sku.min_quantity.is_some_and(|q| q < 0) {
                    return Err(invalid(format!("{at}.min_quantity must not be negative")));
                }
                if sku
                    .price_tables_skus
                    .iter()
                    .any(|pts| pts.price.is_sign_negative())
                {
                    return Err(invalid(format!(
                        "{at}.price_tables_skus prices must not be negative"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Total SKU count across all variants.
    #[must_use]
    pub fn sku_count(&self) -> usize {
        self.variants.iter().map(|v| v.skus.len()).sum()
    }
}

fn require_text(field: &str, value: &str) -> Result<(), CoreError> {
    if is_non_empty_string(value) {
        Ok(())
    } else {
        Err(invalid(format!("{field} must not be empty")))
    }
}

fn invalid(message: String) -> CoreError {
    CoreError::InvalidProduct(message)
}

/// Partial update of a product's top-level fields.
///
/// Outer `None` means "not in the request, keep the stored value". For nullable
/// columns `Some(None)` clears the value and `Some(Some(v))` sets it.
#[allow(clippy::option_option)]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub reference: Option<String>,
    #[serde(rename = "type")]
    pub product_type: Option<ProductType>,
    pub gender: Option<ProductGender>,
    pub prompt_delivery: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub company_id: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub erp_id: Option<Option<String>>,
    pub brand_id: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub deadline_id: Option<Option<i64>>,
    pub category_id: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub subcategory_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub category_order: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub composition_data: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub technical_information: Option<Option<String>>,
    pub open_grid: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub ipi: Option<Option<Decimal>>,
    pub is_discontinued: Option<bool>,
    pub is_launch: Option<bool>,
    pub is_visible: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub colection: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub st: Option<Option<Decimal>>,
    /// Nested variants are not reconciled on update; the payload is only
    /// recorded so callers can warn about it.
    #[serde(default)]
    pub variants: Option<IgnoredAny>,
}

impl ProductUpdate {
    /// Whether the request carried a nested `variants` payload.
    #[must_use]
    pub fn has_nested_variants(&self) -> bool {
        self.variants.is_some()
    }

    /// # Errors
    ///
    /// Returns [`CoreError::InvalidProduct`] if a supplied required text field is blank.
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(name) = &self.name {
            require_text("name", name)?;
        }
        if let Some(reference) = &self.reference {
            require_text("reference", reference)?;
        }
        Ok(())
    }
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
