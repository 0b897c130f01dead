use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use catalog_core::{
    BrandRef, CategoryRef, PriceTableSku, Product, ProductGender, ProductType, Sku,
    SubcategoryRef, Variant,
};

use crate::DbError;

/// Which side of the soft-delete marker a read targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductScope {
    /// `deleted_at IS NULL`
    Active,
    /// `deleted_at IS NOT NULL`
    Deleted,
}

impl ProductScope {
    pub(super) fn predicate(self) -> &'static str {
        match self {
            ProductScope::Active => "p.deleted_at IS NULL",
            ProductScope::Deleted => "p.deleted_at IS NOT NULL",
        }
    }
}

/// Column list matching [`ProductRow`]; expects `p`, `b`, `c`, `s` aliases
/// from [`PRODUCT_FROM`].
pub(super) const PRODUCT_COLUMNS: &str = "\
    p.id, p.name, p.reference, p.type AS product_type, p.gender, p.prompt_delivery, \
    p.description, p.company_id, p.erp_id, p.brand_id, p.deadline_id, p.category_id, \
    p.subcategory_id, p.category_order, p.composition_data, p.technical_information, \
    p.open_grid, p.ipi, p.is_discontinued, p.is_launch, p.is_visible, p.colection, p.st, \
    p.created_at, p.updated_at, p.deleted_at, \
    b.name AS brand_name, c.name AS category_name, \
    s.name AS subcategory_name, s.category_id AS subcategory_category_id";

pub(crate) const PRODUCT_FROM: &str = "\
    FROM products p \
    JOIN brands b ON b.id = p.brand_id \
    JOIN categories c ON c.id = p.category_id \
    LEFT JOIN subcategories s ON s.id = p.subcategory_id";

/// Filter predicate shared by product listing and counting.
///
/// Binds: `$1` brand name, `$2` category name, `$3` gender, `$4` type,
/// `$5` prompt delivery. Each is skipped when NULL.
pub(crate) const ACTIVE_FILTER_PREDICATE: &str = "\
    p.deleted_at IS NULL \
    AND ($1::TEXT IS NULL OR b.name = $1) \
    AND ($2::TEXT IS NULL OR c.name = $2) \
    AND ($3::TEXT IS NULL OR p.gender = $3) \
    AND ($4::TEXT IS NULL OR p.type = $4) \
    AND ($5::BOOL IS NULL OR p.prompt_delivery = $5)";

/// A `products` row joined with its brand, category, and subcategory names.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(super) struct ProductRow {
    pub id: i64,
    pub name: String,
    pub reference: String,
    pub product_type: String,
    pub gender: String,
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
    pub brand_name: String,
    pub category_name: String,
    pub subcategory_name: Option<String>,
    pub subcategory_category_id: Option<i64>,
}

/// A row from the `variants` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(super) struct VariantRow {
    pub id: i64,
    pub product_id: i64,
    pub name: String,
    pub hex_code: Option<String>,
}

/// A row from the `skus` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(super) struct SkuRow {
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
}

/// A row from the `price_tables_skus` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(super) struct PriceTableSkuRow {
    pub id: i64,
    pub sku_id: i64,
    pub price_table_id: i64,
    pub price: Decimal,
}

impl ProductRow {
    /// Builds the domain product with an empty variant list.
    pub(super) fn into_product(self) -> Result<Product, DbError> {
        let product_type = self
            .product_type
            .parse::<ProductType>()
            .map_err(|e| DbError::InvalidData(format!("product {}: {e}", self.id)))?;
        let gender = self
            .gender
            .parse::<ProductGender>()
            .map_err(|e| DbError::InvalidData(format!("product {}: {e}", self.id)))?;

        let subcategory = match (self.subcategory_id, self.subcategory_name) {
            (Some(id), Some(name)) => Some(SubcategoryRef {
                id,
                category_id: self.subcategory_category_id.unwrap_or(self.category_id),
                name,
            }),
            _ => None,
        };

        Ok(Product {
            id: self.id,
            name: self.name,
            reference: self.reference,
            product_type,
            gender,
            prompt_delivery: self.prompt_delivery,
            description: self.description,
            company_id: self.company_id,
            erp_id: self.erp_id,
            brand_id: self.brand_id,
            deadline_id: self.deadline_id,
            category_id: self.category_id,
            subcategory_id: self.subcategory_id,
            category_order: self.category_order,
            composition_data: self.composition_data,
            technical_information: self.technical_information,
            open_grid: self.open_grid,
            ipi: self.ipi,
            is_discontinued: self.is_discontinued,
            is_launch: self.is_launch,
            is_visible: self.is_visible,
            colection: self.colection,
            st: self.st,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
            brand: BrandRef {
                id: self.brand_id,
                name: self.brand_name,
            },
            category: CategoryRef {
                id: self.category_id,
                name: self.category_name,
            },
            subcategory,
            variants: Vec::new(),
        })
    }
}

impl From<VariantRow> for Variant {
    fn from(row: VariantRow) -> Self {
        Variant {
            id: row.id,
            product_id: row.product_id,
            name: row.name,
            hex_code: row.hex_code,
            skus: Vec::new(),
        }
    }
}

impl From<SkuRow> for Sku {
    fn from(row: SkuRow) -> Self {
        Sku {
            id: row.id,
            variant_id: row.variant_id,
            size: row.size,
            stock: row.stock,
            price: row.price,
            code: row.code,
            min_quantity: row.min_quantity,
            multiple_quantity: row.multiple_quantity,
            erp_id: row.erp_id,
            cest: row.cest,
            height: row.height,
            length: row.length,
            ncm: row.ncm,
            weight: row.weight,
            width: row.width,
            price_tables_skus: Vec::new(),
        }
    }
}

impl From<PriceTableSkuRow> for PriceTableSku {
    fn from(row: PriceTableSkuRow) -> Self {
        PriceTableSku {
            id: row.id,
            sku_id: row.sku_id,
            price_table_id: row.price_table_id,
            price: row.price,
        }
    }
}
