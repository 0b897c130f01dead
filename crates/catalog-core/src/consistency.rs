//! Variant-consistency rule applied to every active product read.
//!
//! A variant is exposed only when it has at least one SKU and all of its SKUs
//! resolve to the same price table. A SKU's price table is the
//! `price_table_id` of its first association in storage order; later
//! associations are not inspected.

use crate::products::{Product, Variant};

/// Returns `true` if the variant passes the price-table consistency rule.
#[must_use]
pub fn is_consistent_variant(variant: &Variant) -> bool {
    let Some(first_sku) = variant.skus.first() else {
        return false;
    };
    let Some(reference) = first_sku.price_table_id() else {
        return false;
    };

    variant
        .skus
        .iter()
        .all(|sku| sku.price_table_id() == Some(reference))
}

/// Drops inconsistent variants from `product`.
///
/// Returns `None` when no variant survives; callers treat that the same as
/// "product not found". Surviving variants keep their order and content.
#[must_use]
pub fn filter_variants_by_price_table(mut product: Product) -> Option<Product> {
    product.variants.retain(is_consistent_variant);
    if product.variants.is_empty() {
        None
    } else {
        Some(product)
    }
}

#[cfg(test)]
#[path = "consistency_test.rs"]
mod tests;
