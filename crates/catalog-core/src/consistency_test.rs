use chrono::Utc;
use rust_decimal::Decimal;

use super::*;
use crate::products::{
    BrandRef, CategoryRef, PriceTableSku, ProductGender, ProductType, Sku,
};

fn association(id: i64, sku_id: i64, price_table_id: i64) -> PriceTableSku {
    PriceTableSku {
        id,
        sku_id,
        price_table_id,
        price: Decimal::new(9990, 2),
    }
}

/// A SKU whose associations point at the given price tables, in order.
fn sku(id: i64, price_tables: &[i64]) -> Sku {
    Sku {
        id,
        variant_id: 1,
        size: "M".to_string(),
        stock: 10,
        price: Decimal::new(12990, 2),
        code: format!("SKU-{id}"),
        min_quantity: None,
        multiple_quantity: 1,
        erp_id: None,
        cest: None,
        height: None,
        length: None,
        ncm: None,
        weight: None,
        width: None,
        price_tables_skus: price_tables
            .iter()
            .enumerate()
            .map(|(i, pt)| association(id * 100 + i as i64, id, *pt))
            .collect(),
    }
}

fn variant(id: i64, skus: Vec<Sku>) -> Variant {
    Variant {
        id,
        product_id: 1,
        name: format!("Variant {id}"),
        hex_code: None,
        skus,
    }
}

fn product(variants: Vec<Variant>) -> Product {
    let now = Utc::now();
    Product {
        id: 1,
        name: "Linen Shirt".to_string(),
        reference: "LS-01".to_string(),
        product_type: ProductType::Clothing,
        gender: ProductGender::Unisex,
        prompt_delivery: true,
        description: None,
        company_id: 1,
        erp_id: None,
        brand_id: 1,
        deadline_id: None,
        category_id: 1,
        subcategory_id: None,
        category_order: None,
        composition_data: None,
        technical_information: None,
        open_grid: false,
        ipi: None,
        is_discontinued: false,
        is_launch: false,
        is_visible: true,
        colection: None,
        st: None,
        created_at: now,
        updated_at: now,
        deleted_at: None,
        brand: BrandRef {
            id: 1,
            name: "Acme".to_string(),
        },
        category: CategoryRef {
            id: 1,
            name: "Shirts".to_string(),
        },
        subcategory: None,
        variants,
    }
}

#[test]
fn variant_without_skus_is_invalid() {
    assert!(!is_consistent_variant(&variant(1, vec![])));
}

#[test]
fn variant_whose_first_sku_has_no_price_table_is_invalid() {
    let v = variant(1, vec![sku(1, &[]), sku(2, &[7])]);
    assert!(!is_consistent_variant(&v));
}

#[test]
fn variant_with_later_sku_missing_price_table_is_invalid() {
    let v = variant(1, vec![sku(1, &[7]), sku(2, &[])]);
    assert!(!is_consistent_variant(&v));
}

#[test]
fn variant_with_mixed_price_tables_is_invalid() {
    let v = variant(1, vec![sku(1, &[7]), sku(2, &[7]), sku(3, &[8])]);
    assert!(!is_consistent_variant(&v));
}

#[test]
fn variant_sharing_one_price_table_is_valid() {
    let v = variant(1, vec![sku(1, &[7]), sku(2, &[7]), sku(3, &[7])]);
    assert!(is_consistent_variant(&v));
}

#[test]
fn only_first_association_decides_price_table() {
    // SKU 2 also belongs to table 8, but its first association is table 7.
    let v = variant(1, vec![sku(1, &[7, 9]), sku(2, &[7, 8])]);
    assert!(is_consistent_variant(&v));

    // Same tables, different first association: rejected even though both
    // SKUs share table 7 somewhere in their list.
    let v = variant(1, vec![sku(1, &[7]), sku(2, &[8, 7])]);
    assert!(!is_consistent_variant(&v));
}

#[test]
fn product_keeps_valid_variants_unmodified_and_in_order() {
    let good_a = variant(1, vec![sku(1, &[7]), sku(2, &[7])]);
    let bad = variant(2, vec![]);
    let good_b = variant(3, vec![sku(3, &[9])]);

    let filtered = filter_variants_by_price_table(product(vec![
        good_a.clone(),
        bad,
        good_b.clone(),
    ]))
    .expect("product with valid variants survives");

    assert_eq!(filtered.variants, vec![good_a, good_b]);
}

#[test]
fn product_without_valid_variants_is_dropped() {
    let result = filter_variants_by_price_table(product(vec![
        variant(1, vec![]),
        variant(2, vec![sku(1, &[7]), sku(2, &[8])]),
    ]));
    assert!(result.is_none());
}

#[test]
fn product_without_any_variants_is_dropped() {
    assert!(filter_variants_by_price_table(product(vec![])).is_none());
}

#[test]
fn fully_consistent_product_is_returned_as_is() {
    let original = product(vec![variant(1, vec![sku(1, &[7])])]);
    let filtered = filter_variants_by_price_table(original.clone());
    assert_eq!(filtered, Some(original));
}
