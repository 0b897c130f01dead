//! Live integration tests for catalog-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/catalog-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory.

use catalog_core::{
    filter_variants_by_price_table, parse_catalog_seed, NewPriceTableSku, NewProduct, NewSku,
    NewVariant, Pagination, ProductFilters, ProductGender, ProductType, ProductUpdate,
};
use catalog_db::{
    count_products, create_product, get_product, list_deleted_products, list_products,
    product_filter_summary, run_migrations, seed_catalog, soft_delete_product, update_product,
    DbError, ProductScope,
};
use rust_decimal::Decimal;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const SEED: &str = "\
brands:
  - name: Acme
  - name: Northwind
categories:
  - name: Shirts
    subcategories: [Polo, Linen]
  - name: Shoes
price_tables:
  - name: Retail
  - name: Wholesale
    description: B2B
";

struct Lookups {
    acme: i64,
    northwind: i64,
    shirts: i64,
    shoes: i64,
    retail: i64,
    wholesale: i64,
}

async fn id_of(pool: &PgPool, table: &str, name: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT id FROM {table} WHERE name = $1"))
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap_or_else(|e| panic!("lookup of {table} '{name}' failed: {e}"))
}

async fn seed_lookups(pool: &PgPool) -> Lookups {
    let seed = parse_catalog_seed(SEED).expect("seed fixture should parse");
    seed_catalog(pool, &seed).await.expect("seed_catalog failed");

    Lookups {
        acme: id_of(pool, "brands", "Acme").await,
        northwind: id_of(pool, "brands", "Northwind").await,
        shirts: id_of(pool, "categories", "Shirts").await,
        shoes: id_of(pool, "categories", "Shoes").await,
        retail: id_of(pool, "price_tables", "Retail").await,
        wholesale: id_of(pool, "price_tables", "Wholesale").await,
    }
}

fn make_sku(code: &str, price_table_ids: &[i64]) -> NewSku {
    NewSku {
        size: "M".to_string(),
        stock: 5,
        price: Decimal::new(9990, 2),
        code: code.to_string(),
        min_quantity: None,
        multiple_quantity: 1,
        erp_id: None,
        cest: None,
        height: None,
        length: None,
        ncm: None,
        weight: None,
        width: None,
        price_tables_skus: price_table_ids
            .iter()
            .map(|&price_table_id| NewPriceTableSku {
                price: Decimal::new(8990, 2),
                price_table_id,
            })
            .collect(),
    }
}

fn make_product(reference: &str, brand_id: i64, category_id: i64) -> NewProduct {
    NewProduct {
        name: format!("Product {reference}"),
        reference: reference.to_string(),
        product_type: ProductType::Clothing,
        gender: ProductGender::Unisex,
        prompt_delivery: false,
        description: None,
        company_id: 1,
        erp_id: None,
        brand_id,
        deadline_id: None,
        category_id,
        subcategory_id: None,
        category_order: None,
        composition_data: None,
        technical_information: None,
        open_grid: None,
        ipi: None,
        is_discontinued: None,
        is_launch: None,
        is_visible: None,
        colection: None,
        st: None,
        variants: Vec::new(),
    }
}

/// A product with one variant whose SKUs all sit in `price_table_id`.
fn consistent_product(reference: &str, brand_id: i64, category_id: i64, table: i64) -> NewProduct {
    let mut product = make_product(reference, brand_id, category_id);
    product.variants = vec![NewVariant {
        name: "Default".to_string(),
        hex_code: None,
        skus: vec![make_sku(&format!("{reference}-M"), &[table])],
    }];
    product
}

// ---------------------------------------------------------------------------
// Section 1: Create and read
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn create_round_trips_nested_tree(pool: PgPool) {
    let l = seed_lookups(&pool).await;
    let mut product = make_product("RT-1", l.acme, l.shirts);
    product.variants = (0..2)
        .map(|v| NewVariant {
            name: format!("Color {v}"),
            hex_code: Some("#000000".to_string()),
            skus: (0..3)
                .map(|s| make_sku(&format!("RT-1-{v}-{s}"), &[l.retail]))
                .collect(),
        })
        .collect();

    let created = create_product(&pool, &product)
        .await
        .expect("create_product failed");

    assert_eq!(created.reference, "RT-1");
    assert_eq!(created.brand.name, "Acme");
    assert_eq!(created.category.name, "Shirts");
    assert!(created.is_visible, "is_visible should default to true");
    assert!(!created.open_grid);
    assert_eq!(created.variants.len(), 2);
    for variant in &created.variants {
        assert_eq!(variant.skus.len(), 3);
        for sku in &variant.skus {
            assert_eq!(sku.price_table_id(), Some(l.retail));
        }
    }

    let fetched = get_product(&pool, created.id, ProductScope::Active)
        .await
        .expect("get_product failed")
        .expect("created product should be readable");
    assert_eq!(fetched, created);
}

#[sqlx::test(migrations = "../../migrations")]
async fn create_rolls_back_on_duplicate_sku_code(pool: PgPool) {
    let l = seed_lookups(&pool).await;
    let mut product = make_product("DUP-1", l.acme, l.shirts);
    product.variants = vec![NewVariant {
        name: "Default".to_string(),
        hex_code: None,
        skus: vec![make_sku("SAME", &[l.retail]), make_sku("SAME", &[l.retail])],
    }];

    let err = create_product(&pool, &product)
        .await
        .expect_err("duplicate SKU code should fail");
    assert!(err.unique_violation().is_some(), "expected 23505, got {err}");

    let products: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(&pool)
        .await
        .expect("count failed");
    assert_eq!(products, 0, "failed create must leave no product row");
}

#[sqlx::test(migrations = "../../migrations")]
async fn duplicate_reference_is_unique_violation(pool: PgPool) {
    let l = seed_lookups(&pool).await;
    create_product(&pool, &make_product("REF-1", l.acme, l.shirts))
        .await
        .expect("first create failed");

    let err = create_product(&pool, &make_product("REF-1", l.acme, l.shirts))
        .await
        .expect_err("second create should fail");
    assert!(err.unique_violation().is_some());
}

#[sqlx::test(migrations = "../../migrations")]
async fn associations_keep_storage_order(pool: PgPool) {
    let l = seed_lookups(&pool).await;
    let mut product = make_product("ORD-1", l.acme, l.shirts);
    product.variants = vec![NewVariant {
        name: "Default".to_string(),
        hex_code: None,
        skus: vec![
            make_sku("ORD-1-A", &[l.wholesale, l.retail]),
            make_sku("ORD-1-B", &[l.wholesale]),
        ],
    }];

    let created = create_product(&pool, &product)
        .await
        .expect("create_product failed");

    let skus = &created.variants[0].skus;
    assert_eq!(skus[0].price_tables_skus.len(), 2);
    assert_eq!(skus[0].price_table_id(), Some(l.wholesale));
    assert!(filter_variants_by_price_table(created).is_some());
}

// ---------------------------------------------------------------------------
// Section 2: Listing, filtering, counting
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn list_applies_filters_and_pagination(pool: PgPool) {
    let l = seed_lookups(&pool).await;
    for (reference, brand) in [("F-1", l.acme), ("F-2", l.northwind), ("F-3", l.acme)] {
        create_product(&pool, &consistent_product(reference, brand, l.shirts, l.retail))
            .await
            .expect("create_product failed");
    }

    let acme = ProductFilters {
        brand: Some("Acme".to_string()),
        ..ProductFilters::default()
    };
    let listed = list_products(&pool, &acme).await.expect("list failed");
    let refs: Vec<&str> = listed.iter().map(|p| p.reference.as_str()).collect();
    assert_eq!(refs, ["F-1", "F-3"]);

    let second_page = ProductFilters {
        pagination: Some(Pagination { page: 2, limit: 2 }),
        ..ProductFilters::default()
    };
    let listed = list_products(&pool, &second_page)
        .await
        .expect("list failed");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].reference, "F-3");

    let kids = ProductFilters {
        gender: Some(ProductGender::Kids),
        ..ProductFilters::default()
    };
    assert!(list_products(&pool, &kids).await.expect("list failed").is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn count_includes_products_the_consistency_rule_drops(pool: PgPool) {
    let l = seed_lookups(&pool).await;
    create_product(&pool, &consistent_product("C-1", l.acme, l.shirts, l.retail))
        .await
        .expect("create_product failed");

    // Mixed price tables inside one variant: stored, but never listed.
    let mut mixed = make_product("C-2", l.acme, l.shirts);
    mixed.variants = vec![NewVariant {
        name: "Mixed".to_string(),
        hex_code: None,
        skus: vec![
            make_sku("C-2-A", &[l.retail]),
            make_sku("C-2-B", &[l.wholesale]),
        ],
    }];
    create_product(&pool, &mixed)
        .await
        .expect("create_product failed");

    let filters = ProductFilters::default();
    let count = count_products(&pool, &filters)
        .await
        .expect("count failed");
    let visible: Vec<_> = list_products(&pool, &filters)
        .await
        .expect("list failed")
        .into_iter()
        .filter_map(filter_variants_by_price_table)
        .collect();

    assert_eq!(count, 2);
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].reference, "C-1");
}

#[sqlx::test(migrations = "../../migrations")]
async fn filter_summary_counts_active_products(pool: PgPool) {
    let l = seed_lookups(&pool).await;
    let mut prompt = consistent_product("S-1", l.acme, l.shirts, l.retail);
    prompt.prompt_delivery = true;
    create_product(&pool, &prompt)
        .await
        .expect("create_product failed");
    let shoe = create_product(&pool, &consistent_product("S-2", l.acme, l.shoes, l.retail))
        .await
        .expect("create_product failed");
    soft_delete_product(&pool, shoe.id)
        .await
        .expect("soft delete failed");

    let summary = product_filter_summary(&pool)
        .await
        .expect("summary failed");

    let acme = summary
        .brands
        .iter()
        .find(|b| b.name == "Acme")
        .expect("Acme should be listed");
    assert_eq!(acme.quantity, 1);

    let names: Vec<&str> = summary.categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Shirts", "Shoes"]);
    assert_eq!(summary.categories[1].quantity, 0);
    assert_eq!(summary.categories[0].subcategories.len(), 2);

    assert_eq!(summary.genders.len(), 1);
    assert_eq!(summary.genders[0].name, "UNISEX");
    assert_eq!(summary.prompt_delivery.true_count, 1);
    assert_eq!(summary.prompt_delivery.false_count, 0);
}

// ---------------------------------------------------------------------------
// Section 3: Update and soft delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn update_overlays_supplied_fields(pool: PgPool) {
    let l = seed_lookups(&pool).await;
    let mut product = consistent_product("U-1", l.acme, l.shirts, l.retail);
    product.description = Some("old".to_string());
    let created = create_product(&pool, &product)
        .await
        .expect("create_product failed");

    let update = ProductUpdate {
        name: Some("Renamed".to_string()),
        description: Some(None),
        ..ProductUpdate::default()
    };
    let updated = update_product(&pool, created.id, &update)
        .await
        .expect("update_product failed");

    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.reference, "U-1");
    assert!(updated.description.is_none());
    assert!(updated.updated_at >= created.updated_at);
    assert_eq!(updated.variants, created.variants);
}

#[sqlx::test(migrations = "../../migrations")]
async fn update_of_missing_product_is_not_found(pool: PgPool) {
    let err = update_product(&pool, 9999, &ProductUpdate::default())
        .await
        .expect_err("update should fail");
    assert!(matches!(err, DbError::NotFound));
}

#[sqlx::test(migrations = "../../migrations")]
async fn soft_delete_moves_product_between_listings(pool: PgPool) {
    let l = seed_lookups(&pool).await;
    let keep = create_product(&pool, &consistent_product("D-1", l.acme, l.shirts, l.retail))
        .await
        .expect("create_product failed");
    let gone = create_product(&pool, &consistent_product("D-2", l.acme, l.shirts, l.retail))
        .await
        .expect("create_product failed");

    let deleted = soft_delete_product(&pool, gone.id)
        .await
        .expect("soft delete failed")
        .expect("first delete should return the product");
    assert!(deleted.deleted_at.is_some());
    assert_eq!(deleted.variants.len(), 1, "children are kept");

    let again = soft_delete_product(&pool, gone.id)
        .await
        .expect("soft delete failed");
    assert!(again.is_none(), "second delete must find nothing");

    let active: Vec<i64> = list_products(&pool, &ProductFilters::default())
        .await
        .expect("list failed")
        .iter()
        .map(|p| p.id)
        .collect();
    let removed: Vec<i64> = list_deleted_products(&pool)
        .await
        .expect("list deleted failed")
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(active, [keep.id]);
    assert_eq!(removed, [gone.id]);

    assert!(get_product(&pool, gone.id, ProductScope::Active)
        .await
        .expect("get failed")
        .is_none());
    assert!(get_product(&pool, keep.id, ProductScope::Deleted)
        .await
        .expect("get failed")
        .is_none());

    let err = update_product(&pool, gone.id, &ProductUpdate::default())
        .await
        .expect_err("deleted products are not updatable");
    assert!(matches!(err, DbError::NotFound));
}

// ---------------------------------------------------------------------------
// Section 4: Lookup seeding
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn seeding_twice_is_idempotent(pool: PgPool) {
    let seed = parse_catalog_seed(SEED).expect("seed fixture should parse");
    let first = seed_catalog(&pool, &seed).await.expect("first seed failed");
    seed_catalog(&pool, &seed).await.expect("second seed failed");

    assert_eq!(first.brands, 2);
    assert_eq!(first.subcategories, 2);

    let brands: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM brands")
        .fetch_one(&pool)
        .await
        .expect("count failed");
    assert_eq!(brands, 2);
}

// ---------------------------------------------------------------------------
// Section 5: Migrations
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = false)]
async fn run_migrations_counts_only_newly_applied(pool: PgPool) {
    let first = run_migrations(&pool).await.expect("first run failed");
    assert_eq!(first, 1, "fresh database applies the schema migration");

    let second = run_migrations(&pool).await.expect("second run failed");
    assert_eq!(second, 0, "nothing left to apply");
}
