//! `PgStore` against a throwaway PostgreSQL container.
//!
//! Needs a Docker daemon: `cargo test --test postgres_store -- --ignored`.

use chrono::Utc;
use sqlx::PgPool;
use testcontainers::{runners::AsyncRunner, ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;

use elegant_vogue::domain::aggregates::{
    CartProjection, CustomerDetails, Highlight, NewCartLine, NewOrder, OrderStatus, ProductFilter, SortBy,
};
use elegant_vogue::domain::value_objects::{CartId, Money, OrderNumber};
use elegant_vogue::seed::CatalogSeed;
use elegant_vogue::store::{CartRepository, CatalogRepository, OrderRepository, PgStore, StoreError};

struct TestDb {
    // keeps the container alive for the test
    _container: ContainerAsync<Postgres>,
    pool: PgPool,
    store: PgStore,
}

/// A migrated database holding the demo catalog.
async fn seeded_db() -> TestDb {
    // NULLS NOT DISTINCT needs PostgreSQL 15+
    let container = Postgres::default().with_tag("16-alpine").start().await.expect("Failed to start PostgreSQL container");
    let host = container.get_host().await.expect("Failed to get container host");
    let port = container.get_host_port_ipv4(5432).await.expect("Failed to get container port");
    let pool = PgPool::connect(&format!("postgres://postgres:postgres@{host}:{port}/postgres"))
        .await
        .expect("Failed to create pool for database");

    let store = PgStore::new(pool.clone());
    store.migrate().await.expect("Failed to run migrations on database");
    store.seed_catalog(&CatalogSeed::demo(Utc::now())).await.expect("Failed to seed catalog");
    TestDb { _container: container, pool, store }
}

fn customer() -> CustomerDetails {
    CustomerDetails {
        email: "ada@example.com".into(), phone: "555-0100".into(),
        first_name: "Ada".into(), last_name: "Lovelace".into(), country: "United Kingdom".into(),
        state_region: None, address: "12 St James's Square".into(), city: "London".into(), postal_code: "SW1Y 4JH".into(),
    }
}

fn plain(product_id: i64, quantity: i32) -> NewCartLine {
    NewCartLine { product_id, quantity, color_id: None, size_id: None }
}

async fn draft(store: &PgStore, cart: &CartId, number: OrderNumber) -> NewOrder {
    let projection = CartProjection::build(store.cart_lines(cart).await.unwrap(), Money::from_cents(1000));
    NewOrder::from_cart(&projection, customer(), number, Utc::now())
}

async fn order_count(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM orders").fetch_one(pool).await.unwrap()
}

#[tokio::test]
#[ignore = "needs docker"]
async fn test_add_line_merges_same_selection() {
    let db = seeded_db().await;
    let cart = CartId::new("cart-a");

    let styled = NewCartLine { product_id: 1, quantity: 2, color_id: Some(1), size_id: Some(3) };
    let first = db.store.add_line(&cart, &styled).await.unwrap();
    let merged = db.store.add_line(&cart, &NewCartLine { quantity: 3, ..styled.clone() }).await.unwrap();
    assert_eq!(first.id, merged.id);
    assert_eq!(merged.quantity, 5);

    // absent color and size still count as the same selection
    let bare = db.store.add_line(&cart, &plain(1, 1)).await.unwrap();
    let bare_again = db.store.add_line(&cart, &plain(1, 1)).await.unwrap();
    assert_eq!(bare.id, bare_again.id);
    assert_ne!(bare.id, first.id);
    assert_eq!(bare_again.quantity, 2);

    assert_eq!(db.store.cart_lines(&cart).await.unwrap().len(), 2);
    assert_eq!(db.store.item_count(&cart).await.unwrap(), 7);
}

#[tokio::test]
#[ignore = "needs docker"]
async fn test_lines_are_scoped_to_cart() {
    let db = seeded_db().await;
    let a = CartId::new("cart-a");
    let b = CartId::new("cart-b");
    let line = db.store.add_line(&a, &plain(1, 1)).await.unwrap();
    let theirs = db.store.add_line(&b, &plain(1, 4)).await.unwrap();
    assert_ne!(line.id, theirs.id);

    assert!(!db.store.set_line_quantity(&b, line.id, 9).await.unwrap());
    assert!(!db.store.remove_line(&b, line.id).await.unwrap());
    assert_eq!(db.store.item_count(&a).await.unwrap(), 1);

    assert_eq!(db.store.clear_cart(&b).await.unwrap(), 1);
    assert_eq!(db.store.cart_lines(&a).await.unwrap().len(), 1);
    assert!(db.store.set_line_quantity(&a, line.id, 3).await.unwrap());
    assert_eq!(db.store.item_count(&a).await.unwrap(), 3);
}

#[tokio::test]
#[ignore = "needs docker"]
async fn test_cart_lines_join_catalog() {
    let db = seeded_db().await;
    let cart = CartId::new("cart-a");
    db.store.add_line(&cart, &NewCartLine { product_id: 1, quantity: 2, color_id: Some(1), size_id: Some(3) }).await.unwrap();
    let lines = db.store.cart_lines(&cart).await.unwrap();
    assert_eq!(lines[0].product_name, "Abstract Print Shirt");
    assert_eq!(lines[0].color_hex.as_deref(), Some("#000000"));
    assert_eq!(lines[0].size_name.as_deref(), Some("M"));
    assert_eq!(lines[0].unit_price, Money::from_cents(9900));
}

#[tokio::test]
#[ignore = "needs docker"]
async fn test_place_order_writes_order_and_consumes_lines() {
    let db = seeded_db().await;
    let cart = CartId::new("cart-a");
    db.store.add_line(&cart, &NewCartLine { product_id: 1, quantity: 2, color_id: Some(1), size_id: Some(3) }).await.unwrap();
    db.store.add_line(&cart, &plain(2, 1)).await.unwrap();

    let placed = db.store.place_order(&cart, draft(&db.store, &cart, OrderNumber::generate(Utc::now())).await).await.unwrap();
    assert_eq!(placed.items.len(), 2);
    assert_eq!(db.store.item_count(&cart).await.unwrap(), 0);

    let stored = db.store.find_order(placed.id).await.unwrap().unwrap();
    assert_eq!(stored.order_number, placed.order_number);
    assert_eq!(stored.status, OrderStatus::Pending);
    assert_eq!(stored.total, placed.total);
    assert_eq!(stored.shipping_cost, Money::from_cents(1000));
    assert_eq!(stored.customer.city, "London");
    assert_eq!(stored.items[0].product_name.as_deref(), Some("Abstract Print Shirt"));
    assert_eq!(stored.items[0].color_name.as_deref(), Some("Black"));
    assert_eq!(stored.item_count(), 3);
    assert!(db.store.find_order(placed.id + 1000).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "needs docker"]
async fn test_place_order_keeps_lines_added_after_projection() {
    let db = seeded_db().await;
    let cart = CartId::new("cart-a");
    let ordered = db.store.add_line(&cart, &plain(1, 2)).await.unwrap();
    let order = draft(&db.store, &cart, OrderNumber::generate(Utc::now())).await;

    let late = db.store.add_line(&cart, &plain(2, 1)).await.unwrap();
    db.store.add_line(&cart, &plain(1, 1)).await.unwrap();

    db.store.place_order(&cart, order).await.unwrap();
    let remaining: Vec<(i64, i32)> = db.store.cart_lines(&cart).await.unwrap().iter().map(|l| (l.line_id, l.quantity)).collect();
    assert_eq!(remaining, vec![(ordered.id, 1), (late.id, 1)]);
}

#[tokio::test]
#[ignore = "needs docker"]
async fn test_duplicate_order_number_changes_nothing() {
    let db = seeded_db().await;
    let a = CartId::new("cart-a");
    let b = CartId::new("cart-b");
    db.store.add_line(&a, &plain(1, 1)).await.unwrap();
    db.store.add_line(&b, &plain(2, 2)).await.unwrap();

    let number = OrderNumber::generate(Utc::now());
    db.store.place_order(&a, draft(&db.store, &a, number.clone()).await).await.unwrap();
    let err = db.store.place_order(&b, draft(&db.store, &b, number).await).await.unwrap_err();
    assert!(matches!(err, StoreError::DuplicateOrderNumber));
    assert_eq!(order_count(&db.pool).await, 1);
    assert_eq!(db.store.item_count(&b).await.unwrap(), 2);
}

#[tokio::test]
#[ignore = "needs docker"]
async fn test_failed_item_write_rolls_back_order() {
    let db = seeded_db().await;
    let cart = CartId::new("cart-a");
    db.store.add_line(&cart, &plain(1, 1)).await.unwrap();
    db.store.add_line(&cart, &plain(2, 1)).await.unwrap();

    let mut order = draft(&db.store, &cart, OrderNumber::generate(Utc::now())).await;
    // overflows NUMERIC(10,2), so the second item insert fails after the order row went in
    order.items[1].unit_price = Money::from_cents(100_000_000_000);
    assert!(db.store.place_order(&cart, order).await.is_err());

    assert_eq!(order_count(&db.pool).await, 0);
    let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_items").fetch_one(&db.pool).await.unwrap();
    assert_eq!(items, 0);
    assert_eq!(db.store.item_count(&cart).await.unwrap(), 2);
}

#[tokio::test]
#[ignore = "needs docker"]
async fn test_catalog_queries() {
    let db = seeded_db().await;
    assert!(!db.store.is_catalog_empty().await.unwrap());

    let newest = db.store.find_products(&ProductFilter::default()).await.unwrap();
    assert_eq!(newest.iter().map(|p| p.id).collect::<Vec<_>>(), (1..=9).rev().collect::<Vec<_>>());

    let mint = ProductFilter { color_ids: vec![6], ..Default::default() };
    assert_eq!(db.store.find_products(&mint).await.unwrap().iter().map(|p| p.id).collect::<Vec<_>>(), vec![1]);

    let summer = ProductFilter { collection_id: Some(2), sort_by: SortBy::PriceDesc, ..Default::default() };
    assert_eq!(db.store.find_products(&summer).await.unwrap().iter().map(|p| p.id).collect::<Vec<_>>(), vec![3, 4, 8, 9]);

    let cheap = ProductFilter { search: Some("t-shirt".into()), max_price: Some(Money::from_cents(9900)), ..Default::default() };
    assert!(db.store.find_products(&cheap).await.unwrap().iter().all(|p| p.price <= Money::from_cents(9900)));

    let facets = db.store.facets().await.unwrap();
    assert_eq!(facets.sizes.first().map(|s| s.name.as_str()), Some("XS"));
    assert_eq!(facets.colors.len(), 9);

    let detail = db.store.product_detail(2).await.unwrap().unwrap();
    assert_eq!(detail.category_name.as_deref(), Some("Men"));
    assert_eq!(detail.colors.len(), 3);
    assert_eq!(db.store.highlighted(Highlight::Featured, 4).await.unwrap().len(), 4);
    assert_eq!(db.store.current_collection().await.unwrap().map(|c| c.name), Some("Summer 2024".to_string()));
}
