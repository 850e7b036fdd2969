//! PostgreSQL store.

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::{Postgres, QueryBuilder};

use super::{CartRepository, CatalogRepository, OrderRepository, StoreError, StoreResult};
use crate::domain::aggregates::{
    CartLine, CartLineDetails, CatalogFacets, Category, Collection, Color, CustomerDetails, Highlight, NewCartLine,
    NewOrder, Order, OrderItem, OrderStatus, Product, ProductDetail, ProductFilter, Size, SizeOption, SortBy,
};
use crate::domain::value_objects::{CartId, Money, OrderNumber};
use crate::seed::CatalogSeed;

const CART_LINES_SQL: &str = "\
    SELECT ci.id AS line_id, p.id AS product_id, p.name AS product_name, p.product_type, p.image_url, \
           p.price AS unit_price, ci.quantity, c.name AS color_name, c.hex_code AS color_hex, s.name AS size_name \
    FROM cart_items ci \
    JOIN products p ON p.id = ci.product_id \
    LEFT JOIN colors c ON c.id = ci.color_id \
    LEFT JOIN sizes s ON s.id = ci.size_id \
    WHERE ci.cart_id = $1 \
    ORDER BY ci.id";

// Only the lines the order was built from are consumed. Anything added to the
// cart after the projection was taken stays behind.
const CONSUME_LINES_SQL: &str = "\
    UPDATE cart_items ci SET quantity = ci.quantity - o.quantity \
    FROM UNNEST($2::BIGINT[], $3::INT[]) AS o(line_id, quantity) \
    WHERE ci.cart_id = $1 AND ci.id = o.line_id AND ci.quantity > o.quantity";

const DROP_CONSUMED_LINES_SQL: &str = "\
    DELETE FROM cart_items ci \
    USING UNNEST($2::BIGINT[], $3::INT[]) AS o(line_id, quantity) \
    WHERE ci.cart_id = $1 AND ci.id = o.line_id AND ci.quantity <= o.quantity";

const ADD_LINE_SQL: &str = "\
    INSERT INTO cart_items (cart_id, product_id, quantity, color_id, size_id) \
    VALUES ($1, $2, $3, $4, $5) \
    ON CONFLICT ON CONSTRAINT cart_items_selection_key \
    DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity \
    RETURNING *";

const INSERT_ORDER_SQL: &str = "\
    INSERT INTO orders (order_number, order_date, subtotal, shipping_cost, total, status, \
                        email, phone, first_name, last_name, country, state_region, address, city, postal_code) \
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
    RETURNING id";

const INSERT_ORDER_ITEM_SQL: &str = "\
    INSERT INTO order_items (order_id, product_id, quantity, unit_price, color_name, size_name) \
    VALUES ($1, $2, $3, $4, $5, $6) \
    RETURNING id";

const ORDER_ITEMS_SQL: &str = "\
    SELECT oi.id, oi.order_id, oi.product_id, p.name AS product_name, oi.quantity, oi.unit_price, \
           oi.color_name, oi.size_name \
    FROM order_items oi \
    LEFT JOIN products p ON p.id = oi.product_id \
    WHERE oi.order_id = $1 \
    ORDER BY oi.id";

/// Tables whose identity sequences must move past explicitly seeded ids.
const SEEDED_TABLES: [&str; 5] = ["sizes", "colors", "categories", "collections", "products"];

#[derive(sqlx::FromRow)]
struct ProductDetailRow {
    #[sqlx(flatten)]
    product: Product,
    category_name: Option<String>,
    collection_name: Option<String>,
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    order_number: OrderNumber,
    order_date: chrono::DateTime<chrono::Utc>,
    subtotal: Money,
    shipping_cost: Money,
    total: Money,
    status: String,
    #[sqlx(flatten)]
    customer: CustomerDetails,
}

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self { Self { pool } }

    /// Applies the bundled migrations.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(format!("migration failed: {e}")))
    }
}

fn like_pattern(term: &str) -> String {
    let escaped = term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{escaped}%")
}

fn duplicate_order_number(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateOrderNumber,
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl CatalogRepository for PgStore {
    async fn find_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT p.* FROM products p WHERE TRUE");
        if let Some(term) = filter.search_term() {
            let pattern = like_pattern(term);
            qb.push(" AND (p.name ILIKE ").push_bind(pattern.clone())
                .push(" OR p.description ILIKE ").push_bind(pattern).push(")");
        }
        if let Some(category_id) = filter.category_id {
            qb.push(" AND p.category_id = ").push_bind(category_id);
        }
        if let Some(collection_id) = filter.collection_id {
            qb.push(" AND p.collection_id = ").push_bind(collection_id);
        }
        if !filter.size_ids.is_empty() {
            qb.push(" AND EXISTS (SELECT 1 FROM product_sizes ps WHERE ps.product_id = p.id AND ps.size_id = ANY(")
                .push_bind(filter.size_ids.clone()).push("))");
        }
        if !filter.color_ids.is_empty() {
            qb.push(" AND EXISTS (SELECT 1 FROM product_colors pc WHERE pc.product_id = p.id AND pc.color_id = ANY(")
                .push_bind(filter.color_ids.clone()).push("))");
        }
        if let Some(min) = filter.min_price {
            qb.push(" AND p.price >= ").push_bind(min);
        }
        if let Some(max) = filter.max_price {
            qb.push(" AND p.price <= ").push_bind(max);
        }
        if filter.in_stock_only {
            qb.push(" AND p.is_available");
        }
        qb.push(match filter.sort_by {
            SortBy::PriceAsc => " ORDER BY p.price ASC, p.id ASC",
            SortBy::PriceDesc => " ORDER BY p.price DESC, p.id ASC",
            SortBy::Newest => " ORDER BY p.created_at DESC, p.id DESC",
        });
        Ok(qb.build_query_as::<Product>().fetch_all(&self.pool).await?)
    }

    async fn product_detail(&self, id: i64) -> StoreResult<Option<ProductDetail>> {
        let row = sqlx::query_as::<_, ProductDetailRow>(
            "SELECT p.*, c.name AS category_name, co.name AS collection_name FROM products p \
             LEFT JOIN categories c ON c.id = p.category_id \
             LEFT JOIN collections co ON co.id = p.collection_id \
             WHERE p.id = $1")
            .bind(id).fetch_optional(&self.pool).await?;
        let Some(row) = row else { return Ok(None) };

        let colors = sqlx::query_as::<_, Color>(
            "SELECT c.* FROM colors c JOIN product_colors pc ON pc.color_id = c.id WHERE pc.product_id = $1 ORDER BY c.id")
            .bind(id).fetch_all(&self.pool).await?;
        let sizes = sqlx::query_as::<_, SizeOption>(
            "SELECT s.id, s.name, s.sort_order, ps.stock FROM sizes s JOIN product_sizes ps ON ps.size_id = s.id \
             WHERE ps.product_id = $1 ORDER BY s.sort_order, s.id")
            .bind(id).fetch_all(&self.pool).await?;

        Ok(Some(ProductDetail {
            product: row.product,
            category_name: row.category_name,
            collection_name: row.collection_name,
            colors,
            sizes,
        }))
    }

    async fn facets(&self) -> StoreResult<CatalogFacets> {
        Ok(CatalogFacets {
            categories: sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY id").fetch_all(&self.pool).await?,
            colors: sqlx::query_as::<_, Color>("SELECT * FROM colors ORDER BY id").fetch_all(&self.pool).await?,
            sizes: sqlx::query_as::<_, Size>("SELECT * FROM sizes ORDER BY sort_order, id").fetch_all(&self.pool).await?,
            collections: sqlx::query_as::<_, Collection>("SELECT * FROM collections WHERE is_active ORDER BY id")
                .fetch_all(&self.pool).await?,
        })
    }

    async fn highlighted(&self, highlight: Highlight, limit: i64) -> StoreResult<Vec<Product>> {
        let condition = match highlight {
            Highlight::Featured => "is_featured",
            Highlight::NewThisWeek => "is_new_this_week",
            Highlight::InCollection => "collection_id IS NOT NULL",
        };
        let sql = format!("SELECT * FROM products WHERE is_available AND {condition} ORDER BY id LIMIT $1");
        Ok(sqlx::query_as::<_, Product>(&sql).bind(limit).fetch_all(&self.pool).await?)
    }

    async fn current_collection(&self) -> StoreResult<Option<Collection>> {
        Ok(sqlx::query_as::<_, Collection>("SELECT * FROM collections WHERE is_active ORDER BY id LIMIT 1")
            .fetch_optional(&self.pool).await?)
    }

    async fn is_catalog_empty(&self) -> StoreResult<bool> {
        Ok(sqlx::query_scalar::<_, bool>("SELECT NOT EXISTS (SELECT 1 FROM products)").fetch_one(&self.pool).await?)
    }

    async fn seed_catalog(&self, seed: &CatalogSeed) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        QueryBuilder::<Postgres>::new("INSERT INTO sizes (id, name, sort_order) ")
            .push_values(&seed.sizes, |mut b, s| { b.push_bind(s.id).push_bind(&s.name).push_bind(s.sort_order); })
            .build().execute(&mut *tx).await?;
        QueryBuilder::<Postgres>::new("INSERT INTO colors (id, name, hex_code) ")
            .push_values(&seed.colors, |mut b, c| { b.push_bind(c.id).push_bind(&c.name).push_bind(&c.hex_code); })
            .build().execute(&mut *tx).await?;
        QueryBuilder::<Postgres>::new("INSERT INTO categories (id, name, description) ")
            .push_values(&seed.categories, |mut b, c| { b.push_bind(c.id).push_bind(&c.name).push_bind(&c.description); })
            .build().execute(&mut *tx).await?;
        QueryBuilder::<Postgres>::new("INSERT INTO collections (id, name, description, season, year, is_active) ")
            .push_values(&seed.collections, |mut b, c| {
                b.push_bind(c.id).push_bind(&c.name).push_bind(&c.description)
                    .push_bind(&c.season).push_bind(&c.year).push_bind(c.is_active);
            })
            .build().execute(&mut *tx).await?;
        QueryBuilder::<Postgres>::new(
            "INSERT INTO products (id, name, description, price, image_url, product_type, is_available, \
             is_featured, is_new_this_week, category_id, collection_id, created_at) ")
            .push_values(&seed.products, |mut b, p| {
                b.push_bind(p.id).push_bind(&p.name).push_bind(&p.description).push_bind(p.price)
                    .push_bind(&p.image_url).push_bind(&p.product_type).push_bind(p.is_available)
                    .push_bind(p.is_featured).push_bind(p.is_new_this_week).push_bind(p.category_id)
                    .push_bind(p.collection_id).push_bind(p.created_at);
            })
            .build().execute(&mut *tx).await?;
        QueryBuilder::<Postgres>::new("INSERT INTO product_colors (product_id, color_id) ")
            .push_values(&seed.product_colors, |mut b, pc| { b.push_bind(pc.product_id).push_bind(pc.color_id); })
            .build().execute(&mut *tx).await?;
        QueryBuilder::<Postgres>::new("INSERT INTO product_sizes (product_id, size_id, stock) ")
            .push_values(&seed.product_sizes, |mut b, ps| { b.push_bind(ps.product_id).push_bind(ps.size_id).push_bind(ps.stock); })
            .build().execute(&mut *tx).await?;

        for table in SEEDED_TABLES {
            let sql = format!("SELECT setval(pg_get_serial_sequence('{table}', 'id'), (SELECT MAX(id) FROM {table}))");
            sqlx::query(&sql).execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl CartRepository for PgStore {
    async fn cart_lines(&self, cart: &CartId) -> StoreResult<Vec<CartLineDetails>> {
        Ok(sqlx::query_as::<_, CartLineDetails>(CART_LINES_SQL)
            .bind(cart.as_str()).fetch_all(&self.pool).await?)
    }

    async fn add_line(&self, cart: &CartId, line: &NewCartLine) -> StoreResult<CartLine> {
        Ok(sqlx::query_as::<_, CartLine>(ADD_LINE_SQL)
            .bind(cart.as_str()).bind(line.product_id).bind(line.quantity).bind(line.color_id).bind(line.size_id)
            .fetch_one(&self.pool).await?)
    }

    async fn set_line_quantity(&self, cart: &CartId, line_id: i64, quantity: i32) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE cart_items SET quantity = $3 WHERE id = $2 AND cart_id = $1")
            .bind(cart.as_str()).bind(line_id).bind(quantity).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_line(&self, cart: &CartId, line_id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $2 AND cart_id = $1")
            .bind(cart.as_str()).bind(line_id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear_cart(&self, cart: &CartId) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart.as_str()).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn item_count(&self, cart: &CartId) -> StoreResult<i64> {
        Ok(sqlx::query_scalar::<_, i64>("SELECT COALESCE(SUM(quantity), 0)::BIGINT FROM cart_items WHERE cart_id = $1")
            .bind(cart.as_str()).fetch_one(&self.pool).await?)
    }
}

#[async_trait]
impl OrderRepository for PgStore {
    async fn place_order(&self, cart: &CartId, order: NewOrder) -> StoreResult<Order> {
        // Dropping `tx` on any early return rolls everything back.
        let mut tx = self.pool.begin().await?;

        let customer = &order.customer;
        let order_id: i64 = sqlx::query_scalar(INSERT_ORDER_SQL)
            .bind(&order.order_number).bind(order.order_date)
            .bind(order.subtotal).bind(order.shipping_cost).bind(order.total).bind(order.status.as_str())
            .bind(&customer.email).bind(&customer.phone).bind(&customer.first_name).bind(&customer.last_name)
            .bind(&customer.country).bind(&customer.state_region).bind(&customer.address)
            .bind(&customer.city).bind(&customer.postal_code)
            .fetch_one(&mut *tx)
            .await
            .map_err(duplicate_order_number)?;

        let mut item_ids = Vec::with_capacity(order.items.len());
        for item in &order.items {
            let item_id: i64 = sqlx::query_scalar(INSERT_ORDER_ITEM_SQL)
                .bind(order_id).bind(item.product_id).bind(item.quantity).bind(item.unit_price)
                .bind(&item.color_name).bind(&item.size_name)
                .fetch_one(&mut *tx)
                .await?;
            item_ids.push(item_id);
        }

        let line_ids: Vec<i64> = order.items.iter().map(|i| i.line_id).collect();
        let quantities: Vec<i32> = order.items.iter().map(|i| i.quantity).collect();
        // Delete first: the update would otherwise shrink lines below the delete threshold.
        for sql in [DROP_CONSUMED_LINES_SQL, CONSUME_LINES_SQL] {
            sqlx::query(sql).bind(cart.as_str()).bind(&line_ids).bind(&quantities).execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(order.into_order(order_id, item_ids))
    }

    async fn find_order(&self, id: i64) -> StoreResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE id = $1")
            .bind(id).fetch_optional(&self.pool).await?;
        let Some(row) = row else { return Ok(None) };

        let items = sqlx::query_as::<_, OrderItem>(ORDER_ITEMS_SQL).bind(id).fetch_all(&self.pool).await?;
        let status = row.status.parse::<OrderStatus>().map_err(|e| StoreError::Storage(format!("order {id}: {e}")))?;

        Ok(Some(Order {
            id: row.id,
            order_number: row.order_number,
            order_date: row.order_date,
            subtotal: row.subtotal,
            shipping_cost: row.shipping_cost,
            total: row.total,
            status,
            customer: row.customer,
            items,
        }))
    }
}
