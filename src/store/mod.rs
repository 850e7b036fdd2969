//! Persistence seams.
//!
//! Each repository trait covers one table family. [`PgStore`] backs them with
//! PostgreSQL; [`MemoryStore`] keeps everything in process for local runs and tests.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::aggregates::{
    CartLine, CartLineDetails, CatalogFacets, Collection, Highlight, NewCartLine, NewOrder, Order, Product,
    ProductDetail, ProductFilter,
};
use crate::domain::value_objects::CartId;
use crate::seed::CatalogSeed;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Order number already taken")]
    DuplicateOrderNumber,

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Filtered and sorted per `filter`.
    async fn find_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>>;
    async fn product_detail(&self, id: i64) -> StoreResult<Option<ProductDetail>>;
    async fn facets(&self) -> StoreResult<CatalogFacets>;
    /// Available products carrying `highlight`, in insertion order.
    async fn highlighted(&self, highlight: Highlight, limit: i64) -> StoreResult<Vec<Product>>;
    async fn current_collection(&self) -> StoreResult<Option<Collection>>;
    async fn is_catalog_empty(&self) -> StoreResult<bool>;
    async fn seed_catalog(&self, seed: &CatalogSeed) -> StoreResult<()>;
}

/// Every method is scoped to one cart; lines of other carts are invisible.
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Lines joined with live catalog data, oldest first.
    async fn cart_lines(&self, cart: &CartId) -> StoreResult<Vec<CartLineDetails>>;
    /// Inserts, or merges into the line with the same product/color/size.
    async fn add_line(&self, cart: &CartId, line: &NewCartLine) -> StoreResult<CartLine>;
    /// Returns `false` when no line `line_id` exists in `cart`.
    async fn set_line_quantity(&self, cart: &CartId, line_id: i64, quantity: i32) -> StoreResult<bool>;
    async fn remove_line(&self, cart: &CartId, line_id: i64) -> StoreResult<bool>;
    async fn clear_cart(&self, cart: &CartId) -> StoreResult<u64>;
    /// Sum of quantities, without touching catalog tables.
    async fn item_count(&self, cart: &CartId) -> StoreResult<i64>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Writes the order and its items, and consumes the `cart` lines it was built from, as one unit.
    ///
    /// Lines added to the cart after the order was drafted are left in place.
    ///
    /// On any error nothing is applied: no order is retrievable and the cart is intact.
    async fn place_order(&self, cart: &CartId, order: NewOrder) -> StoreResult<Order>;
    async fn find_order(&self, id: i64) -> StoreResult<Option<Order>>;
}

pub trait Store: CatalogRepository + CartRepository + OrderRepository {}

impl<T: CatalogRepository + CartRepository + OrderRepository> Store for T {}
