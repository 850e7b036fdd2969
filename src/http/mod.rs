//! JSON HTTP surface.

mod error;
mod handlers;
pub mod session;

use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::publisher::EventPublisher;
use crate::services::{CartManager, CatalogService, CheckoutManager};
use crate::store::Store;

pub use session::{CartSession, WithCartCookie};

/// Where an empty checkout sends the buyer.
pub const CART_PATH: &str = "/api/v1/cart";

#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    pub carts: CartManager,
    pub checkout: CheckoutManager,
    pub cart_cookie: Arc<str>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: &AppConfig, events: EventPublisher) -> Self {
        let carts = CartManager::new(store.clone(), config.shipping_cost);
        Self {
            catalog: CatalogService::new(store.clone()),
            checkout: CheckoutManager::new(store, carts.clone(), events),
            carts,
            cart_cookie: Arc::from(config.cart_cookie.as_str()),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(json!({ "status": "healthy", "service": "elegant-vogue" })) }))
        .route("/api/v1/home", get(handlers::catalog::home))
        .route("/api/v1/products", get(handlers::catalog::list_products))
        .route("/api/v1/products/:id", get(handlers::catalog::get_product))
        .route(CART_PATH, get(handlers::cart::get_cart).delete(handlers::cart::clear_cart))
        .route("/api/v1/cart/count", get(handlers::cart::item_count))
        .route("/api/v1/cart/items", post(handlers::cart::add_item))
        .route("/api/v1/cart/items/:line_id", put(handlers::cart::update_item).delete(handlers::cart::remove_item))
        .route("/api/v1/checkout", get(handlers::checkout::summary).post(handlers::checkout::place_order))
        .route("/api/v1/orders/:id", get(handlers::checkout::get_order))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
