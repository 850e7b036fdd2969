use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::aggregates::CartProjection;
use crate::error::Result;
use crate::http::{AppState, CartSession, WithCartCookie};
use crate::services::AddItem;

fn one() -> i32 { 1 }

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: i64,
    #[serde(default = "one")]
    pub quantity: i32,
    pub color_id: Option<i64>,
    pub size_id: Option<i64>,
}

impl From<AddItemRequest> for AddItem {
    fn from(r: AddItemRequest) -> Self {
        Self { product_id: r.product_id, quantity: r.quantity, color_id: r.color_id, size_id: r.size_id }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest { pub quantity: i32 }

type CartResponse = WithCartCookie<Result<Json<CartProjection>>>;

pub async fn get_cart(State(s): State<AppState>, session: CartSession) -> CartResponse {
    let cart = s.carts.get_cart(&session.cart).await.map(Json);
    session.respond(cart)
}

pub async fn item_count(State(s): State<AppState>, session: CartSession) -> WithCartCookie<Result<Json<Value>>> {
    let count = s.carts.item_count(&session.cart).await.map(|count| Json(json!({ "count": count })));
    session.respond(count)
}

pub async fn add_item(State(s): State<AppState>, session: CartSession, Json(r): Json<AddItemRequest>) -> CartResponse {
    let result = match s.carts.add_item(&session.cart, r.into()).await {
        Ok(()) => s.carts.get_cart(&session.cart).await.map(Json),
        Err(e) => Err(e),
    };
    session.respond(result)
}

pub async fn update_item(
    State(s): State<AppState>,
    session: CartSession,
    Path(line_id): Path<i64>,
    Json(r): Json<UpdateQuantityRequest>,
) -> CartResponse {
    let result = match s.carts.update_quantity(&session.cart, line_id, r.quantity).await {
        Ok(()) => s.carts.get_cart(&session.cart).await.map(Json),
        Err(e) => Err(e),
    };
    session.respond(result)
}

pub async fn remove_item(State(s): State<AppState>, session: CartSession, Path(line_id): Path<i64>) -> CartResponse {
    let result = match s.carts.remove_item(&session.cart, line_id).await {
        Ok(()) => s.carts.get_cart(&session.cart).await.map(Json),
        Err(e) => Err(e),
    };
    session.respond(result)
}

pub async fn clear_cart(State(s): State<AppState>, session: CartSession) -> WithCartCookie<Result<StatusCode>> {
    let result = s.carts.clear(&session.cart).await.map(|()| StatusCode::NO_CONTENT);
    session.respond(result)
}
