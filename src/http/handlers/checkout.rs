use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::domain::aggregates::{CartProjection, CustomerDetails, Order};
use crate::error::{Result, StorefrontError};
use crate::http::{AppState, CartSession, WithCartCookie};

pub async fn summary(State(s): State<AppState>, session: CartSession) -> WithCartCookie<Result<Json<CartProjection>>> {
    let summary = s.checkout.summary(&session.cart).await.map(Json);
    session.respond(summary)
}

/// 201 with the order; an invalid form comes back as 422 with the submitted
/// details and the (untouched) cart so it can be redisplayed.
pub async fn place_order(
    State(s): State<AppState>,
    session: CartSession,
    Json(customer): Json<CustomerDetails>,
) -> WithCartCookie<Response> {
    let response = match s.checkout.place_order(&session.cart, customer.clone()).await {
        Ok(order) => (StatusCode::CREATED, Json(order)).into_response(),
        Err(StorefrontError::Validation(errors)) => match s.carts.get_cart(&session.cart).await {
            Ok(cart) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": "Validation failed", "errors": errors, "form": customer, "cart": cart })),
            ).into_response(),
            Err(e) => e.into_response(),
        },
        Err(e) => e.into_response(),
    };
    session.respond(response)
}

pub async fn get_order(State(s): State<AppState>, Path(id): Path<i64>) -> Result<Json<Order>> {
    s.checkout.get_order_confirmation(id).await?.map(Json).ok_or(StorefrontError::NotFound("Order"))
}
