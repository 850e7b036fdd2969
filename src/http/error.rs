//! Error → HTTP status mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use super::CART_PATH;
use crate::error::StorefrontError;

impl IntoResponse for StorefrontError {
    fn into_response(self) -> Response {
        match self {
            StorefrontError::NotFound(what) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": format!("{what} not found") }))).into_response()
            }
            StorefrontError::Validation(fields) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "error": "Validation failed", "errors": fields }))).into_response()
            }
            StorefrontError::EmptyCart => Redirect::to(CART_PATH).into_response(),
            StorefrontError::Persistence(detail) => {
                error!(%detail, "storefront request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "Internal server error" }))).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldErrors;
    use axum::http::header::LOCATION;

    #[test]
    fn test_status_mapping() {
        assert_eq!(StorefrontError::NotFound("Order").into_response().status(), StatusCode::NOT_FOUND);
        let invalid = StorefrontError::Validation(FieldErrors::single("email", "Invalid email address"));
        assert_eq!(invalid.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(StorefrontError::Persistence("pool timed out".into()).into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_empty_cart_redirects_to_cart() {
        let response = StorefrontError::EmptyCart.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(LOCATION).unwrap(), CART_PATH);
    }
}
