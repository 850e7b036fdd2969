//! Cart identity at the request boundary.
//!
//! The cart cookie is read here and nowhere else. A missing or malformed
//! cookie gets a fresh token, which is sent back on the response.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use std::convert::Infallible;
use tracing::{debug, warn};
use uuid::Uuid;

use super::AppState;
use crate::domain::value_objects::CartId;

#[derive(Clone, Debug)]
pub struct CartSession {
    pub cart: CartId,
    /// `Set-Cookie` value when the token was issued by this request.
    issued: Option<String>,
}

impl CartSession {
    pub fn is_new(&self) -> bool { self.issued.is_some() }

    /// Wraps a response so a newly issued token reaches the browser.
    pub fn respond<T>(self, body: T) -> WithCartCookie<T> {
        WithCartCookie { set_cookie: self.issued, body }
    }

    fn resolve(headers: &HeaderMap, cookie_name: &str) -> Self {
        if let Some(cart) = presented_token(headers, cookie_name).and_then(|v| CartId::parse(&v)) {
            return Self { cart, issued: None };
        }
        let cart = CartId::new(Uuid::new_v4().to_string());
        debug!(cart = %cart, "issued cart token");
        Self { issued: Some(format!("{cookie_name}={cart}; Path=/; HttpOnly; SameSite=Lax")), cart }
    }
}

fn presented_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.trim().to_string())
}

#[async_trait]
impl FromRequestParts<AppState> for CartSession {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Self::resolve(&parts.headers, &state.cart_cookie))
    }
}

/// A response that also carries the cart cookie when one was just issued.
pub struct WithCartCookie<T> {
    set_cookie: Option<String>,
    body: T,
}

impl<T: IntoResponse> IntoResponse for WithCartCookie<T> {
    fn into_response(self) -> Response {
        let mut response = self.body.into_response();
        if let Some(cookie) = self.set_cookie {
            match HeaderValue::from_str(&cookie) {
                Ok(value) => { response.headers_mut().append(SET_COOKIE, value); }
                Err(e) => warn!(error = %e, "cart cookie not representable as a header"),
            }
        }
        response
    }
}
