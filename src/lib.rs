//! Elegant Vogue storefront
//!
//! Catalog browsing, anonymous session carts and checkout over PostgreSQL
//! (or an in-memory store when no database is configured).
//!
//! ## Features
//! - Filtered, sorted product listings and product detail
//! - Carts keyed by an opaque per-browser token, merging identical selections
//! - Atomic checkout that snapshots the cart into an order and empties it
//! - `OrderPlaced` events on NATS

pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod publisher;
pub mod seed;
pub mod services;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use error::{FieldErrors, Result, StorefrontError};
pub use http::{router, AppState};
