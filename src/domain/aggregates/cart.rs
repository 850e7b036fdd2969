//! Cart lines and the cart projection

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::domain::value_objects::Money;

/// A stored cart row. `quantity` is always at least 1.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CartLine {
    pub id: i64,
    pub cart_id: String,
    pub product_id: i64,
    pub quantity: i32,
    pub color_id: Option<i64>,
    pub size_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl CartLine {
    /// Lines merge on `(cart, product, color, size)`.
    pub fn same_selection(&self, line: &NewCartLine) -> bool {
        self.product_id == line.product_id && self.color_id == line.color_id && self.size_id == line.size_id
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCartLine {
    pub product_id: i64,
    pub quantity: i32,
    pub color_id: Option<i64>,
    pub size_id: Option<i64>,
}

/// A cart line joined with live product, color and size data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CartLineDetails {
    pub line_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub product_type: Option<String>,
    pub image_url: Option<String>,
    pub unit_price: Money,
    pub quantity: i32,
    pub color_name: Option<String>,
    pub color_hex: Option<String>,
    pub size_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartLineView {
    #[serde(flatten)]
    pub details: CartLineDetails,
    pub line_total: Money,
}

/// Derived view of a cart. Recomputed on every read, never stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartProjection {
    pub items: Vec<CartLineView>,
    pub item_count: i64,
    pub subtotal: Money,
    pub shipping: Money,
    pub total: Money,
}

impl CartProjection {
    pub fn build(lines: Vec<CartLineDetails>, shipping: Money) -> Self {
        let items: Vec<CartLineView> = lines
            .into_iter()
            .map(|details| CartLineView { line_total: details.unit_price.multiply(details.quantity), details })
            .collect();
        let subtotal: Money = items.iter().map(|i| i.line_total).sum();
        Self {
            item_count: items.iter().map(|i| i64::from(i.details.quantity)).sum(),
            total: subtotal + shipping,
            items,
            subtotal,
            shipping,
        }
    }

    pub fn is_empty(&self) -> bool { self.items.is_empty() }
}
