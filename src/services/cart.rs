//! Cart manager: every read and write of a cart's lines goes through here.

use std::sync::Arc;
use tracing::{debug, instrument};

use crate::domain::aggregates::{CartProjection, NewCartLine};
use crate::domain::value_objects::{CartId, Money};
use crate::error::{FieldErrors, Result, StorefrontError};
use crate::store::Store;

/// Request to put a product selection into a cart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddItem {
    pub product_id: i64,
    pub quantity: i32,
    pub color_id: Option<i64>,
    pub size_id: Option<i64>,
}

impl AddItem {
    /// One unit of `product_id` with no color or size chosen.
    pub fn one(product_id: i64) -> Self { Self { product_id, quantity: 1, color_id: None, size_id: None } }
}

#[derive(Clone)]
pub struct CartManager {
    store: Arc<dyn Store>,
    shipping: Money,
}

impl CartManager {
    pub fn new(store: Arc<dyn Store>, shipping: Money) -> Self { Self { store, shipping } }

    /// Joins the cart's lines with live catalog data. Never mutates.
    #[instrument(skip(self, cart), fields(cart = %cart))]
    pub async fn get_cart(&self, cart: &CartId) -> Result<CartProjection> {
        let lines = self.store.cart_lines(cart).await?;
        Ok(CartProjection::build(lines, self.shipping))
    }

    /// Adds `item`, merging into an existing line for the same product/color/size.
    ///
    /// A quantity below 1 is rejected rather than treated as a removal.
    #[instrument(skip(self, cart), fields(cart = %cart, product_id = item.product_id))]
    pub async fn add_item(&self, cart: &CartId, item: AddItem) -> Result<()> {
        if item.quantity < 1 {
            return Err(StorefrontError::Validation(FieldErrors::single("quantity", "Quantity must be at least 1")));
        }
        let product = self.store.product_detail(item.product_id).await?.ok_or(StorefrontError::NotFound("Product"))?;
        let mut errors = FieldErrors::default();
        if item.color_id.is_some_and(|id| !product.offers_color(id)) {
            errors.add("color_id", "Color is not available for this product");
        }
        if item.size_id.is_some_and(|id| !product.offers_size(id)) {
            errors.add("size_id", "Size is not available for this product");
        }
        if !errors.is_empty() {
            return Err(StorefrontError::Validation(errors));
        }

        let line = self.store.add_line(cart, &NewCartLine {
            product_id: item.product_id,
            quantity: item.quantity,
            color_id: item.color_id,
            size_id: item.size_id,
        }).await?;
        debug!(line_id = line.id, quantity = line.quantity, "cart line stored");
        Ok(())
    }

    /// Sets a line's quantity; zero or less removes it. Lines of other carts are silently ignored.
    #[instrument(skip(self, cart), fields(cart = %cart))]
    pub async fn update_quantity(&self, cart: &CartId, line_id: i64, quantity: i32) -> Result<()> {
        let touched = if quantity <= 0 {
            self.store.remove_line(cart, line_id).await?
        } else {
            self.store.set_line_quantity(cart, line_id, quantity).await?
        };
        if !touched { debug!(line_id, "no such line in cart"); }
        Ok(())
    }

    /// Removes a line if `cart` owns it; otherwise a no-op.
    #[instrument(skip(self, cart), fields(cart = %cart))]
    pub async fn remove_item(&self, cart: &CartId, line_id: i64) -> Result<()> {
        if !self.store.remove_line(cart, line_id).await? { debug!(line_id, "no such line in cart"); }
        Ok(())
    }

    #[instrument(skip(self, cart), fields(cart = %cart))]
    pub async fn clear(&self, cart: &CartId) -> Result<()> {
        let removed = self.store.clear_cart(cart).await?;
        debug!(removed, "cart cleared");
        Ok(())
    }

    /// Badge count: total units across the cart's lines.
    pub async fn item_count(&self, cart: &CartId) -> Result<i64> {
        Ok(self.store.item_count(cart).await?)
    }
}
