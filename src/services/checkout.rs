//! Checkout: turns a cart into an immutable order.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::domain::aggregates::{CartProjection, CustomerDetails, NewOrder, Order};
use crate::domain::events::DomainEvent;
use crate::domain::value_objects::{CartId, OrderNumber};
use crate::error::{Result, StorefrontError};
use crate::publisher::EventPublisher;
use crate::services::cart::CartManager;
use crate::store::{Store, StoreError};

/// Fresh order numbers tried before giving up on a run of collisions.
const ORDER_NUMBER_ATTEMPTS: usize = 5;

#[derive(Clone)]
pub struct CheckoutManager {
    store: Arc<dyn Store>,
    carts: CartManager,
    events: EventPublisher,
}

impl CheckoutManager {
    pub fn new(store: Arc<dyn Store>, carts: CartManager, events: EventPublisher) -> Self {
        Self { store, carts, events }
    }

    /// The cart as it would be ordered. Fails with `EmptyCart` when there is nothing to buy.
    pub async fn summary(&self, cart: &CartId) -> Result<CartProjection> {
        let projection = self.carts.get_cart(cart).await?;
        if projection.is_empty() { return Err(StorefrontError::EmptyCart); }
        Ok(projection)
    }

    /// Snapshots the cart into a `Pending` order and empties the cart, atomically.
    ///
    /// On `EmptyCart`, `Validation` or `Persistence` errors no order exists and the cart is untouched.
    #[instrument(skip(self, cart, customer), fields(cart = %cart))]
    pub async fn place_order(&self, cart: &CartId, customer: CustomerDetails) -> Result<Order> {
        let projection = self.summary(cart).await?;
        let customer = customer.normalized();
        customer.validate()?;

        let mut attempt = 0;
        let order = loop {
            attempt += 1;
            let now = Utc::now();
            let draft = NewOrder::from_cart(&projection, customer.clone(), OrderNumber::generate(now), now);
            match self.store.place_order(cart, draft).await {
                Ok(order) => break order,
                Err(StoreError::DuplicateOrderNumber) if attempt < ORDER_NUMBER_ATTEMPTS => {
                    warn!(attempt, "order number collision, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        };

        info!(order_id = order.id, order_number = %order.order_number, total = %order.total, "order placed");
        self.events.publish(&DomainEvent::order_placed(&order)).await;
        Ok(order)
    }

    /// `None` when no such order exists.
    pub async fn get_order_confirmation(&self, order_id: i64) -> Result<Option<Order>> {
        Ok(self.store.find_order(order_id).await?)
    }
}
