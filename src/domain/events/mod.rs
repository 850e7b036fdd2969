//! Domain events
use serde::Serialize;
use crate::domain::aggregates::Order;
use crate::domain::value_objects::{Money, OrderNumber};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum DomainEvent {
    Order(OrderEvent),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event")]
pub enum OrderEvent {
    Placed { order_id: i64, order_number: OrderNumber, total: Money, item_count: i64 },
}

impl DomainEvent {
    pub fn order_placed(order: &Order) -> Self {
        DomainEvent::Order(OrderEvent::Placed {
            order_id: order.id,
            order_number: order.order_number.clone(),
            total: order.total,
            item_count: order.item_count(),
        })
    }

    pub fn subject(&self) -> &'static str {
        match self {
            DomainEvent::Order(OrderEvent::Placed { .. }) => "storefront.orders.placed",
        }
    }
}
