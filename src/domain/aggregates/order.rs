//! Order Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;
use crate::domain::aggregates::cart::CartProjection;
use crate::domain::value_objects::{Money, OrderNumber};

/// Orders are created `Pending` and never change status here.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    Pending,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOrderStatus(pub String);
impl std::error::Error for UnknownOrderStatus {}
impl fmt::Display for UnknownOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "unknown order status {:?}", self.0) }
}

impl FromStr for OrderStatus {
    type Err = UnknownOrderStatus;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            other => Err(UnknownOrderStatus(other.to_string())),
        }
    }
}

/// Contact and delivery details captured at checkout.
///
/// Absent fields deserialize as blank so they surface as validation messages.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Validate, sqlx::FromRow)]
#[serde(default)]
pub struct CustomerDetails {
    #[validate(length(min = 1, message = "Email is required"), email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(length(min = 1, message = "Country is required"))]
    pub country: String,
    pub state_region: Option<String>,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "Postal code is required"))]
    pub postal_code: String,
}

impl CustomerDetails {
    /// Trims every field and drops a blank state/region, so whitespace never passes as a value.
    pub fn normalized(&self) -> Self {
        let trim = |s: &str| s.trim().to_string();
        Self {
            email: trim(&self.email),
            phone: trim(&self.phone),
            first_name: trim(&self.first_name),
            last_name: trim(&self.last_name),
            country: trim(&self.country),
            state_region: self.state_region.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string),
            address: trim(&self.address),
            city: trim(&self.city),
            postal_code: trim(&self.postal_code),
        }
    }
}

/// Snapshot of one purchased line. Names and prices are copied, not referenced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    /// Live product name joined for display; `None` once the product is gone.
    pub product_name: Option<String>,
    pub quantity: i32,
    pub unit_price: Money,
    pub color_name: Option<String>,
    pub size_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_number: OrderNumber,
    pub order_date: DateTime<Utc>,
    pub subtotal: Money,
    pub shipping_cost: Money,
    pub total: Money,
    pub status: OrderStatus,
    #[serde(flatten)]
    pub customer: CustomerDetails,
    pub items: Vec<OrderItem>,
}

impl Order {
    pub fn item_count(&self) -> i64 { self.items.iter().map(|i| i64::from(i.quantity)).sum() }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewOrderItem {
    /// Cart line this item was taken from; only that line is consumed at checkout.
    pub line_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Money,
    pub color_name: Option<String>,
    pub size_name: Option<String>,
}

/// Everything needed to write an order; monetary fields are frozen here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub order_number: OrderNumber,
    pub order_date: DateTime<Utc>,
    pub subtotal: Money,
    pub shipping_cost: Money,
    pub total: Money,
    pub status: OrderStatus,
    pub customer: CustomerDetails,
    pub items: Vec<NewOrderItem>,
}

impl NewOrder {
    pub fn from_cart(cart: &CartProjection, customer: CustomerDetails, order_number: OrderNumber, order_date: DateTime<Utc>) -> Self {
        let items = cart.items.iter().map(|line| NewOrderItem {
            line_id: line.details.line_id,
            product_id: line.details.product_id,
            product_name: line.details.product_name.clone(),
            quantity: line.details.quantity,
            unit_price: line.details.unit_price,
            color_name: line.details.color_name.clone(),
            size_name: line.details.size_name.clone(),
        }).collect();
        Self {
            order_number, order_date,
            subtotal: cart.subtotal, shipping_cost: cart.shipping, total: cart.total,
            status: OrderStatus::Pending, customer, items,
        }
    }

    /// Materialise the aggregate once the store has assigned ids.
    pub fn into_order(self, id: i64, item_ids: impl IntoIterator<Item = i64>) -> Order {
        let items = self.items.into_iter().zip(item_ids).map(|(item, item_id)| OrderItem {
            id: item_id,
            order_id: id,
            product_id: item.product_id,
            product_name: Some(item.product_name),
            quantity: item.quantity,
            unit_price: item.unit_price,
            color_name: item.color_name,
            size_name: item.size_name,
        }).collect();
        Order {
            id, order_number: self.order_number, order_date: self.order_date,
            subtotal: self.subtotal, shipping_cost: self.shipping_cost, total: self.total,
            status: self.status, customer: self.customer, items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::cart::CartLineDetails;

    fn customer() -> CustomerDetails {
        CustomerDetails {
            email: "ada@example.com".into(), phone: "+44 20 7946 0000".into(),
            first_name: "Ada".into(), last_name: "Lovelace".into(), country: "United Kingdom".into(),
            state_region: None, address: "12 St James's Square".into(), city: "London".into(), postal_code: "SW1Y 4JH".into(),
        }
    }

    #[test]
    fn test_customer_validation() {
        assert!(customer().validate().is_ok());
        let bad = CustomerDetails { email: "not-an-email".into(), ..customer() };
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_blank_fields_fail_after_normalizing() {
        let blank = CustomerDetails { city: "   ".into(), state_region: Some(" ".into()), ..customer() }.normalized();
        assert_eq!(blank.state_region, None);
        let errors = blank.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("city"));
    }

    #[test]
    fn test_status_round_trips_through_text() {
        assert_eq!("Pending".parse::<OrderStatus>(), Ok(OrderStatus::Pending));
        assert!("Lost".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_new_order_snapshots_cart() {
        let line = CartLineDetails {
            line_id: 7, product_id: 1, product_name: "Abstract Print Shirt".into(), product_type: None, image_url: None,
            unit_price: Money::from_cents(9900), quantity: 2, color_name: Some("Black".into()), color_hex: None, size_name: Some("M".into()),
        };
        let cart = CartProjection::build(vec![line], Money::from_cents(1000));
        let number = OrderNumber::generate(Utc::now());
        let order = NewOrder::from_cart(&cart, customer(), number.clone(), Utc::now()).into_order(5, [11]);
        assert_eq!(order.order_number, number);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total, Money::from_cents(20800));
        assert_eq!(order.items[0].id, 11);
        assert_eq!(order.items[0].order_id, 5);
        assert_eq!(order.items[0].size_name.as_deref(), Some("M"));
        assert_eq!(order.item_count(), 2);
    }

    #[test]
    fn test_new_order_remembers_source_lines() {
        let line = |line_id| CartLineDetails {
            line_id, product_id: 1, product_name: "Abstract Print Shirt".into(), product_type: None, image_url: None,
            unit_price: Money::from_cents(9900), quantity: 1, color_name: None, color_hex: None, size_name: None,
        };
        let cart = CartProjection::build(vec![line(3), line(8)], Money::from_cents(1000));
        let order = NewOrder::from_cart(&cart, customer(), OrderNumber::generate(Utc::now()), Utc::now());
        assert_eq!(order.items.iter().map(|i| i.line_id).collect::<Vec<_>>(), vec![3, 8]);
    }
}
