//! Storefront domain: catalog records, carts, orders and their value objects.
pub mod aggregates;
pub mod events;
pub mod value_objects;
