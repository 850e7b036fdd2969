//! Application services over the store traits.

pub mod cart;
pub mod catalog;
pub mod checkout;

pub use cart::{AddItem, CartManager};
pub use catalog::CatalogService;
pub use checkout::CheckoutManager;
