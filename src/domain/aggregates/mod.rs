//! Aggregates module
pub mod product;
pub mod order;
pub mod cart;

pub use product::{
    CatalogFacets, Category, Collection, Color, Highlight, HomeListing, Product, ProductColor, ProductDetail,
    ProductFilter, ProductListing, ProductSize, Size, SizeOption, SortBy,
};
pub use order::{CustomerDetails, NewOrder, NewOrderItem, Order, OrderItem, OrderStatus};
pub use cart::{CartLine, CartLineDetails, CartLineView, CartProjection, NewCartLine};
