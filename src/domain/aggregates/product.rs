//! Catalog records and listing projections

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::domain::value_objects::Money;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub image_url: Option<String>,
    pub product_type: Option<String>,
    pub is_available: bool,
    pub is_featured: bool,
    pub is_new_this_week: bool,
    pub category_id: i64,
    pub collection_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category { pub id: i64, pub name: String, pub description: Option<String> }

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Collection {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub season: Option<String>,
    pub year: Option<String>,
    pub is_active: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Color { pub id: i64, pub name: String, pub hex_code: String }

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Size { pub id: i64, pub name: String, pub sort_order: i32 }

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductColor { pub product_id: i64, pub color_id: i64 }

/// Size option of a product. `stock` is informational and never decremented.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductSize { pub product_id: i64, pub size_id: i64, pub stock: i32 }

/// A size as offered on one product.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SizeOption { pub id: i64, pub name: String, pub sort_order: i32, pub stock: i32 }

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    PriceAsc,
    PriceDesc,
    #[default]
    Newest,
}

impl SortBy {
    /// Unknown values sort newest first.
    pub fn parse(value: &str) -> Self {
        match value {
            "price_asc" => Self::PriceAsc,
            "price_desc" => Self::PriceDesc,
            _ => Self::Newest,
        }
    }

    pub fn sort(&self, products: &mut [Product]) {
        match self {
            Self::PriceAsc => products.sort_by(|a, b| a.price.cmp(&b.price).then(a.id.cmp(&b.id))),
            Self::PriceDesc => products.sort_by(|a, b| b.price.cmp(&a.price).then(a.id.cmp(&b.id))),
            Self::Newest => products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id))),
        }
    }
}

/// Product listing filters. Every set filter must match.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub category_id: Option<i64>,
    pub collection_id: Option<i64>,
    pub size_ids: Vec<i64>,
    pub color_ids: Vec<i64>,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
    pub in_stock_only: bool,
    pub sort_by: SortBy,
}

impl ProductFilter {
    /// Search text with surrounding whitespace removed, `None` when blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// `color_ids` / `size_ids` are the option ids the product carries.
    pub fn matches(&self, product: &Product, color_ids: &[i64], size_ids: &[i64]) -> bool {
        if let Some(term) = self.search_term() {
            let term = term.to_lowercase();
            let in_name = product.name.to_lowercase().contains(&term);
            let in_description = product.description.as_deref().is_some_and(|d| d.to_lowercase().contains(&term));
            if !in_name && !in_description { return false; }
        }
        if self.category_id.is_some_and(|id| id != product.category_id) { return false; }
        if self.collection_id.is_some() && self.collection_id != product.collection_id { return false; }
        if !self.size_ids.is_empty() && !size_ids.iter().any(|id| self.size_ids.contains(id)) { return false; }
        if !self.color_ids.is_empty() && !color_ids.iter().any(|id| self.color_ids.contains(id)) { return false; }
        if self.min_price.is_some_and(|min| product.price < min) { return false; }
        if self.max_price.is_some_and(|max| product.price > max) { return false; }
        if self.in_stock_only && !product.is_available { return false; }
        true
    }
}

/// Option lists used to render filter controls.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogFacets {
    pub categories: Vec<Category>,
    pub colors: Vec<Color>,
    /// Ordered by `sort_order`.
    pub sizes: Vec<Size>,
    /// Active collections only.
    pub collections: Vec<Collection>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductListing {
    pub products: Vec<Product>,
    #[serde(flatten)]
    pub facets: CatalogFacets,
    pub filter: ProductFilter,
    pub total_products: usize,
    pub available_count: usize,
    pub unavailable_count: usize,
}

impl ProductListing {
    pub fn new(products: Vec<Product>, facets: CatalogFacets, filter: ProductFilter) -> Self {
        let available_count = products.iter().filter(|p| p.is_available).count();
        Self {
            total_products: products.len(),
            unavailable_count: products.len() - available_count,
            available_count,
            products,
            facets,
            filter,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductDetail {
    pub product: Product,
    pub category_name: Option<String>,
    pub collection_name: Option<String>,
    pub colors: Vec<Color>,
    /// Ordered by `sort_order`.
    pub sizes: Vec<SizeOption>,
}

impl ProductDetail {
    pub fn offers_color(&self, color_id: i64) -> bool { self.colors.iter().any(|c| c.id == color_id) }
    pub fn offers_size(&self, size_id: i64) -> bool { self.sizes.iter().any(|s| s.id == size_id) }
}

/// Which product flag a home-page shelf is built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Highlight { Featured, NewThisWeek, InCollection }

impl Highlight {
    pub fn matches(&self, product: &Product) -> bool {
        product.is_available && match self {
            Self::Featured => product.is_featured,
            Self::NewThisWeek => product.is_new_this_week,
            Self::InCollection => product.collection_id.is_some(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HomeListing {
    pub featured: Vec<Product>,
    pub new_this_week: Vec<Product>,
    pub collection_products: Vec<Product>,
    pub current_collection: Option<Collection>,
}
