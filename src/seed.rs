//! Demo catalog inserted into an empty store.

use chrono::{DateTime, Duration, Utc};

use crate::domain::aggregates::{Category, Collection, Color, Product, ProductColor, ProductSize, Size};
use crate::domain::value_objects::Money;

/// A full catalog with explicit ids, written in one go by [`crate::store::CatalogRepository::seed_catalog`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CatalogSeed {
    pub sizes: Vec<Size>,
    pub colors: Vec<Color>,
    pub categories: Vec<Category>,
    pub collections: Vec<Collection>,
    pub products: Vec<Product>,
    pub product_colors: Vec<ProductColor>,
    pub product_sizes: Vec<ProductSize>,
}

const SIZES: [&str; 6] = ["XS", "S", "M", "L", "XL", "2X"];

const COLORS: [(&str, &str); 9] = [
    ("Black", "#000000"),
    ("White", "#FFFFFF"),
    ("Gray", "#808080"),
    ("Cream", "#F5F5DC"),
    ("Navy", "#000080"),
    ("Mint", "#98FF98"),
    ("Lavender", "#E6E6FA"),
    ("Olive", "#808000"),
    ("Camo", "#78866B"),
];

struct ProductRow {
    name: &'static str,
    description: &'static str,
    cents: i64,
    image: &'static str,
    product_type: &'static str,
    collection_id: i64,
    featured: bool,
    new_this_week: bool,
}

const PRODUCTS: [ProductRow; 9] = [
    ProductRow { name: "Abstract Print Shirt", description: "Relaxed-fit shirt. Camp collar and short sleeves. Button-up front.", cents: 9900, image: "/images/products/tshirt-black-abstract.jpg", product_type: "Cotton T-Shirt", collection_id: 1, featured: true, new_this_week: true },
    ProductRow { name: "Basic Slim Fit T-Shirt", description: "Essential slim fit t-shirt in premium cotton.", cents: 19900, image: "/images/products/tshirt-cream-basic.jpg", product_type: "Cotton T-Shirt", collection_id: 1, featured: true, new_this_week: true },
    ProductRow { name: "Basic Heavy Weight T-Shirt", description: "Premium heavyweight cotton t-shirt with relaxed fit.", cents: 19900, image: "/images/products/tshirt-black-heavy.jpg", product_type: "Crewneck T-Shirt", collection_id: 2, featured: true, new_this_week: false },
    ProductRow { name: "Full Sleeve Zipper", description: "Stylish full sleeve shirt with zipper detail.", cents: 19900, image: "/images/products/shirt-pattern.jpg", product_type: "Cotton T-Shirt", collection_id: 2, featured: false, new_this_week: true },
    ProductRow { name: "Embroidered Seersucker Shirt", description: "V-neck t-shirt with embroidered details.", cents: 9900, image: "/images/products/tshirt-wave.jpg", product_type: "V Neck T-Shirt", collection_id: 1, featured: false, new_this_week: true },
    ProductRow { name: "Base Slim Fit T-Shirt", description: "Classic slim fit cotton t-shirt.", cents: 9900, image: "/images/products/tshirt-ink.jpg", product_type: "Cotton T-Shirt", collection_id: 1, featured: false, new_this_week: true },
    ProductRow { name: "Blurred Print T-Shirt", description: "Henley t-shirt with unique blurred print design.", cents: 9900, image: "/images/products/tshirt-henley.jpg", product_type: "Henley T-Shirt", collection_id: 1, featured: false, new_this_week: true },
    ProductRow { name: "Soft Wash Straight Fit Jeans", description: "Comfortable straight fit jeans with soft wash finish.", cents: 19900, image: "/images/products/jeans-white.jpg", product_type: "Cotton Jeans", collection_id: 2, featured: true, new_this_week: false },
    ProductRow { name: "Basic Heavy Weight T-Shirt Camo", description: "Premium heavyweight cotton t-shirt in camo pattern.", cents: 19900, image: "/images/products/tshirt-camo.jpg", product_type: "Cotton T-Shirt", collection_id: 2, featured: true, new_this_week: false },
];

const STOCK_PER_SIZE: i32 = 10;

impl CatalogSeed {
    /// The storefront's demo catalog. Later products are newer, one minute apart, ending at `now`.
    pub fn demo(now: DateTime<Utc>) -> Self {
        let sizes = SIZES.iter().zip(1..).map(|(name, id)| Size { id, name: name.to_string(), sort_order: id as i32 }).collect();
        let colors = COLORS.iter().zip(1..).map(|((name, hex), id)| Color { id, name: name.to_string(), hex_code: hex.to_string() }).collect();
        let categories = [("Men", "Men's clothing"), ("Women", "Women's clothing"), ("Kid", "Kids clothing")]
            .iter()
            .zip(1..)
            .map(|((name, description), id)| Category { id, name: name.to_string(), description: Some(description.to_string()) })
            .collect();
        let collections = vec![
            Collection { id: 1, name: "Summer 2024".into(), description: Some("New Collection Summer 2024".into()), season: Some("Summer".into()), year: Some("2024".into()), is_active: true },
            Collection { id: 2, name: "XIV Collections 23-24".into(), description: Some("XIV Collections 2023-2024".into()), season: Some("All".into()), year: Some("2023-2024".into()), is_active: true },
        ];

        let count = PRODUCTS.len() as i64;
        let products: Vec<Product> = PRODUCTS.iter().zip(1..).map(|(row, id)| Product {
            id,
            name: row.name.to_string(),
            description: Some(row.description.to_string()),
            price: Money::from_cents(row.cents),
            image_url: Some(row.image.to_string()),
            product_type: Some(row.product_type.to_string()),
            is_available: true,
            is_featured: row.featured,
            is_new_this_week: row.new_this_week,
            category_id: 1,
            collection_id: Some(row.collection_id),
            created_at: now - Duration::minutes(count - id),
        }).collect();

        let mut product_colors = Vec::new();
        for (product_id, color_ids) in [(1, vec![1, 3, 6, 2, 7]), (2, vec![4, 1, 2])] {
            product_colors.extend(color_ids.into_iter().map(|color_id| ProductColor { product_id, color_id }));
        }
        for product_id in 3..=count {
            product_colors.extend([1, 2].map(|color_id| ProductColor { product_id, color_id }));
        }

        let product_sizes = products.iter()
            .flat_map(|p| (1..=SIZES.len() as i64).map(move |size_id| ProductSize { product_id: p.id, size_id, stock: STOCK_PER_SIZE }))
            .collect();

        Self { sizes, colors, categories, collections, products, product_colors, product_sizes }
    }
}
