//! Read-only catalog queries backing the listing, detail and home pages.

use std::sync::Arc;
use tracing::instrument;

use crate::domain::aggregates::{Highlight, HomeListing, ProductDetail, ProductFilter, ProductListing};
use crate::error::Result;
use crate::seed::CatalogSeed;
use crate::store::Store;

const FEATURED_ON_HOME: i64 = 4;
const NEW_ON_HOME: i64 = 4;
const COLLECTION_ON_HOME: i64 = 6;

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn Store>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn Store>) -> Self { Self { store } }

    #[instrument(skip(self))]
    pub async fn list_products(&self, filter: ProductFilter) -> Result<ProductListing> {
        let products = self.store.find_products(&filter).await?;
        let facets = self.store.facets().await?;
        Ok(ProductListing::new(products, facets, filter))
    }

    pub async fn product_detail(&self, id: i64) -> Result<Option<ProductDetail>> {
        Ok(self.store.product_detail(id).await?)
    }

    pub async fn home(&self) -> Result<HomeListing> {
        Ok(HomeListing {
            featured: self.store.highlighted(Highlight::Featured, FEATURED_ON_HOME).await?,
            new_this_week: self.store.highlighted(Highlight::NewThisWeek, NEW_ON_HOME).await?,
            collection_products: self.store.highlighted(Highlight::InCollection, COLLECTION_ON_HOME).await?,
            current_collection: self.store.current_collection().await?,
        })
    }

    /// Loads `seed` unless the catalog already has products. Returns whether it seeded.
    pub async fn seed_if_empty(&self, seed: &CatalogSeed) -> Result<bool> {
        if !self.store.is_catalog_empty().await? {
            return Ok(false);
        }
        self.store.seed_catalog(seed).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::SortBy;
    use crate::domain::value_objects::Money;
    use crate::store::MemoryStore;
    use chrono::Utc;

    fn service() -> CatalogService {
        CatalogService::new(Arc::new(MemoryStore::with_catalog(&CatalogSeed::demo(Utc::now()))))
    }

    fn ids(listing: &ProductListing) -> Vec<i64> { listing.products.iter().map(|p| p.id).collect() }

    #[tokio::test]
    async fn test_default_listing_is_newest_first_with_facets() {
        let listing = service().list_products(ProductFilter::default()).await.unwrap();
        assert_eq!(ids(&listing), (1..=9).rev().collect::<Vec<_>>());
        assert_eq!(listing.total_products, 9);
        assert_eq!(listing.available_count, 9);
        assert_eq!(listing.facets.sizes.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(), ["XS", "S", "M", "L", "XL", "2X"]);
        assert_eq!(listing.facets.colors.len(), 9);
        assert_eq!(listing.facets.collections.len(), 2);
    }

    #[tokio::test]
    async fn test_search_price_and_sort_combine() {
        let filter = ProductFilter {
            search: Some("  t-shirt ".into()),
            max_price: Some(Money::from_cents(9900)),
            sort_by: SortBy::PriceAsc,
            ..Default::default()
        };
        let listing = service().list_products(filter).await.unwrap();
        assert!(!listing.products.is_empty());
        assert!(listing.products.iter().all(|p| p.price <= Money::from_cents(9900)));
        assert!(listing.products.windows(2).all(|w| w[0].price <= w[1].price));
        assert_eq!(listing.filter.sort_by, SortBy::PriceAsc);
    }

    #[tokio::test]
    async fn test_color_filter_uses_product_options() {
        // only product 1 comes in mint
        let filter = ProductFilter { color_ids: vec![6], ..Default::default() };
        assert_eq!(ids(&service().list_products(filter).await.unwrap()), vec![1]);
    }

    #[tokio::test]
    async fn test_collection_filter() {
        let filter = ProductFilter { collection_id: Some(2), sort_by: SortBy::PriceDesc, ..Default::default() };
        assert_eq!(ids(&service().list_products(filter).await.unwrap()), vec![3, 4, 8, 9]);
    }

    #[tokio::test]
    async fn test_missing_product_detail_is_none() {
        assert!(service().product_detail(404).await.unwrap().is_none());
        let detail = service().product_detail(1).await.unwrap().unwrap();
        assert_eq!(detail.colors.len(), 5);
        assert_eq!(detail.sizes.len(), 6);
    }

    #[tokio::test]
    async fn test_home_shelves() {
        let home = service().home().await.unwrap();
        assert_eq!(home.featured.len(), 4);
        assert!(home.featured.iter().all(|p| p.is_featured));
        assert_eq!(home.new_this_week.len(), 4);
        assert!(home.new_this_week.iter().all(|p| p.is_new_this_week));
        assert_eq!(home.collection_products.len(), 6);
        assert_eq!(home.current_collection.map(|c| c.name), Some("Summer 2024".to_string()));
    }

    #[tokio::test]
    async fn test_seed_only_when_empty() {
        let service = CatalogService::new(Arc::new(MemoryStore::new()));
        let seed = CatalogSeed::demo(Utc::now());
        assert!(service.seed_if_empty(&seed).await.unwrap());
        assert!(!service.seed_if_empty(&seed).await.unwrap());
        assert_eq!(service.list_products(ProductFilter::default()).await.unwrap().total_products, 9);
    }
}
