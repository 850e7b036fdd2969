use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

use crate::domain::aggregates::{HomeListing, ProductDetail, ProductFilter, ProductListing, SortBy};
use crate::domain::value_objects::Money;
use crate::error::{Result, StorefrontError};
use crate::http::AppState;

/// Listing query string. Id lists are comma separated; unparseable entries are skipped.
///
/// Filter forms submit untouched inputs as `name=`, so blank scalars mean "no filter".
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub category_id: Option<i64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub collection_id: Option<i64>,
    pub size_ids: Option<String>,
    pub color_ids: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub min_price: Option<Money>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub max_price: Option<Money>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub in_stock_only: Option<bool>,
    pub sort_by: Option<String>,
}

fn blank_as_none<'de, D, T>(de: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match Option::<String>::deserialize(de)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

impl From<ListParams> for ProductFilter {
    fn from(p: ListParams) -> Self {
        Self {
            search: p.search,
            category_id: p.category_id,
            collection_id: p.collection_id,
            size_ids: id_list(p.size_ids.as_deref()),
            color_ids: id_list(p.color_ids.as_deref()),
            min_price: p.min_price,
            max_price: p.max_price,
            in_stock_only: p.in_stock_only.unwrap_or(false),
            sort_by: p.sort_by.as_deref().map(SortBy::parse).unwrap_or_default(),
        }
    }
}

fn id_list(raw: Option<&str>) -> Vec<i64> {
    raw.map(|s| s.split(',').filter_map(|id| id.trim().parse().ok()).collect()).unwrap_or_default()
}

pub async fn home(State(s): State<AppState>) -> Result<Json<HomeListing>> {
    Ok(Json(s.catalog.home().await?))
}

pub async fn list_products(State(s): State<AppState>, Query(p): Query<ListParams>) -> Result<Json<ProductListing>> {
    Ok(Json(s.catalog.list_products(p.into()).await?))
}

pub async fn get_product(State(s): State<AppState>, Path(id): Path<i64>) -> Result<Json<ProductDetail>> {
    s.catalog.product_detail(id).await?.map(Json).ok_or(StorefrontError::NotFound("Product"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_to_filter() {
        let filter: ProductFilter = ListParams {
            size_ids: Some("1, 3,x,".into()),
            color_ids: Some("".into()),
            sort_by: Some("bogus".into()),
            ..Default::default()
        }.into();
        assert_eq!(filter.size_ids, vec![1, 3]);
        assert!(filter.color_ids.is_empty());
        assert_eq!(filter.sort_by, SortBy::Newest);
        assert!(!filter.in_stock_only);
    }

    fn parse(query: &str) -> std::result::Result<ListParams, String> {
        let uri: axum::http::Uri = format!("/api/v1/products?{query}").parse().unwrap();
        Query::<ListParams>::try_from_uri(&uri).map(|Query(p)| p).map_err(|e| e.body_text())
    }

    #[test]
    fn test_blank_filters_are_ignored() {
        let params = parse("search=&category_id=&collection_id=&min_price=&max_price=%20&in_stock_only=&sort_by=").unwrap();
        assert_eq!(params.category_id, None);
        assert_eq!(params.collection_id, None);
        assert_eq!(params.min_price, None);
        assert_eq!(params.max_price, None);
        assert_eq!(params.in_stock_only, None);
        let filter = ProductFilter::from(params);
        assert_eq!(filter.sort_by, SortBy::Newest);
    }

    #[test]
    fn test_filled_filters_parse() {
        let params = parse("category_id=2&min_price=10.50&in_stock_only=true").unwrap();
        assert_eq!(params.category_id, Some(2));
        assert_eq!(params.min_price, Some(Money::from_cents(1050)));
        assert_eq!(params.in_stock_only, Some(true));
        assert_eq!(params.collection_id, None);
    }

    #[test]
    fn test_garbage_number_still_rejected() {
        assert!(parse("category_id=abc").is_err());
    }
}
