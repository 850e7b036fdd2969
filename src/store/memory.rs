//! In-process store.
//!
//! All state sits behind one `RwLock`, so every write (including checkout) is
//! serialised and applied whole or not at all.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{CartRepository, CatalogRepository, OrderRepository, StoreError, StoreResult};
use crate::domain::aggregates::{
    CartLine, CartLineDetails, CatalogFacets, Category, Collection, Color, Highlight, NewCartLine, NewOrder, Order,
    Product, ProductColor, ProductDetail, ProductFilter, ProductSize, Size, SizeOption,
};
use crate::domain::value_objects::CartId;
use crate::seed::CatalogSeed;

#[derive(Debug, Default)]
struct State {
    categories: Vec<Category>,
    collections: Vec<Collection>,
    colors: Vec<Color>,
    sizes: Vec<Size>,
    products: Vec<Product>,
    product_colors: Vec<ProductColor>,
    product_sizes: Vec<ProductSize>,
    cart_lines: Vec<CartLine>,
    orders: Vec<Order>,
    next_line_id: i64,
    next_order_id: i64,
    next_order_item_id: i64,
}

impl State {
    fn product(&self, id: i64) -> Option<&Product> { self.products.iter().find(|p| p.id == id) }

    fn color_ids_of(&self, product_id: i64) -> Vec<i64> {
        self.product_colors.iter().filter(|pc| pc.product_id == product_id).map(|pc| pc.color_id).collect()
    }

    fn size_ids_of(&self, product_id: i64) -> Vec<i64> {
        self.product_sizes.iter().filter(|ps| ps.product_id == product_id).map(|ps| ps.size_id).collect()
    }

    fn owned_line_mut(&mut self, cart: &CartId, line_id: i64) -> Option<&mut CartLine> {
        self.cart_lines.iter_mut().find(|l| l.id == line_id && l.cart_id == cart.as_str())
    }

    fn load(&mut self, seed: &CatalogSeed) {
        self.categories.extend(seed.categories.iter().cloned());
        self.collections.extend(seed.collections.iter().cloned());
        self.colors.extend(seed.colors.iter().cloned());
        self.sizes.extend(seed.sizes.iter().cloned());
        self.products.extend(seed.products.iter().cloned());
        self.product_colors.extend(seed.product_colors.iter().cloned());
        self.product_sizes.extend(seed.product_sizes.iter().cloned());
    }

    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }
}

/// Test hooks for failure paths the real database would produce.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct Faults {
    pub(crate) fail_order_items: std::sync::atomic::AtomicBool,
    pub(crate) duplicate_order_numbers: std::sync::atomic::AtomicUsize,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
    #[cfg(test)]
    pub(crate) faults: Faults,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    /// A store pre-loaded with `seed`.
    pub fn with_catalog(seed: &CatalogSeed) -> Self {
        let mut state = State::default();
        state.load(seed);
        Self { state: RwLock::new(state), ..Self::default() }
    }

    #[cfg(test)]
    fn injected_fault(&self) -> StoreResult<()> {
        use std::sync::atomic::Ordering;
        let dup = self.faults.duplicate_order_numbers.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if dup.is_ok() { return Err(StoreError::DuplicateOrderNumber); }
        if self.faults.fail_order_items.load(Ordering::SeqCst) {
            return Err(StoreError::Storage("order item write failed".into()));
        }
        Ok(())
    }

    #[cfg(not(test))]
    fn injected_fault(&self) -> StoreResult<()> { Ok(()) }
}

#[async_trait]
impl CatalogRepository for MemoryStore {
    async fn find_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>> {
        let state = self.state.read().await;
        let mut products: Vec<Product> = state.products.iter()
            .filter(|p| filter.matches(p, &state.color_ids_of(p.id), &state.size_ids_of(p.id)))
            .cloned()
            .collect();
        filter.sort_by.sort(&mut products);
        Ok(products)
    }

    async fn product_detail(&self, id: i64) -> StoreResult<Option<ProductDetail>> {
        let state = self.state.read().await;
        let Some(product) = state.product(id).cloned() else { return Ok(None) };
        let mut colors: Vec<Color> = state.product_colors.iter()
            .filter(|pc| pc.product_id == id)
            .filter_map(|pc| state.colors.iter().find(|c| c.id == pc.color_id).cloned())
            .collect();
        colors.sort_by_key(|c| c.id);
        let mut sizes: Vec<SizeOption> = state.product_sizes.iter()
            .filter(|ps| ps.product_id == id)
            .filter_map(|ps| state.sizes.iter().find(|s| s.id == ps.size_id).map(|s| SizeOption {
                id: s.id, name: s.name.clone(), sort_order: s.sort_order, stock: ps.stock,
            }))
            .collect();
        sizes.sort_by_key(|s| (s.sort_order, s.id));
        Ok(Some(ProductDetail {
            category_name: state.categories.iter().find(|c| c.id == product.category_id).map(|c| c.name.clone()),
            collection_name: product.collection_id
                .and_then(|cid| state.collections.iter().find(|c| c.id == cid))
                .map(|c| c.name.clone()),
            product,
            colors,
            sizes,
        }))
    }

    async fn facets(&self) -> StoreResult<CatalogFacets> {
        let state = self.state.read().await;
        let mut sizes = state.sizes.clone();
        sizes.sort_by_key(|s| (s.sort_order, s.id));
        Ok(CatalogFacets {
            categories: state.categories.clone(),
            colors: state.colors.clone(),
            sizes,
            collections: state.collections.iter().filter(|c| c.is_active).cloned().collect(),
        })
    }

    async fn highlighted(&self, highlight: Highlight, limit: i64) -> StoreResult<Vec<Product>> {
        let state = self.state.read().await;
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(state.products.iter().filter(|p| highlight.matches(p)).take(limit).cloned().collect())
    }

    async fn current_collection(&self) -> StoreResult<Option<Collection>> {
        Ok(self.state.read().await.collections.iter().find(|c| c.is_active).cloned())
    }

    async fn is_catalog_empty(&self) -> StoreResult<bool> {
        Ok(self.state.read().await.products.is_empty())
    }

    async fn seed_catalog(&self, seed: &CatalogSeed) -> StoreResult<()> {
        self.state.write().await.load(seed);
        Ok(())
    }
}

#[async_trait]
impl CartRepository for MemoryStore {
    async fn cart_lines(&self, cart: &CartId) -> StoreResult<Vec<CartLineDetails>> {
        let state = self.state.read().await;
        let mut lines: Vec<&CartLine> = state.cart_lines.iter().filter(|l| l.cart_id == cart.as_str()).collect();
        lines.sort_by_key(|l| l.id);
        Ok(lines.into_iter().filter_map(|line| {
            let product = state.product(line.product_id)?;
            let color = line.color_id.and_then(|id| state.colors.iter().find(|c| c.id == id));
            let size = line.size_id.and_then(|id| state.sizes.iter().find(|s| s.id == id));
            Some(CartLineDetails {
                line_id: line.id,
                product_id: product.id,
                product_name: product.name.clone(),
                product_type: product.product_type.clone(),
                image_url: product.image_url.clone(),
                unit_price: product.price,
                quantity: line.quantity,
                color_name: color.map(|c| c.name.clone()),
                color_hex: color.map(|c| c.hex_code.clone()),
                size_name: size.map(|s| s.name.clone()),
            })
        }).collect())
    }

    async fn add_line(&self, cart: &CartId, line: &NewCartLine) -> StoreResult<CartLine> {
        let mut state = self.state.write().await;
        if let Some(existing) = state.cart_lines.iter_mut().find(|l| l.cart_id == cart.as_str() && l.same_selection(line)) {
            existing.quantity = existing.quantity.saturating_add(line.quantity);
            return Ok(existing.clone());
        }
        let id = State::next_id(&mut state.next_line_id);
        let created = CartLine {
            id,
            cart_id: cart.as_str().to_string(),
            product_id: line.product_id,
            quantity: line.quantity,
            color_id: line.color_id,
            size_id: line.size_id,
            created_at: Utc::now(),
        };
        state.cart_lines.push(created.clone());
        Ok(created)
    }

    async fn set_line_quantity(&self, cart: &CartId, line_id: i64, quantity: i32) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        Ok(match state.owned_line_mut(cart, line_id) {
            Some(line) => { line.quantity = quantity; true }
            None => false,
        })
    }

    async fn remove_line(&self, cart: &CartId, line_id: i64) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let before = state.cart_lines.len();
        state.cart_lines.retain(|l| !(l.id == line_id && l.cart_id == cart.as_str()));
        Ok(state.cart_lines.len() != before)
    }

    async fn clear_cart(&self, cart: &CartId) -> StoreResult<u64> {
        let mut state = self.state.write().await;
        let before = state.cart_lines.len();
        state.cart_lines.retain(|l| l.cart_id != cart.as_str());
        Ok((before - state.cart_lines.len()) as u64)
    }

    async fn item_count(&self, cart: &CartId) -> StoreResult<i64> {
        let state = self.state.read().await;
        Ok(state.cart_lines.iter().filter(|l| l.cart_id == cart.as_str()).map(|l| i64::from(l.quantity)).sum())
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn place_order(&self, cart: &CartId, order: NewOrder) -> StoreResult<Order> {
        let mut state = self.state.write().await;
        if state.orders.iter().any(|o| o.order_number == order.order_number) {
            return Err(StoreError::DuplicateOrderNumber);
        }
        self.injected_fault()?;

        // Nothing below can fail, so the whole write lands together.
        let order_id = State::next_id(&mut state.next_order_id);
        let item_ids: Vec<i64> = order.items.iter().map(|_| State::next_id(&mut state.next_order_item_id)).collect();
        for item in &order.items {
            if let Some(line) = state.owned_line_mut(cart, item.line_id) {
                line.quantity -= item.quantity;
            }
        }
        state.cart_lines.retain(|l| l.quantity > 0);
        let placed = order.into_order(order_id, item_ids);
        state.orders.push(placed.clone());
        Ok(placed)
    }

    async fn find_order(&self, id: i64) -> StoreResult<Option<Order>> {
        let state = self.state.read().await;
        Ok(state.orders.iter().find(|o| o.id == id).cloned().map(|mut order| {
            for item in &mut order.items {
                item.product_name = state.product(item.product_id).map(|p| p.name.clone());
            }
            order
        }))
    }
}
