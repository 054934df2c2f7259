//! Transient selection state.
//!
//! Everything here is refetchable or re-enterable: it exists to render the
//! current step of the browsing flow and is bounded in both size and age.

use serde::{Deserialize, Serialize};

use crate::domain::catalog::{Branch, BranchSnapshot, Category, CategorySnapshot, Product, ProductSnapshot};
use crate::domain::foundation::{ProductId, Timestamp};

/// One entry of the in-flight product quantity map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityEntry {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Quantities the user is dialing in before adding products to the cart.
///
/// Ordered from least to most recently touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct ProductQuantities(Vec<QuantityEntry>);

impl ProductQuantities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the quantity for a product, if one is in flight.
    pub fn get(&self, product_id: ProductId) -> Option<u32> {
        self.0
            .iter()
            .find(|entry| entry.product_id == product_id)
            .map(|entry| entry.quantity)
    }

    /// Sets a quantity and marks the entry most recent.
    pub fn set(&mut self, product_id: ProductId, quantity: u32) {
        self.0.retain(|entry| entry.product_id != product_id);
        self.0.push(QuantityEntry {
            product_id,
            quantity,
        });
    }

    /// Drops a product's entry.
    pub fn remove(&mut self, product_id: ProductId) -> Option<u32> {
        let position = self.0.iter().position(|entry| entry.product_id == product_id)?;
        Some(self.0.remove(position).quantity)
    }

    /// Keeps only the `limit` most recent entries. Returns how many were dropped.
    pub fn truncate_to_recent(&mut self, limit: usize) -> usize {
        let excess = self.0.len().saturating_sub(limit);
        if excess > 0 {
            self.0.drain(..excess);
        }
        excess
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn entries(&self) -> &[QuantityEntry] {
        &self.0
    }
}

/// Browsing state of the order flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TransientSelection {
    #[serde(default)]
    pub category: Option<CategorySnapshot>,

    #[serde(default)]
    pub product: Option<ProductSnapshot>,

    #[serde(default)]
    pub branch: Option<BranchSnapshot>,

    #[serde(default)]
    pub quantities: ProductQuantities,

    /// Cached catalog listings used to render menus. Refetchable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_branches: Option<Vec<Branch>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_categories: Option<Vec<Category>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_products: Option<Vec<Product>>,

    /// Last time any of the above was written.
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

impl TransientSelection {
    /// Marks the selection as written now.
    pub fn touch(&mut self) {
        self.updated_at = Some(Timestamp::now());
    }

    /// True if any catalog listing is cached.
    pub fn has_cached_listings(&self) -> bool {
        self.cached_branches.is_some()
            || self.cached_categories.is_some()
            || self.cached_products.is_some()
    }

    /// Drops every cached listing.
    pub fn clear_cached_listings(&mut self) {
        self.cached_branches = None;
        self.cached_categories = None;
        self.cached_products = None;
    }

    /// True if nothing is selected or cached.
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.product.is_none()
            && self.branch.is_none()
            && self.quantities.is_empty()
            && !self.has_cached_listings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_moves_entry_to_most_recent() {
        let mut quantities = ProductQuantities::new();
        quantities.set(ProductId(1), 1);
        quantities.set(ProductId(2), 1);
        quantities.set(ProductId(1), 4);

        let ids: Vec<_> = quantities.entries().iter().map(|e| e.product_id.0).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(quantities.get(ProductId(1)), Some(4));
    }

    #[test]
    fn truncate_keeps_most_recent_entries() {
        let mut quantities = ProductQuantities::new();
        for id in 0..30 {
            quantities.set(ProductId(id), 1);
        }

        let dropped = quantities.truncate_to_recent(20);

        assert_eq!(dropped, 10);
        assert_eq!(quantities.len(), 20);
        assert_eq!(quantities.get(ProductId(9)), None);
        assert_eq!(quantities.get(ProductId(10)), Some(1));
        assert_eq!(quantities.get(ProductId(29)), Some(1));
    }

    #[test]
    fn truncate_below_limit_is_noop() {
        let mut quantities = ProductQuantities::new();
        quantities.set(ProductId(1), 2);
        assert_eq!(quantities.truncate_to_recent(20), 0);
        assert_eq!(quantities.len(), 1);
    }

    #[test]
    fn remove_returns_previous_quantity() {
        let mut quantities = ProductQuantities::new();
        quantities.set(ProductId(3), 5);
        assert_eq!(quantities.remove(ProductId(3)), Some(5));
        assert!(quantities.is_empty());
    }

    #[test]
    fn cached_listings_are_not_serialized_when_absent() {
        let json = serde_json::to_value(TransientSelection::default()).unwrap();
        assert!(json.get("cached_categories").is_none());
        assert!(json.get("cached_products").is_none());
    }
}
