//! Cart aggregate.
//!
//! # Invariants
//!
//! - `items` are unique by product id and keep insertion order
//! - every item has `quantity >= 1` and `price >= 0`
//! - `total == Σ price * quantity`, recomputed on every mutation and on load

use serde::{Deserialize, Serialize};

use crate::domain::catalog::ProductSnapshot;
use crate::domain::foundation::{ProductId, Timestamp, ValidationError};

/// Upper bound for a single line's quantity.
pub const MAX_ITEM_QUANTITY: u32 = 999;

/// A line in the cart. Name and price are snapshots taken when the
/// product was first added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub name: String,
    pub price: i64,
    pub quantity: u32,
}

impl CartItem {
    /// Price of the whole line.
    pub fn line_total(&self) -> i64 {
        self.price.saturating_mul(i64::from(self.quantity))
    }
}

/// The user's purchase in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Cart {
    #[serde(default)]
    items: Vec<CartItem>,

    /// Derived; written for readers of the backing file, never trusted on load.
    #[serde(default)]
    total: i64,

    /// Last mutation time. Doubles as the session liveness signal.
    #[serde(default)]
    updated_at: Option<Timestamp>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the items in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Returns the item for a product, if present.
    pub fn item(&self, id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Returns the sum of all line totals.
    pub fn total(&self) -> i64 {
        self.total
    }

    /// Returns true if the cart holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of units across all lines.
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, item| acc.saturating_add(item.quantity))
    }

    /// Returns the number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Returns when the cart was last touched.
    pub fn updated_at(&self) -> Option<&Timestamp> {
        self.updated_at.as_ref()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Adds `quantity` units of a product. Adding an existing product
    /// increases its quantity and keeps the original snapshot.
    ///
    /// # Errors
    ///
    /// - `OutOfRange` if quantity is zero or the price is negative
    pub fn add_item(
        &mut self,
        product: &ProductSnapshot,
        quantity: u32,
    ) -> Result<(), ValidationError> {
        if quantity == 0 {
            return Err(ValidationError::out_of_range(
                "quantity",
                1,
                i64::from(MAX_ITEM_QUANTITY),
                0,
            ));
        }
        if product.price < 0 {
            return Err(ValidationError::out_of_range(
                "price",
                0,
                i64::MAX,
                product.price,
            ));
        }

        match self.items.iter_mut().find(|item| item.id == product.id) {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .saturating_add(quantity)
                    .min(MAX_ITEM_QUANTITY);
            }
            None => self.items.push(CartItem {
                id: product.id,
                name: product.name.clone(),
                price: product.price,
                quantity: quantity.min(MAX_ITEM_QUANTITY),
            }),
        }

        self.changed();
        Ok(())
    }

    /// Removes a product. Returns true if it was present.
    pub fn remove_item(&mut self, id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        let removed = self.items.len() != before;
        if removed {
            self.changed();
        }
        removed
    }

    /// Sets the quantity of a line. Zero or negative removes the line.
    ///
    /// Returns true if the product was in the cart.
    ///
    /// # Errors
    ///
    /// - `OutOfRange` if quantity exceeds [`MAX_ITEM_QUANTITY`]
    pub fn set_quantity(&mut self, id: ProductId, quantity: i64) -> Result<bool, ValidationError> {
        if quantity <= 0 {
            return Ok(self.remove_item(id));
        }
        if quantity > i64::from(MAX_ITEM_QUANTITY) {
            return Err(ValidationError::out_of_range(
                "quantity",
                1,
                i64::from(MAX_ITEM_QUANTITY),
                quantity,
            ));
        }

        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.quantity = quantity as u32;
                self.changed();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.items.clear();
        self.changed();
    }

    /// Marks the cart as touched at `at` without changing items.
    pub fn touch_at(&mut self, at: Timestamp) {
        self.updated_at = Some(at);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Validation
    // ─────────────────────────────────────────────────────────────────────────

    /// Checks item invariants on a cart read from storage.
    ///
    /// # Errors
    ///
    /// - `OutOfRange` for a zero quantity or negative price
    /// - `InvalidFormat` for duplicate product ids
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (index, item) in self.items.iter().enumerate() {
            if item.quantity == 0 || item.quantity > MAX_ITEM_QUANTITY {
                return Err(ValidationError::out_of_range(
                    format!("cart.items[{}].quantity", index),
                    1,
                    i64::from(MAX_ITEM_QUANTITY),
                    i64::from(item.quantity),
                ));
            }
            if item.price < 0 {
                return Err(ValidationError::out_of_range(
                    format!("cart.items[{}].price", index),
                    0,
                    i64::MAX,
                    item.price,
                ));
            }
            if self.items[..index].iter().any(|other| other.id == item.id) {
                return Err(ValidationError::invalid_format(
                    format!("cart.items[{}].id", index),
                    format!("duplicate product id {}", item.id),
                ));
            }
        }
        Ok(())
    }

    /// Recomputes the derived total. Used after loading untrusted data.
    pub fn recompute_total(&mut self) {
        self.total = Self::sum(&self.items);
    }

    fn changed(&mut self) {
        self.recompute_total();
        self.updated_at = Some(Timestamp::now());
    }

    fn sum(items: &[CartItem]) -> i64 {
        items
            .iter()
            .fold(0i64, |acc, item| acc.saturating_add(item.line_total()))
    }
}
