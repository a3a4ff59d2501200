//! # Cart State
//!
//! The ordered collection of line items and every operation on it.
//!
//! ## Cart Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  UI Event               Operation              State Change             │
//! │  ────────               ─────────              ────────────             │
//! │                                                                         │
//! │  Tap "Add" ──────────► add_to_cart(p) ──┬────► items[i].qty += 1       │
//! │                                         │      (descriptor overwrites) │
//! │                                         └────► items.push(p, qty 1)    │
//! │                                                                         │
//! │  Tap "+" ────────────► increment(id) ────────► items[i].qty += 1       │
//! │                                                                         │
//! │  Tap "-" ────────────► decrement(id) ────────► items[i].qty -= 1       │
//! │                                                 qty == 0 → removed     │
//! │                                                                         │
//! │  Unknown id on +/- ──► no-op                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Ids are unique within the sequence
//! - Every item has `quantity >= 1`
//! - Appends go to the end; in-place updates keep their position
//!
//! Aggregates are never stored on the state. [`aggregates`] folds them from
//! the items every time they are needed.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{CartTotals, LineItem, ProductDescriptor};
use crate::validation::validate_descriptor;

// =============================================================================
// Cart State
// =============================================================================

/// The shopping cart: an ordered sequence of line items keyed by id.
///
/// Serializes transparently as the JSON array the durable store holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartState {
    items: Vec<LineItem>,
}

impl CartState {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        CartState { items: Vec::new() }
    }

    /// Builds a cart from raw records, restoring the invariants.
    ///
    /// Records with `quantity <= 0` are dropped, and for duplicate ids only
    /// the first occurrence is kept. What was dropped is reported in the
    /// returned [`Normalization`].
    pub fn from_items(items: Vec<LineItem>) -> (Self, Normalization) {
        let mut normalization = Normalization::default();
        let mut seen = HashSet::with_capacity(items.len());
        let mut kept = Vec::with_capacity(items.len());

        for item in items {
            if item.quantity <= 0 {
                normalization.dropped_non_positive.push(item.id);
                continue;
            }
            if !seen.insert(item.id.clone()) {
                normalization.dropped_duplicates.push(item.id);
                continue;
            }
            kept.push(item);
        }

        (CartState { items: kept }, normalization)
    }

    /// Returns the items in cart order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Looks up an item by exact id.
    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds a product, or bumps its quantity if the id is already present.
    ///
    /// ## Behavior
    /// - Present: quantity + 1 in place; title, image and price are taken
    ///   from the incoming descriptor
    /// - Absent: appended with quantity 1
    ///
    /// ## Returns
    /// The item's quantity after the call, or a validation error when the
    /// descriptor is malformed (the cart is left untouched).
    pub fn add_to_cart(&mut self, product: ProductDescriptor) -> CoreResult<i64> {
        validate_descriptor(&product)?;

        if let Some(item) = self.items.iter_mut().find(|i| i.id == product.id) {
            let quantity = item.quantity.saturating_add(1);
            *item = LineItem::from_descriptor(product, quantity);
            return Ok(quantity);
        }

        self.items.push(LineItem::from_descriptor(product, 1));
        Ok(1)
    }

    /// Increases the quantity of an item by one.
    ///
    /// Returns the new quantity, or `None` when no item has this id (the
    /// cart is unchanged).
    pub fn increment(&mut self, id: &str) -> Option<i64> {
        let item = self.items.iter_mut().find(|i| i.id == id)?;
        item.quantity = item.quantity.saturating_add(1);
        Some(item.quantity)
    }

    /// Decreases the quantity of an item by one, removing it at zero.
    ///
    /// Returns the new quantity (`0` means the item was removed), or `None`
    /// when no item has this id.
    pub fn decrement(&mut self, id: &str) -> Option<i64> {
        let item = self.items.iter_mut().find(|i| i.id == id)?;
        item.quantity -= 1;
        let quantity = item.quantity;

        self.items.retain(|i| i.quantity > 0);
        Some(quantity)
    }

    /// Removes every item.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

// =============================================================================
// Aggregates
// =============================================================================

/// Folds the derived totals out of a cart state.
///
/// ```rust
/// use market_core::{aggregates, CartState};
///
/// let totals = aggregates(&CartState::new());
/// assert!(totals.sum.is_zero());
/// assert_eq!(totals.size, 0);
/// ```
pub fn aggregates(state: &CartState) -> CartTotals {
    CartTotals {
        sum: state.items.iter().map(LineItem::line_total).sum::<Money>(),
        size: state
            .items
            .iter()
            .fold(0i64, |acc, i| acc.saturating_add(i.quantity)),
        item_count: state.items.len(),
    }
}

// =============================================================================
// Snapshot Codec
// =============================================================================

/// What [`CartState::from_items`] had to drop to restore the invariants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalization {
    /// Ids of records whose quantity was zero or negative.
    pub dropped_non_positive: Vec<String>,
    /// Ids of records that repeated an earlier id.
    pub dropped_duplicates: Vec<String>,
}

impl Normalization {
    /// True when nothing was dropped.
    pub fn is_clean(&self) -> bool {
        self.dropped_non_positive.is_empty() && self.dropped_duplicates.is_empty()
    }
}

/// Encodes a cart as the JSON array stored under the cart key.
pub fn encode_snapshot(state: &CartState) -> CoreResult<String> {
    serde_json::to_string(state).map_err(|e| CoreError::Encoding(e.to_string()))
}

/// Decodes a stored JSON array back into a cart, normalizing it.
pub fn decode_snapshot(raw: &str) -> CoreResult<(CartState, Normalization)> {
    let items: Vec<LineItem> =
        serde_json::from_str(raw).map_err(|e| CoreError::MalformedSnapshot(e.to_string()))?;
    Ok(CartState::from_items(items))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, price_cents: i64) -> ProductDescriptor {
        ProductDescriptor::new(
            id,
            format!("Product {}", id),
            format!("https://img/{}.png", id),
            Money::from_cents(price_cents),
        )
    }

    fn ids(cart: &CartState) -> Vec<&str> {
        cart.items().iter().map(|i| i.id.as_str()).collect()
    }

    fn assert_totals_match(cart: &CartState) {
        let totals = aggregates(cart);
        let sum: i64 = cart
            .items()
            .iter()
            .map(|i| i.price.cents() * i.quantity)
            .sum();
        let size: i64 = cart.items().iter().map(|i| i.quantity).sum();
        assert_eq!(totals.sum.cents(), sum);
        assert_eq!(totals.size, size);
    }

    #[test]
    fn test_distinct_adds_each_have_quantity_one() {
        let mut cart = CartState::new();
        for id in ["a", "b", "c", "d"] {
            cart.add_to_cart(product(id, 100)).unwrap();
            assert_totals_match(&cart);
        }

        assert_eq!(aggregates(&cart).size, 4);
        assert!(cart.items().iter().all(|i| i.quantity == 1));
        assert_eq!(ids(&cart), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_repeated_add_increments_single_entry() {
        let mut cart = CartState::new();
        cart.add_to_cart(product("x", 100)).unwrap();
        for _ in 0..4 {
            cart.add_to_cart(product("a", 250)).unwrap();
        }
        cart.add_to_cart(product("y", 100)).unwrap();

        assert_eq!(cart.items().iter().filter(|i| i.id == "a").count(), 1);
        assert_eq!(cart.get("a").unwrap().quantity, 4);
        assert_eq!(ids(&cart), vec!["x", "a", "y"]);
        assert_totals_match(&cart);
    }

    #[test]
    fn test_add_existing_overwrites_descriptor_fields_in_place() {
        let mut cart = CartState::new();
        cart.add_to_cart(product("a", 1000)).unwrap();
        cart.add_to_cart(product("b", 500)).unwrap();

        let repriced = ProductDescriptor::new("a", "Renamed", "https://img/new.png", Money::from_cents(900));
        assert_eq!(cart.add_to_cart(repriced).unwrap(), 2);

        let first = &cart.items()[0];
        assert_eq!(first.id, "a");
        assert_eq!(first.title, "Renamed");
        assert_eq!(first.image_url, "https://img/new.png");
        assert_eq!(first.price.cents(), 900);
        assert_eq!(aggregates(&cart).sum.cents(), 900 * 2 + 500);
    }

    #[test]
    fn test_add_rejects_invalid_descriptor() {
        let mut cart = CartState::new();
        let result = cart.add_to_cart(product("", 100));

        assert!(matches!(result, Err(CoreError::Validation(_))));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_increment_unknown_id_is_noop() {
        let mut cart = CartState::new();
        cart.add_to_cart(product("a", 100)).unwrap();
        let before = cart.clone();

        assert_eq!(cart.increment("missing"), None);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_decrement_removes_at_zero_then_noop() {
        let mut cart = CartState::new();
        cart.add_to_cart(product("a", 100)).unwrap();
        cart.add_to_cart(product("b", 100)).unwrap();

        assert_eq!(cart.decrement("a"), Some(0));
        assert_eq!(ids(&cart), vec!["b"]);

        let before = cart.clone();
        assert_eq!(cart.decrement("a"), None);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_increment_then_decrement_restores_quantity_and_position() {
        let mut cart = CartState::new();
        cart.add_to_cart(product("a", 100)).unwrap();
        cart.add_to_cart(product("b", 200)).unwrap();
        cart.add_to_cart(product("b", 200)).unwrap();
        cart.add_to_cart(product("c", 300)).unwrap();
        let before = cart.clone();

        assert_eq!(cart.increment("b"), Some(3));
        assert_eq!(cart.decrement("b"), Some(2));

        assert_eq!(cart, before);
    }

    #[test]
    fn test_scenario_add_add_decrement_decrement() {
        let mut cart = CartState::new();

        cart.add_to_cart(product("a", 1000)).unwrap();
        let totals = aggregates(&cart);
        assert_eq!(cart.get("a").unwrap().quantity, 1);
        assert_eq!((totals.sum.cents(), totals.size), (1000, 1));

        cart.add_to_cart(product("a", 1000)).unwrap();
        let totals = aggregates(&cart);
        assert_eq!(cart.get("a").unwrap().quantity, 2);
        assert_eq!((totals.sum.cents(), totals.size), (2000, 2));

        cart.decrement("a");
        let totals = aggregates(&cart);
        assert_eq!(cart.get("a").unwrap().quantity, 1);
        assert_eq!((totals.sum.cents(), totals.size), (1000, 1));

        cart.decrement("a");
        let totals = aggregates(&cart);
        assert!(cart.is_empty());
        assert_eq!((totals.sum.cents(), totals.size), (0, 0));
    }

    #[test]
    fn test_snapshot_round_trip_preserves_order_and_quantities() {
        let mut cart = CartState::new();
        cart.add_to_cart(product("z", 1299)).unwrap();
        cart.add_to_cart(product("a", 50)).unwrap();
        cart.add_to_cart(product("z", 1299)).unwrap();
        cart.increment("a");

        let raw = encode_snapshot(&cart).unwrap();
        let (restored, normalization) = decode_snapshot(&raw).unwrap();

        assert!(normalization.is_clean());
        assert_eq!(restored, cart);
    }

    #[test]
    fn test_decode_mobile_client_snapshot() {
        let raw = r#"[
            {"id":"1","title":"Camiseta","image_url":"https://img/1.png","price":49.9,"quantity":2},
            {"id":"2","title":"Caneca","image_url":"https://img/2.png","price":10,"quantity":1}
        ]"#;

        let (cart, _) = decode_snapshot(raw).unwrap();
        let totals = aggregates(&cart);

        assert_eq!(ids(&cart), vec!["1", "2"]);
        assert_eq!(totals.sum.cents(), 4990 * 2 + 1000);
        assert_eq!(totals.size, 3);
    }

    #[test]
    fn test_decode_normalizes_invariant_violations() {
        let raw = r#"[
            {"id":"a","title":"","image_url":"","price":1,"quantity":1},
            {"id":"b","title":"","image_url":"","price":1,"quantity":0},
            {"id":"a","title":"","image_url":"","price":1,"quantity":5},
            {"id":"c","title":"","image_url":"","price":1,"quantity":-2}
        ]"#;

        let (cart, normalization) = decode_snapshot(raw).unwrap();

        assert_eq!(ids(&cart), vec!["a"]);
        assert_eq!(cart.get("a").unwrap().quantity, 1);
        assert_eq!(normalization.dropped_non_positive, vec!["b", "c"]);
        assert_eq!(normalization.dropped_duplicates, vec!["a"]);
    }

    #[test]
    fn test_decode_rejects_malformed_snapshot() {
        assert!(matches!(
            decode_snapshot("{not json"),
            Err(CoreError::MalformedSnapshot(_))
        ));
        assert!(matches!(
            decode_snapshot(r#"{"id":"a"}"#),
            Err(CoreError::MalformedSnapshot(_))
        ));
    }

    #[test]
    fn test_extreme_quantities_saturate() {
        let raw = format!(
            r#"[
                {{"id":"a","title":"","image_url":"","price":10000000,"quantity":{max}}},
                {{"id":"b","title":"","image_url":"","price":1,"quantity":{max}}}
            ]"#,
            max = i64::MAX
        );
        let (mut cart, _) = decode_snapshot(&raw).unwrap();

        assert_eq!(cart.increment("a"), Some(i64::MAX));
        assert_eq!(cart.add_to_cart(product("b", 100)).unwrap(), i64::MAX);

        let totals = aggregates(&cart);
        assert_eq!(totals.sum.cents(), i64::MAX);
        assert_eq!(totals.size, i64::MAX);
    }

    #[test]
    fn test_clear() {
        let mut cart = CartState::new();
        cart.add_to_cart(product("a", 100)).unwrap();
        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(aggregates(&cart), CartTotals::default());
    }
}
