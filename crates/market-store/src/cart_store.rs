//! # Cart Store
//!
//! The single owner of the live cart: applies mutations, recomputes the
//! aggregates, notifies observers and hands every new state to the
//! snapshot writer.
//!
//! ## Mutation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cart Mutation Flow                               │
//! │                                                                         │
//! │  add_to_cart / increment / decrement / clear   (&mut self)             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CartState::clone() + pure mutation (market-core)                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  commit(next)                                                          │
//! │   ├── aggregates(&next)            ← sum/size computed with the items  │
//! │   ├── watch::send_replace(Arc)     ← observers see (items, totals)     │
//! │   └── writer.submit(seq, json)     ← post-mutation state, no await     │
//! │                                                                         │
//! │  Unknown id on increment/decrement: nothing is published or written.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rehydration
//! [`CartStore::load`] awaits one read of the cart key before returning:
//!
//! | Stored value        | Resulting cart                         | Log     |
//! |---------------------|----------------------------------------|---------|
//! | absent              | empty                                  | debug   |
//! | valid JSON array    | decoded, normalized                    | info    |
//! | malformed           | empty                                  | warn    |
//! | price over maximum  | empty (treated as malformed)           | warn    |
//! | read failed         | empty                                  | warn    |
//!
//! Normalization drops records with quantity ≤ 0 and repeated ids (first
//! occurrence wins); each drop is logged at warn.

use std::sync::Arc;

use market_core::{
    aggregates, decode_snapshot, encode_snapshot, CartState, CartTotals, CoreResult, LineItem,
    Money, ProductDescriptor,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::kv::KeyValueStore;
use crate::writer::{SnapshotWriter, SnapshotWriterHandle, WriterStats};

// =============================================================================
// Snapshot
// =============================================================================

/// An immutable cart state together with the totals folded from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSnapshot {
    pub state: CartState,
    pub totals: CartTotals,
    /// Bumped on every published change. `0` is the rehydrated state.
    pub version: u64,
}

impl CartSnapshot {
    fn new(state: CartState, version: u64) -> Self {
        let totals = aggregates(&state);
        CartSnapshot {
            state,
            totals,
            version,
        }
    }

    /// Items in cart order.
    pub fn products(&self) -> &[LineItem] {
        self.state.items()
    }
}

// =============================================================================
// Cart Store
// =============================================================================

/// Live cart mirrored to a [`KeyValueStore`].
///
/// Mutations take `&mut self`, so only one can run at a time and each sees
/// the result of the previous one.
pub struct CartStore {
    key: String,
    notifier: watch::Sender<Arc<CartSnapshot>>,
    writer: SnapshotWriterHandle,
    writer_task: JoinHandle<WriterStats>,
}

impl CartStore {
    /// Rehydrates the cart stored under `key` and starts the snapshot writer.
    ///
    /// Never fails: anything unreadable becomes an empty cart. Must be called
    /// inside a tokio runtime.
    pub async fn load(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let state = rehydrate(store.as_ref(), &key).await;

        let initial = Arc::new(CartSnapshot::new(state, 0));
        info!(
            key = %key,
            items = initial.totals.item_count,
            size = initial.totals.size,
            sum = %initial.totals.sum,
            "Cart rehydrated"
        );

        let (notifier, _) = watch::channel(initial);
        let (writer, writer_task) = SnapshotWriter::spawn(store, key.clone());

        CartStore {
            key,
            notifier,
            writer,
            writer_task,
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<CartSnapshot> {
        self.notifier.borrow().clone()
    }

    /// Items in cart order.
    pub fn products(&self) -> Vec<LineItem> {
        self.notifier.borrow().products().to_vec()
    }

    /// Σ price × quantity.
    pub fn sum(&self) -> Money {
        self.notifier.borrow().totals.sum
    }

    /// Σ quantity.
    pub fn size(&self) -> i64 {
        self.notifier.borrow().totals.size
    }

    /// The durable key this cart is mirrored under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Receives every snapshot published after this call.
    pub fn subscribe(&self) -> watch::Receiver<Arc<CartSnapshot>> {
        self.notifier.subscribe()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds a product, or bumps its quantity when the id is already present.
    ///
    /// An invalid descriptor is rejected before anything changes.
    pub fn add_to_cart(&mut self, product: ProductDescriptor) -> CoreResult<Arc<CartSnapshot>> {
        let mut next = self.snapshot().state.clone();
        let id = product.id.clone();
        let quantity = next.add_to_cart(product)?;

        debug!(id = %id, quantity, "add_to_cart");
        Ok(self.commit(next))
    }

    /// Increases an item's quantity by one. Unknown ids are ignored.
    pub fn increment(&mut self, id: &str) -> Arc<CartSnapshot> {
        let mut next = self.snapshot().state.clone();
        match next.increment(id) {
            Some(quantity) => {
                debug!(id = %id, quantity, "increment");
                self.commit(next)
            }
            None => {
                debug!(id = %id, "increment on unknown id ignored");
                self.snapshot()
            }
        }
    }

    /// Decreases an item's quantity by one, removing it at zero. Unknown ids
    /// are ignored.
    pub fn decrement(&mut self, id: &str) -> Arc<CartSnapshot> {
        let mut next = self.snapshot().state.clone();
        match next.decrement(id) {
            Some(0) => {
                debug!(id = %id, "decrement removed item");
                self.commit(next)
            }
            Some(quantity) => {
                debug!(id = %id, quantity, "decrement");
                self.commit(next)
            }
            None => {
                debug!(id = %id, "decrement on unknown id ignored");
                self.snapshot()
            }
        }
    }

    /// Empties the cart.
    pub fn clear(&mut self) -> Arc<CartSnapshot> {
        debug!("clear");
        self.commit(CartState::new())
    }

    fn commit(&mut self, next: CartState) -> Arc<CartSnapshot> {
        let version = self.notifier.borrow().version + 1;
        let snapshot = Arc::new(CartSnapshot::new(next, version));

        self.notifier.send_replace(Arc::clone(&snapshot));

        match encode_snapshot(&snapshot.state) {
            Ok(payload) => {
                if let Err(e) = self.writer.submit(version, payload) {
                    error!(?e, version, "Cart snapshot not queued for persistence");
                }
            }
            Err(e) => error!(?e, version, "Failed to encode cart snapshot"),
        }

        snapshot
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Waits until every snapshot produced so far has been written (or has
    /// failed to write).
    pub async fn flush(&self) -> StoreResult<()> {
        self.writer.flush().await
    }

    /// Drains pending writes and stops the writer.
    pub async fn shutdown(self) -> StoreResult<WriterStats> {
        self.writer.shutdown()?;
        self.writer_task
            .await
            .map_err(|e| StoreError::Internal(format!("snapshot writer panicked: {}", e)))
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.notifier.borrow();
        f.debug_struct("CartStore")
            .field("key", &self.key)
            .field("version", &snapshot.version)
            .field("items", &snapshot.totals.item_count)
            .finish()
    }
}

/// Reads and decodes the stored cart, falling back to empty.
async fn rehydrate(store: &dyn KeyValueStore, key: &str) -> CartState {
    let raw = match store.get(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(key = %key, "No stored cart, starting empty");
            return CartState::new();
        }
        Err(e) => {
            warn!(?e, key = %key, "Failed to read stored cart, starting empty");
            return CartState::new();
        }
    };

    match decode_snapshot(&raw) {
        Ok((state, normalization)) => {
            for id in &normalization.dropped_non_positive {
                warn!(id = %id, "Dropped stored item with non-positive quantity");
            }
            for id in &normalization.dropped_duplicates {
                warn!(id = %id, "Dropped stored item with duplicate id");
            }
            state
        }
        Err(e) => {
            warn!(?e, key = %key, "Stored cart is malformed, starting empty");
            CartState::new()
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;
    use async_trait::async_trait;
    use market_core::{CoreError, CART_STORAGE_KEY, MAX_PRICE_CENTS};

    fn product(id: &str, price_cents: i64) -> ProductDescriptor {
        ProductDescriptor::new(
            id,
            format!("Product {}", id),
            format!("https://img/{}.png", id),
            Money::from_cents(price_cents),
        )
    }

    async fn stored_state(store: &MemoryStore) -> Option<CartState> {
        let raw = store.get(CART_STORAGE_KEY).await.unwrap()?;
        Some(decode_snapshot(&raw).unwrap().0)
    }

    struct FailingStore;

    #[async_trait]
    impl KeyValueStore for FailingStore {
        async fn get(&self, _key: &str) -> StoreResult<Option<String>> {
            Err(StoreError::Internal("disk unavailable".into()))
        }

        async fn set(&self, _key: &str, _value: &str) -> StoreResult<()> {
            Err(StoreError::Internal("disk unavailable".into()))
        }
    }

    #[tokio::test]
    async fn test_load_absent_key_is_empty() {
        let cart = CartStore::load(Arc::new(MemoryStore::new()), CART_STORAGE_KEY).await;

        assert!(cart.products().is_empty());
        assert!(cart.sum().is_zero());
        assert_eq!(cart.size(), 0);
        assert_eq!(cart.snapshot().version, 0);
    }

    #[tokio::test]
    async fn test_load_rehydrates_stored_cart() {
        let raw = r#"[
            {"id":"a","title":"Shirt","image_url":"https://img/a.png","price":10,"quantity":2},
            {"id":"b","title":"Cap","image_url":"https://img/b.png","price":5.5,"quantity":1}
        ]"#;
        let store = Arc::new(MemoryStore::with_entry(CART_STORAGE_KEY, raw));
        let cart = CartStore::load(store, CART_STORAGE_KEY).await;

        let ids: Vec<_> = cart.products().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(cart.sum().cents(), 2550);
        assert_eq!(cart.size(), 3);
    }

    #[tokio::test]
    async fn test_load_normalizes_stored_cart() {
        let raw = r#"[
            {"id":"a","title":"A","image_url":"","price":1,"quantity":0},
            {"id":"b","title":"B","image_url":"","price":1,"quantity":1},
            {"id":"b","title":"B again","image_url":"","price":9,"quantity":4}
        ]"#;
        let store = Arc::new(MemoryStore::with_entry(CART_STORAGE_KEY, raw));
        let cart = CartStore::load(store, CART_STORAGE_KEY).await;

        let products = cart.products();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].title, "B");
        assert_eq!(cart.size(), 1);
    }

    #[tokio::test]
    async fn test_load_malformed_snapshot_is_empty() {
        let store = Arc::new(MemoryStore::with_entry(CART_STORAGE_KEY, "{not json"));
        let cart = CartStore::load(store, CART_STORAGE_KEY).await;

        assert!(cart.products().is_empty());
        assert_eq!(cart.size(), 0);
    }

    #[tokio::test]
    async fn test_load_oversized_price_is_empty() {
        let raw = r#"[{"id":"a","title":"","image_url":"","price":90000000000000000,"quantity":2}]"#;
        let store = Arc::new(MemoryStore::with_entry(CART_STORAGE_KEY, raw));
        let cart = CartStore::load(store, CART_STORAGE_KEY).await;

        assert!(cart.products().is_empty());
        assert_eq!(cart.sum().cents(), 0);
        assert_eq!(cart.size(), 0);
    }

    #[tokio::test]
    async fn test_add_rejects_price_above_maximum() {
        let mut cart = CartStore::load(Arc::new(MemoryStore::new()), CART_STORAGE_KEY).await;

        let huge = ProductDescriptor::new("a", "Yacht", "", Money::from_major(9.0e16).unwrap());
        assert!(matches!(cart.add_to_cart(huge), Err(CoreError::Validation(_))));
        assert!(cart.products().is_empty());

        cart.add_to_cart(product("a", MAX_PRICE_CENTS)).unwrap();
        let snapshot = cart.increment("a");
        assert_eq!(snapshot.totals.sum.cents(), 2 * MAX_PRICE_CENTS);
        assert_eq!(snapshot.totals.size, 2);
    }

    #[tokio::test]
    async fn test_four_step_scenario() {
        let store = Arc::new(MemoryStore::new());
        let mut cart = CartStore::load(store.clone(), CART_STORAGE_KEY).await;

        let s1 = cart.add_to_cart(product("a", 1000)).unwrap();
        assert_eq!(s1.products()[0].quantity, 1);
        assert_eq!((s1.totals.sum.cents(), s1.totals.size), (1000, 1));

        let s2 = cart.add_to_cart(product("a", 1000)).unwrap();
        assert_eq!(s2.products()[0].quantity, 2);
        assert_eq!((s2.totals.sum.cents(), s2.totals.size), (2000, 2));

        let s3 = cart.decrement("a");
        assert_eq!(s3.products()[0].quantity, 1);
        assert_eq!((s3.totals.sum.cents(), s3.totals.size), (1000, 1));

        let s4 = cart.decrement("a");
        assert!(s4.products().is_empty());
        assert_eq!((s4.totals.sum.cents(), s4.totals.size), (0, 0));

        cart.flush().await.unwrap();
        assert_eq!(stored_state(&store).await, Some(CartState::new()));
    }

    #[tokio::test]
    async fn test_persisted_value_is_post_mutation_state() {
        let store = Arc::new(MemoryStore::new());
        let mut cart = CartStore::load(store.clone(), CART_STORAGE_KEY).await;

        cart.add_to_cart(product("a", 1000)).unwrap();
        cart.flush().await.unwrap();
        assert_eq!(stored_state(&store).await, Some(cart.snapshot().state.clone()));

        cart.add_to_cart(product("b", 250)).unwrap();
        cart.increment("a");
        cart.flush().await.unwrap();

        let stored = stored_state(&store).await.unwrap();
        assert_eq!(stored, cart.snapshot().state);
        assert_eq!(stored.get("a").unwrap().quantity, 2);
        assert_eq!(stored.get("b").unwrap().quantity, 1);
    }

    #[tokio::test]
    async fn test_unknown_id_is_noop_without_write() {
        let store = Arc::new(MemoryStore::new());
        let mut cart = CartStore::load(store.clone(), CART_STORAGE_KEY).await;

        let before = cart.snapshot();
        let after_inc = cart.increment("ghost");
        let after_dec = cart.decrement("ghost");

        assert!(Arc::ptr_eq(&before, &after_inc));
        assert!(Arc::ptr_eq(&before, &after_dec));

        let stats = cart.shutdown().await.unwrap();
        assert_eq!(stats.written, 0);
        assert_eq!(store.get(CART_STORAGE_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalid_descriptor_leaves_cart_untouched() {
        let mut cart = CartStore::load(Arc::new(MemoryStore::new()), CART_STORAGE_KEY).await;
        cart.add_to_cart(product("a", 1000)).unwrap();

        let result = cart.add_to_cart(product("   ", 500));
        assert!(matches!(result, Err(CoreError::Validation(_))));
        assert_eq!(cart.snapshot().version, 1);
        assert_eq!(cart.size(), 1);
    }

    #[tokio::test]
    async fn test_failed_writes_keep_memory_state() {
        let mut cart = CartStore::load(Arc::new(FailingStore), CART_STORAGE_KEY).await;
        assert!(cart.products().is_empty());

        cart.add_to_cart(product("a", 1000)).unwrap();
        cart.add_to_cart(product("b", 500)).unwrap();
        cart.flush().await.unwrap();

        assert_eq!(cart.size(), 2);
        assert_eq!(cart.sum().cents(), 1500);

        let stats = cart.shutdown().await.unwrap();
        assert_eq!(stats.failed, 2);
    }

    #[tokio::test]
    async fn test_subscribers_see_items_and_totals_together() {
        let mut cart = CartStore::load(Arc::new(MemoryStore::new()), CART_STORAGE_KEY).await;
        let mut rx = cart.subscribe();
        assert!(!rx.has_changed().unwrap());

        cart.add_to_cart(product("a", 1000)).unwrap();
        cart.increment("a");

        assert!(rx.has_changed().unwrap());
        let seen = rx.borrow_and_update().clone();
        assert_eq!(seen.version, 2);
        assert_eq!(seen.totals, aggregates(&seen.state));
        assert_eq!(seen.totals.size, 2);

        cart.increment("ghost");
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_clear_persists_empty_cart() {
        let store = Arc::new(MemoryStore::new());
        let mut cart = CartStore::load(store.clone(), CART_STORAGE_KEY).await;

        cart.add_to_cart(product("a", 1000)).unwrap();
        let cleared = cart.clear();
        assert!(cleared.products().is_empty());

        cart.flush().await.unwrap();
        assert_eq!(store.get(CART_STORAGE_KEY).await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_reload_restores_last_state() {
        let store = Arc::new(MemoryStore::new());

        let mut cart = CartStore::load(store.clone(), CART_STORAGE_KEY).await;
        cart.add_to_cart(product("a", 1000)).unwrap();
        cart.add_to_cart(product("b", 199)).unwrap();
        cart.add_to_cart(product("a", 1000)).unwrap();
        let before = cart.snapshot();
        cart.shutdown().await.unwrap();

        let reloaded = CartStore::load(store, CART_STORAGE_KEY).await;
        assert_eq!(reloaded.snapshot().state, before.state);
        assert_eq!(reloaded.snapshot().totals, before.totals);
    }
}
