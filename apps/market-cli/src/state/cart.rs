//! # Cart Provider
//!
//! Explicit scope the presentation layer reaches the cart through.
//!
//! There is no global cart: whoever builds the provider passes it to the
//! commands. Access before [`CartProvider::mount`] or after
//! [`CartProvider::unmount`] is a scope error.

use std::sync::Arc;

use market_store::{CartStore, KeyValueStore};
use tracing::debug;

use crate::error::ApiError;

/// Holds the mounted [`CartStore`], if any.
#[derive(Debug, Default)]
pub struct CartProvider {
    store: Option<CartStore>,
}

impl CartProvider {
    /// Creates a provider with nothing mounted.
    pub fn new() -> Self {
        CartProvider { store: None }
    }

    /// Rehydrates a cart from `store` and mounts it.
    pub async fn load(store: Arc<dyn KeyValueStore>, key: &str) -> Self {
        let mut provider = CartProvider::new();
        provider.mount(CartStore::load(store, key).await);
        provider
    }

    /// Mounts a cart store, returning the one it replaces.
    pub fn mount(&mut self, store: CartStore) -> Option<CartStore> {
        debug!(key = %store.key(), "Cart provider mounted");
        self.store.replace(store)
    }

    /// Unmounts and returns the cart store.
    pub fn unmount(&mut self) -> Option<CartStore> {
        debug!("Cart provider unmounted");
        self.store.take()
    }

    /// Returns true if a cart store is mounted.
    pub fn is_mounted(&self) -> bool {
        self.store.is_some()
    }

    /// The mounted cart, for reads.
    pub fn use_cart(&self) -> Result<&CartStore, ApiError> {
        self.store.as_ref().ok_or_else(ApiError::out_of_scope)
    }

    /// The mounted cart, for mutations.
    pub fn use_cart_mut(&mut self) -> Result<&mut CartStore, ApiError> {
        self.store.as_mut().ok_or_else(ApiError::out_of_scope)
    }
}
