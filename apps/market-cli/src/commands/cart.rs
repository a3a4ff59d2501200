//! # Cart Commands
//!
//! Command functions for reading and changing the cart.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐                        │
//! │  │  Empty   │────►│ In Cart  │────►│ Checkout │                        │
//! │  │  Cart    │     │          │     │ hand-off │                        │
//! │  └──────────┘     └──────────┘     └──────────┘                        │
//! │       ▲                │                 │                              │
//! │       │           add_to_cart            │                              │
//! │       │           increment              │                              │
//! │       │           decrement              │                              │
//! │       │                                  ▼                              │
//! │       └──────────────────────────── clear_cart                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use market_core::{CartTotals, LineItem, ProductDescriptor};
use market_store::CartSnapshot;
use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::state::CartProvider;

/// Cart response including items and totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<LineItem>,
    pub totals: CartTotals,
}

impl From<&CartSnapshot> for CartResponse {
    fn from(snapshot: &CartSnapshot) -> Self {
        CartResponse {
            items: snapshot.products().to_vec(),
            totals: snapshot.totals,
        }
    }
}

/// Gets the current cart contents.
///
/// ## Returns
/// Current cart with items and totals
pub fn get_cart(provider: &CartProvider) -> Result<CartResponse, ApiError> {
    debug!("get_cart command");
    let cart = provider.use_cart()?;
    Ok(CartResponse::from(cart.snapshot().as_ref()))
}

/// Adds a product to the cart.
///
/// ## Behavior
/// - If product already in cart: quantity increases, and its title, image
///   and price are replaced by the incoming ones
/// - If product not in cart: appended with quantity 1
pub fn add_to_cart(
    provider: &mut CartProvider,
    product: ProductDescriptor,
) -> Result<CartResponse, ApiError> {
    debug!(id = %product.id, price = %product.price, "add_to_cart command");
    let snapshot = provider.use_cart_mut()?.add_to_cart(product)?;
    Ok(CartResponse::from(snapshot.as_ref()))
}

/// Increases the quantity of an item by one. Unknown ids leave the cart as
/// it was.
pub fn increment(provider: &mut CartProvider, id: &str) -> Result<CartResponse, ApiError> {
    debug!(id = %id, "increment command");
    let snapshot = provider.use_cart_mut()?.increment(id);
    Ok(CartResponse::from(snapshot.as_ref()))
}

/// Decreases the quantity of an item by one, removing it at zero. Unknown
/// ids leave the cart as it was.
pub fn decrement(provider: &mut CartProvider, id: &str) -> Result<CartResponse, ApiError> {
    debug!(id = %id, "decrement command");
    let snapshot = provider.use_cart_mut()?.decrement(id);
    Ok(CartResponse::from(snapshot.as_ref()))
}

/// Clears all items from the cart.
pub fn clear_cart(provider: &mut CartProvider) -> Result<CartResponse, ApiError> {
    debug!("clear_cart command");
    let snapshot = provider.use_cart_mut()?.clear();
    Ok(CartResponse::from(snapshot.as_ref()))
}
