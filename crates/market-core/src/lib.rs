//! # market-core: Pure Cart Logic for GoMarketplace
//!
//! This crate holds the shopping-cart state and every rule that applies to
//! it, as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      GoMarketplace Cart Architecture                    │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Presentation (mobile UI / CLI)                  │   │
//! │  │      Product list ──► Cart badge ──► Cart screen               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ add_to_cart / increment / decrement   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              market-store: CartStore + snapshot writer          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ market-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ validation│  │   │
//! │  │   │ LineItem  │  │   Money   │  │ CartState │  │   rules   │  │   │
//! │  │   │ Totals    │  │  (cents)  │  │ aggregates│  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • NO TASKS • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - LineItem, ProductDescriptor, CartTotals
//! - [`money`] - Money type with integer arithmetic
//! - [`cart`] - CartState, its mutations, aggregates and the snapshot codec
//! - [`error`] - Domain error types
//! - [`validation`] - Product descriptor validation
//!
//! ## Example Usage
//!
//! ```rust
//! use market_core::{aggregates, CartState, Money, ProductDescriptor};
//!
//! let mut cart = CartState::new();
//! let shirt = ProductDescriptor::new("a", "Shirt", "https://img/a.png", Money::from_cents(1000));
//!
//! cart.add_to_cart(shirt.clone()).unwrap();
//! cart.add_to_cart(shirt).unwrap();
//!
//! let totals = aggregates(&cart);
//! assert_eq!(totals.size, 2);
//! assert_eq!(totals.sum.cents(), 2000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{aggregates, decode_snapshot, encode_snapshot, CartState, Normalization};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Storage key under which the cart snapshot lives in the durable store.
///
/// The mobile client writes the same key, so an existing install rehydrates
/// the cart it already had.
pub const CART_STORAGE_KEY: &str = "@GoMarketplace:cart";

/// Maximum length of a product id.
pub const MAX_PRODUCT_ID_LEN: usize = 128;

/// Maximum length of a product title.
pub const MAX_TITLE_LEN: usize = 200;

/// Maximum unit price, in cents ($10,000,000.00).
///
/// Applies to descriptors entering the cart and to prices read back from a
/// stored snapshot.
pub const MAX_PRICE_CENTS: i64 = 1_000_000_000;
