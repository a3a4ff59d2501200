//! # State Module
//!
//! Application state for the cart front-end.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  main ──► CartProvider::new()                                          │
//! │              │ mount(CartStore::load(..).await)                        │
//! │              ▼                                                          │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  CartProvider                                                   │   │
//! │  │    use_cart()      → &CartStore      (reads)                    │   │
//! │  │    use_cart_mut()  → &mut CartStore  (mutations)                │   │
//! │  │    not mounted     → ApiError OUT_OF_SCOPE                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │              │                                                          │
//! │              ▼                                                          │
//! │  commands::cart::* take the provider as an explicit argument           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;

pub use cart::CartProvider;
