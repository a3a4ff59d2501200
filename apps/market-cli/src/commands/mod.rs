//! # Commands Module
//!
//! Every operation the presentation layer can ask of the cart.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (exports)
//! └── cart.rs     ◄─── Cart reads and mutations
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  market add --id a --title Shirt --image-url … --price 10              │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  commands::cart::add_to_cart(                                          │
//! │      provider: &mut CartProvider,  ◄── explicit scope                  │
//! │      product: ProductDescriptor,   ◄── parsed from arguments           │
//! │  ) -> Result<CartResponse, ApiError>                                   │
//! │         │                                                               │
//! │         │ (JSON or text rendering)                                      │
//! │         ▼                                                               │
//! │  { "items": [...], "totals": { "sum": 10, "size": 1, "itemCount": 1 } }│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cart;
