//! # Domain Types
//!
//! Types shared by the cart, the durable snapshot and the presentation layer.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌───────────────────┐  add_to_cart  ┌───────────────────┐             │
//! │  │ ProductDescriptor │ ────────────► │     LineItem      │             │
//! │  │  ───────────────  │               │  ───────────────  │             │
//! │  │  id               │               │  id               │             │
//! │  │  title            │               │  title            │             │
//! │  │  image_url        │               │  image_url        │             │
//! │  │  price            │               │  price            │             │
//! │  └───────────────────┘               │  quantity (≥ 1)   │             │
//! │                                      └─────────┬─────────┘             │
//! │                                                │ fold                  │
//! │                                      ┌─────────▼─────────┐             │
//! │                                      │    CartTotals     │             │
//! │                                      │  sum, size        │             │
//! │                                      └───────────────────┘             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! `LineItem` serializes to the record shape the mobile client persists:
//! `{"id","title","image_url","price","quantity"}` with `price` in major units.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{serde_major, Money};

// =============================================================================
// Product Descriptor
// =============================================================================

/// A product as shown in the catalog, before it enters the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductDescriptor {
    pub id: String,
    pub title: String,
    pub image_url: String,
    /// Unit price.
    #[serde(with = "serde_major")]
    #[ts(type = "number")]
    pub price: Money,
}

impl ProductDescriptor {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: Money,
    ) -> Self {
        ProductDescriptor {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One product in the cart, with its quantity.
///
/// ## Invariant
/// A `LineItem` inside a `CartState` always has `quantity >= 1`. Items that
/// reach zero are removed, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    pub id: String,
    pub title: String,
    pub image_url: String,
    /// Unit price.
    #[serde(with = "serde_major")]
    #[ts(type = "number")]
    pub price: Money,
    pub quantity: i64,
}

impl LineItem {
    /// Creates a line item from a descriptor and quantity.
    pub fn from_descriptor(product: ProductDescriptor, quantity: i64) -> Self {
        LineItem {
            id: product.id,
            title: product.title,
            image_url: product.image_url,
            price: product.price,
            quantity,
        }
    }

    /// Unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Aggregates derived from a cart state.
///
/// Never stored on its own: always produced by [`crate::aggregates`] from the
/// snapshot it describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartTotals {
    /// Σ(price × quantity).
    #[serde(
        serialize_with = "serde_major::serialize",
        deserialize_with = "serde_major::deserialize_total"
    )]
    #[ts(type = "number")]
    pub sum: Money,
    /// Σ(quantity).
    pub size: i64,
    /// Number of distinct line items.
    pub item_count: usize,
}
