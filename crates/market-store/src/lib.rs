//! # market-store: Durable Cart Store for GoMarketplace
//!
//! This crate owns the live cart and keeps it mirrored to durable storage
//! so it survives app restarts.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cart Store Architecture                          │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                   CartStore (single mutator)                     │  │
//! │  │                                                                  │  │
//! │  │  load() once at startup, then add_to_cart / increment /          │  │
//! │  │  decrement / clear. Publishes Arc<CartSnapshot> on a watch.      │  │
//! │  └───────────────┬──────────────────────────────┬───────────────────┘  │
//! │                  │ submit(seq, json)            │ subscribe()          │
//! │                  ▼                              ▼                       │
//! │  ┌────────────────────────────┐    ┌────────────────────────────┐      │
//! │  │      SnapshotWriter        │    │   Observers (UI / CLI)     │      │
//! │  │  tokio task, FIFO queue    │    │   (items, totals) pairs    │      │
//! │  └─────────────┬──────────────┘    └────────────────────────────┘      │
//! │                │ set(key, json)                                         │
//! │                ▼                                                        │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │              dyn KeyValueStore                                   │  │
//! │  │   SqliteStore (file, WAL)          MemoryStore (tests)           │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`cart_store`] - `CartStore` and `CartSnapshot`
//! - [`writer`] - Ordered snapshot writer task
//! - [`kv`] - `KeyValueStore` trait and `MemoryStore`
//! - [`sqlite`] - SQLite-backed store
//! - [`migrations`] - Embedded schema migrations
//! - [`config`] - `CartConfig` (TOML + environment)
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use market_store::{CartConfig, CartStore};
//!
//! let config = CartConfig::load_or_default(None);
//! let store = config.open_store().await?;
//!
//! let mut cart = CartStore::load(store, config.key()).await;
//! cart.add_to_cart(product)?;
//! println!("{} items, {}", cart.size(), cart.sum());
//!
//! cart.shutdown().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart_store;
pub mod config;
pub mod error;
pub mod kv;
pub mod migrations;
pub mod sqlite;
pub mod writer;

// =============================================================================
// Re-exports
// =============================================================================

pub use cart_store::{CartSnapshot, CartStore};
pub use config::{CartConfig, LoggingSettings, StorageBackend, StorageSettings, DEFAULT_LOG_FILTER};
pub use error::{StoreError, StoreResult};
pub use kv::{KeyValueStore, MemoryStore};
pub use sqlite::{SqliteConfig, SqliteStore};
pub use writer::{SnapshotWriter, SnapshotWriterHandle, WriteCommand, WriterStats};
