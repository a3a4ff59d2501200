//! # Cart Configuration
//!
//! Where the cart is stored and how loudly the app logs.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     MARKET_STORAGE_BACKEND=memory                                      │
//! │     MARKET_DB_PATH=/tmp/cart.db                                        │
//! │     MARKET_CART_KEY=@GoMarketplace:cart                                │
//! │     MARKET_LOG=debug                                                   │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/market/cart.toml (Linux)                                 │
//! │     ~/Library/Application Support/com.gomarketplace.market/cart.toml   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     SQLite in the platform data dir, key "@GoMarketplace:cart"         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # cart.toml
//! [storage]
//! backend = "sqlite"   # sqlite | memory
//! path = "/var/lib/market/cart.db"
//! key = "@GoMarketplace:cart"
//!
//! [logging]
//! filter = "info,market=debug,sqlx=warn"
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use market_core::CART_STORAGE_KEY;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::kv::{KeyValueStore, MemoryStore};
use crate::sqlite::{SqliteConfig, SqliteStore};

/// Default tracing filter for the app.
pub const DEFAULT_LOG_FILTER: &str = "info,market=debug,sqlx=warn";

const DB_FILE_NAME: &str = "cart.db";

// =============================================================================
// Storage Backend
// =============================================================================

/// Which [`KeyValueStore`] the cart is mirrored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// SQLite file; survives restarts.
    #[default]
    Sqlite,

    /// Process memory; lost on exit.
    Memory,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Sqlite => write!(f, "sqlite"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" | "file" => Ok(StorageBackend::Sqlite),
            "memory" | "mem" => Ok(StorageBackend::Memory),
            other => Err(StoreError::InvalidConfig(format!(
                "Unknown storage backend: '{}'. Valid options: sqlite, memory",
                other
            ))),
        }
    }
}

// =============================================================================
// Settings
// =============================================================================

/// Durable storage settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    #[serde(default)]
    pub backend: StorageBackend,

    /// SQLite file. Defaults to the platform data dir.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Key the cart snapshot is stored under.
    #[serde(default = "default_key")]
    pub key: String,
}

fn default_key() -> String {
    CART_STORAGE_KEY.to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            backend: StorageBackend::default(),
            path: None,
            key: default_key(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive. `RUST_LOG` still wins.
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_filter(),
        }
    }
}

// =============================================================================
// Cart Configuration
// =============================================================================

/// Complete cart configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CartConfig {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl CartConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (cart.toml)
    /// 3. Environment variables
    ///
    /// An explicitly given path must exist; the default path is optional.
    pub fn load(config_path: Option<PathBuf>) -> StoreResult<Self> {
        let mut config = match config_path {
            Some(path) => {
                info!(?path, "Loading cart config from file");
                Self::from_file(&path)?
            }
            None => match Self::default_config_path() {
                Some(path) if path.exists() => {
                    info!(?path, "Loading cart config from file");
                    Self::from_file(&path)?
                }
                path => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns the defaults if loading fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load cart config: {}. Using defaults.", e);
            Self::default()
        })
    }

    fn from_file(path: &Path) -> StoreResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            StoreError::ConfigLoadFailed(format!("{}: {}", path.display(), e))
        })?;
        Self::from_toml(&contents)
    }

    /// Parses a TOML document. Missing sections take their defaults.
    pub fn from_toml(contents: &str) -> StoreResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> StoreResult<()> {
        if self.storage.key.trim().is_empty() {
            return Err(StoreError::InvalidConfig(
                "storage.key must not be empty".into(),
            ));
        }

        if let Some(ref path) = self.storage.path {
            if path.as_os_str().is_empty() {
                return Err(StoreError::InvalidConfig(
                    "storage.path must not be empty".into(),
                ));
            }
        }

        Ok(())
    }

    /// Applies `MARKET_*` environment variable overrides.
    ///
    /// An unknown `MARKET_STORAGE_BACKEND` is an [`StoreError::InvalidConfig`].
    pub fn apply_env_overrides(&mut self) -> StoreResult<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> StoreResult<()> {
        if let Some(backend) = lookup("MARKET_STORAGE_BACKEND") {
            self.storage.backend = backend.parse()?;
            debug!(backend = %self.storage.backend, "Overriding storage backend from environment");
        }

        if let Some(path) = lookup("MARKET_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.path = Some(PathBuf::from(path));
        }

        if let Some(key) = lookup("MARKET_CART_KEY") {
            self.storage.key = key;
        }

        if let Some(filter) = lookup("MARKET_LOG") {
            self.logging.filter = filter;
        }

        Ok(())
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "gomarketplace", "market")
            .map(|dirs| dirs.config_dir().join("cart.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the cart key.
    pub fn key(&self) -> &str {
        &self.storage.key
    }

    /// Returns the SQLite file path, resolving the platform default.
    pub fn database_path(&self) -> PathBuf {
        if let Some(ref path) = self.storage.path {
            return path.clone();
        }

        directories::ProjectDirs::from("com", "gomarketplace", "market")
            .map(|dirs| dirs.data_dir().join(DB_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(DB_FILE_NAME))
    }

    /// Opens the configured backend.
    pub async fn open_store(&self) -> StoreResult<Arc<dyn KeyValueStore>> {
        match self.storage.backend {
            StorageBackend::Memory => {
                info!("Using in-memory cart store");
                Ok(Arc::new(MemoryStore::new()))
            }
            StorageBackend::Sqlite => {
                let path = self.database_path();
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)
                        .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;
                }

                let store = SqliteStore::open(SqliteConfig::new(path)).await?;
                Ok(Arc::new(store))
            }
        }
    }
}
