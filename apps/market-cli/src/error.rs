//! # API Error Type
//!
//! Unified error type for cart commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Cart App                           │
//! │                                                                         │
//! │  Command Function  Result<CartResponse, ApiError>                      │
//! │         │                                                               │
//! │         ├── no CartProvider mounted ───────► OUT_OF_SCOPE              │
//! │         ├── CoreError::Validation ─────────► VALIDATION_ERROR          │
//! │         ├── StoreError (open / migrate) ───► STORAGE_ERROR             │
//! │         ├── StoreError (config) ───────────► CONFIG_ERROR              │
//! │         └── anything else ─────────────────► INTERNAL                  │
//! │                                                                         │
//! │  Write failures after startup never reach here: the cart store logs   │
//! │  them and keeps the in-memory state.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use market_core::CoreError;
use market_store::StoreError;
use serde::Serialize;

/// Error returned from cart commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "OUT_OF_SCOPE",
///   "message": "use_cart must be used within a CartProvider"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for command responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The cart was used outside a mounted `CartProvider`
    OutOfScope,

    /// Input validation failed
    ValidationError,

    /// Durable storage could not be opened
    StorageError,

    /// Configuration could not be loaded or is invalid
    ConfigError,

    /// Internal error
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates the error for cart access outside a provider.
    pub fn out_of_scope() -> Self {
        ApiError::new(
            ErrorCode::OutOfScope,
            "use_cart must be used within a CartProvider",
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts store errors to API errors.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        if err.is_config_error() {
            return ApiError::new(ErrorCode::ConfigError, err.to_string());
        }

        match err {
            StoreError::ConnectionFailed(e) => {
                tracing::error!("Store connection failed: {}", e);
                ApiError::new(ErrorCode::StorageError, "Cart storage could not be opened")
            }
            StoreError::MigrationFailed(e) => {
                tracing::error!("Store migration failed: {}", e);
                ApiError::new(ErrorCode::StorageError, "Cart storage migration failed")
            }
            e @ (StoreError::QueryFailed(_) | StoreError::PoolExhausted) => {
                ApiError::new(ErrorCode::StorageError, e.to_string())
            }
            StoreError::WriterClosed => {
                ApiError::internal("Cart persistence stopped unexpectedly")
            }
            other => ApiError::internal(other.to_string()),
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
            other => ApiError::internal(other.to_string()),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
