//! # Error Types
//!
//! Domain-specific error types for market-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  market-core errors (this file)                                        │
//! │  ├── CoreError        - Cart domain errors                             │
//! │  └── ValidationError  - Product descriptor validation failures         │
//! │                                                                         │
//! │  market-store errors (separate crate)                                  │
//! │  └── StoreError       - Durable store / writer / config failures       │
//! │                                                                         │
//! │  CLI errors (in app)                                                   │
//! │  └── ApiError         - What the presentation layer sees               │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Presentation           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Cart domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The durable snapshot could not be decoded.
    ///
    /// ## When This Occurs
    /// - The stored value is not a JSON array
    /// - A record is missing a field or has a negative/non-finite price
    ///
    /// The store layer treats this as an empty cart rather than failing.
    #[error("Malformed cart snapshot: {0}")]
    MalformedSnapshot(String),

    /// The cart could not be encoded for persistence.
    #[error("Failed to encode cart snapshot: {0}")]
    Encoding(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before a product descriptor reaches the cart.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Value exceeds its upper bound.
    #[error("{field} must be at most {max}")]
    TooLarge { field: String, max: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
