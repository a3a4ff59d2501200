//! # Validation Module
//!
//! Checks a product descriptor before it reaches the cart.
//!
//! ## Rules
//! - `id`: required (after trimming), at most [`MAX_PRODUCT_ID_LEN`] chars
//! - `title`: at most [`MAX_TITLE_LEN`] chars (may be empty)
//! - `price`: not negative, at most [`MAX_PRICE_CENTS`]
//!
//! ```rust
//! use market_core::validation::validate_product_id;
//!
//! assert!(validate_product_id("sku-1").is_ok());
//! assert!(validate_product_id("   ").is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::ProductDescriptor;
use crate::{MAX_PRICE_CENTS, MAX_PRODUCT_ID_LEN, MAX_TITLE_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a product id.
pub fn validate_product_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    if id.chars().count() > MAX_PRODUCT_ID_LEN {
        return Err(ValidationError::TooLong {
            field: "id".to_string(),
            max: MAX_PRODUCT_ID_LEN,
        });
    }

    Ok(())
}

/// Validates a product title.
pub fn validate_title(title: &str) -> ValidationResult<()> {
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ValidationError::TooLong {
            field: "title".to_string(),
            max: MAX_TITLE_LEN,
        });
    }

    Ok(())
}

/// Validates a unit price.
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "price".to_string(),
        });
    }

    if price.cents() > MAX_PRICE_CENTS {
        return Err(ValidationError::TooLarge {
            field: "price".to_string(),
            max: Money::from_cents(MAX_PRICE_CENTS).to_string(),
        });
    }

    Ok(())
}

/// Validates every field of a descriptor, reporting the first failure.
pub fn validate_descriptor(product: &ProductDescriptor) -> ValidationResult<()> {
    validate_product_id(&product.id)?;
    validate_title(&product.title)?;
    validate_price(product.price)?;
    Ok(())
}
