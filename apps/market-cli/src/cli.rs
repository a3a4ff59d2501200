//! # Command-Line Interface
//!
//! Argument definitions for the `market` binary.
//!
//! ```text
//! market [--config <FILE>] [--json] <COMMAND>
//!
//!   show                                        print the cart
//!   add --id <ID> --title <T> --image-url <U> --price <P>
//!   inc <ID>                                    quantity + 1
//!   dec <ID>                                    quantity - 1 (removes at 0)
//!   clear                                       empty the cart
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use market_core::{Money, ProductDescriptor};

use crate::error::ApiError;

/// GoMarketplace shopping cart.
#[derive(Debug, Parser)]
#[command(name = "market", version, about)]
pub struct Cli {
    /// Config file (default: platform config dir / cart.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the cart as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Print the cart
    Show,

    /// Add a product, or bump its quantity if already in the cart
    Add {
        #[arg(long)]
        id: String,

        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        image_url: String,

        /// Unit price in major units, e.g. 12.99
        #[arg(long)]
        price: f64,
    },

    /// Increase an item's quantity by one
    Inc { id: String },

    /// Decrease an item's quantity by one
    Dec { id: String },

    /// Remove every item
    Clear,
}

impl Command {
    /// Builds the product descriptor for `add`.
    pub fn product(id: &str, title: &str, image_url: &str, price: f64) -> Result<ProductDescriptor, ApiError> {
        let price = Money::from_major(price)
            .filter(|m| !m.is_negative())
            .ok_or_else(|| ApiError::validation(format!("price {} is not a valid amount", price)))?;

        Ok(ProductDescriptor::new(id, title, image_url, price))
    }
}
