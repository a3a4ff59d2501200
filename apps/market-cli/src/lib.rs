//! # GoMarketplace Cart CLI Library
//!
//! Core library for the `market` binary: wires configuration, logging and
//! the cart store together and renders command results.
//!
//! ## Module Organization
//! ```text
//! market_cli_lib/
//! ├── lib.rs          ◄─── You are here (startup & run)
//! ├── cli.rs          ◄─── clap argument definitions
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   └── cart.rs     ◄─── CartProvider scope
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command exports
//! │   └── cart.rs     ◄─── Cart commands
//! └── error.rs        ◄─── API error type for commands
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod state;

use std::fmt::Write as _;

use market_store::{CartConfig, CartStore, DEFAULT_LOG_FILTER};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter, Registry};

use cli::{Cli, Command};
use commands::cart::{self as cart_commands, CartResponse};
use error::ApiError;
use state::CartProvider;

/// Runs one CLI invocation and returns the text to print.
///
/// ## Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Invocation Lifecycle                              │
/// │                                                                         │
/// │  1. Open the configured store (SQLite file or memory)                  │
/// │  2. CartStore::load ── rehydrate from the cart key                     │
/// │  3. Mount it in a CartProvider                                         │
/// │  4. Apply exactly one command                                          │
/// │  5. Unmount + shutdown ── every queued snapshot is written             │
/// │  6. Render the resulting cart (text or JSON)                           │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(cli: Cli, config: CartConfig) -> Result<String, ApiError> {
    info!(
        backend = %config.storage.backend,
        key = %config.key(),
        "Starting GoMarketplace cart"
    );

    let store = config.open_store().await?;
    let mut provider = CartProvider::new();
    provider.mount(CartStore::load(store, config.key()).await);

    let outcome = execute(&mut provider, &cli.command);

    if let Some(cart) = provider.unmount() {
        let stats = cart.shutdown().await?;
        info!(written = stats.written, failed = stats.failed, "Cart persisted");
    }

    let response = outcome?;
    if cli.json {
        serde_json::to_string_pretty(&response).map_err(|e| ApiError::internal(e.to_string()))
    } else {
        Ok(render_text(&response))
    }
}

/// Applies a single command to the mounted cart.
pub fn execute(provider: &mut CartProvider, command: &Command) -> Result<CartResponse, ApiError> {
    match command {
        Command::Show => cart_commands::get_cart(provider),
        Command::Add {
            id,
            title,
            image_url,
            price,
        } => {
            let product = Command::product(id, title, image_url, *price)?;
            cart_commands::add_to_cart(provider, product)
        }
        Command::Inc { id } => cart_commands::increment(provider, id),
        Command::Dec { id } => cart_commands::decrement(provider, id),
        Command::Clear => cart_commands::clear_cart(provider),
    }
}

/// Renders a cart as a plain-text listing.
///
/// ```text
/// a      Shirt                x2       $20.00
/// b      Cap                  x1        $5.50
/// ──────────────────────────────────────────
/// 3 items                              $25.50
/// ```
pub fn render_text(response: &CartResponse) -> String {
    if response.items.is_empty() {
        return "Cart is empty".to_string();
    }

    let mut out = String::new();
    for item in &response.items {
        let _ = writeln!(
            out,
            "{:<6} {:<20} x{:<4} {:>10}",
            item.id,
            item.title,
            item.quantity,
            item.line_total().to_string()
        );
    }

    let _ = writeln!(out, "{}", "─".repeat(42));
    let units = if response.totals.size == 1 { "item" } else { "items" };
    let _ = write!(
        out,
        "{:<31} {:>10}",
        format!("{} {}", response.totals.size, units),
        response.totals.sum.to_string()
    );
    out
}

/// Handle for swapping the log filter once configuration is loaded.
pub type LogFilterHandle = reload::Handle<EnvFilter, Registry>;

/// Initializes the tracing subscriber for structured logging.
///
/// Runs before configuration is loaded, so it starts from `RUST_LOG` or
/// [`DEFAULT_LOG_FILTER`]. Call [`apply_log_filter`] with the configured
/// filter afterwards.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=market=trace` - Show trace for market crates only
/// - Default: `filter` from the config (`info,market=debug,sqlx=warn`)
///
/// Logs go to stderr so `--json` output stays parseable.
pub fn init_tracing() -> LogFilterHandle {
    let directives = filter_directives(DEFAULT_LOG_FILTER, std::env::var(EnvFilter::DEFAULT_ENV).ok());
    let (filter, handle) = reload::Layer::new(EnvFilter::new(directives));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    handle
}

/// Switches to the configured filter. `RUST_LOG` still takes precedence.
pub fn apply_log_filter(handle: &LogFilterHandle, configured: &str) {
    let directives = filter_directives(configured, std::env::var(EnvFilter::DEFAULT_ENV).ok());
    if let Err(e) = handle.reload(EnvFilter::new(&directives)) {
        warn!(filter = %directives, "Failed to apply log filter: {}", e);
    }
}

fn filter_directives(configured: &str, rust_log: Option<String>) -> String {
    rust_log
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| configured.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use market_store::StorageBackend;

    fn sqlite_config(dir: &tempfile::TempDir) -> CartConfig {
        let mut config = CartConfig::default();
        config.storage.backend = StorageBackend::Sqlite;
        config.storage.path = Some(dir.path().join("cart.db"));
        config
    }

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["market"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[tokio::test]
    async fn test_cart_persists_across_invocations() {
        let dir = tempfile::tempdir().unwrap();

        let add = [
            "add", "--id", "a", "--title", "Shirt", "--image-url", "https://img/a.png", "--price", "10",
        ];
        run(parse(&add), sqlite_config(&dir)).await.unwrap();
        run(parse(&add), sqlite_config(&dir)).await.unwrap();
        run(parse(&["dec", "a"]), sqlite_config(&dir)).await.unwrap();

        let out = run(parse(&["--json", "show"]), sqlite_config(&dir)).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["items"][0]["quantity"], 1);
        assert_eq!(json["totals"]["sum"], 10);
        assert_eq!(json["totals"]["size"], 1);
    }

    #[tokio::test]
    async fn test_invalid_price_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let cli = parse(&["add", "--id", "a", "--title", "Shirt", "--price", "NaN"]);

        let err = run(cli, sqlite_config(&dir)).await.unwrap_err();
        assert_eq!(err.code, error::ErrorCode::ValidationError);
    }

    #[test]
    fn test_rust_log_overrides_configured_filter() {
        assert_eq!(filter_directives("info", Some("trace".into())), "trace");
        assert_eq!(filter_directives("info", Some("  ".into())), "info");
        assert_eq!(filter_directives("info", None), "info");
    }

    #[test]
    fn test_log_filter_can_be_swapped_after_startup() {
        let (filter, handle) = reload::Layer::new(EnvFilter::new(DEFAULT_LOG_FILTER));
        let _subscriber = tracing_subscriber::registry().with(filter);

        apply_log_filter(&handle, "market=trace");

        let current = handle.with_current(|f| f.to_string()).unwrap();
        if std::env::var_os(EnvFilter::DEFAULT_ENV).is_none() {
            assert!(current.contains("market=trace"));
        }
    }

    #[test]
    fn test_render_empty_cart() {
        let response = CartResponse {
            items: Vec::new(),
            totals: Default::default(),
        };
        assert_eq!(render_text(&response), "Cart is empty");
    }

    #[tokio::test]
    async fn test_render_lists_items_and_total() {
        let mut config = CartConfig::default();
        config.storage.backend = StorageBackend::Memory;

        let out = run(
            parse(&["add", "--id", "a", "--title", "Shirt", "--price", "5.5"]),
            config,
        )
        .await
        .unwrap();

        assert!(out.contains("Shirt"));
        assert!(out.contains("x1"));
        assert!(out.contains("1 item"));
        assert!(out.contains("$5.50"));
    }
}
