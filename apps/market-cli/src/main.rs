//! # `market` Entry Point
//!
//! ## Startup Sequence
//! 1. Parse arguments
//! 2. Initialize tracing (`RUST_LOG` or the default filter)
//! 3. Load configuration (file, then `MARKET_*` environment)
//! 4. Switch to the configured log filter
//! 5. Run one command against the rehydrated cart
//! 6. Print the result; errors go to stderr with a failing exit code

use std::process::ExitCode;

use clap::Parser;
use market_cli_lib::cli::Cli;
use market_cli_lib::error::ApiError;
use market_store::CartConfig;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let json = cli.json;
    let log_filter = market_cli_lib::init_tracing();

    let config = match CartConfig::load(cli.config.clone()) {
        Ok(config) => config,
        Err(e) => return report(ApiError::from(e), json),
    };

    market_cli_lib::apply_log_filter(&log_filter, &config.logging.filter);

    match market_cli_lib::run(cli, config).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => report(e, json),
    }
}

fn report(err: ApiError, json: bool) -> ExitCode {
    if json {
        match serde_json::to_string(&err) {
            Ok(body) => eprintln!("{}", body),
            Err(_) => eprintln!("{}", err),
        }
    } else {
        eprintln!("error: {}", err.message);
    }
    ExitCode::FAILURE
}
