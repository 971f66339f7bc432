//! Creates one MercadoPago QR payment order from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Create the order described in order.toml using mpqr.toml
//! mpqr --order order.toml
//!
//! # Print the request that would be sent, without calling the API
//! mpqr --config /path/to/mpqr.toml --order order.json --dry-run
//!
//! # Configure logging level
//! RUST_LOG=debug mpqr --order order.toml
//! ```
//!
//! # Environment Variables
//!
//! - `MPQR_CONFIG` - Path to TOML configuration file (default: `mpqr.toml`)
//! - `MPQR_API_URL` - Override the API base URL
//! - `MPQR_TIMEOUT_SECS` - Override the request timeout
//! - `RUST_LOG` - Log level filter (default: `info`)
//!
//! A `.env` file in the working directory is loaded first.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use mpqr::QrOrderNode;
use mpqr::reference::TimestampReferences;
use mpqr_http::HttpDispatcher;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use mpqr_cli::config::{CliConfig, load_order};

/// Create a MercadoPago QR payment order.
#[derive(Debug, Parser)]
#[command(name = "mpqr", version, about)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, env = "MPQR_CONFIG", default_value = "mpqr.toml")]
    config: PathBuf,

    /// Path to the order file (`.json` or TOML).
    #[arg(long)]
    order: PathBuf,

    /// Build and print the request without sending it.
    #[arg(long)]
    dry_run: bool,

    /// Request timeout in seconds, overriding the configuration file.
    #[arg(long, env = "MPQR_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() {
    // A missing .env file is not an error
    dotenvy::dotenv().ok();

    // Initialize tracing with RUST_LOG env filter
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        tracing::error!("mpqr failed: {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::load_from(&args.config)?;
    tracing::info!(
        api_url = %config.api_url,
        user_id = %config.credentials.user_id,
        external_pos_id = %config.credentials.external_pos_id,
        sandbox_mode = config.credentials.sandbox_mode,
        "Loaded configuration"
    );

    let order = load_order(&args.order)?;
    tracing::info!(items = order.items.len(), "Loaded order");

    let timeout = Duration::from_secs(args.timeout_secs.unwrap_or(config.timeout_secs));
    let dispatcher = HttpDispatcher::with_base_url(config.api_url).with_timeout(timeout);
    let references = TimestampReferences::new().with_prefix(config.reference_prefix);
    let node = QrOrderNode::with_references(dispatcher, references);

    if args.dry_run {
        let prepared = node.prepare(&order, &config.credentials)?;
        tracing::info!(path = %prepared.path, "Dry run, request not sent");
        return print_json(&prepared);
    }

    let records = node.execute(&order, &config.credentials).await?;
    tracing::info!(records = records.len(), "QR order created");
    print_json(&records)
}

/// Writes a value to stdout as pretty-printed JSON.
#[allow(clippy::print_stdout)]
fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
