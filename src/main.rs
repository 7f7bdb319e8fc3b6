//! Gasless voting relay (v1)
//!
//! Accepts signed votes over HTTP and submits them on-chain, paying gas
//! from a single relayer account.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────────┐
//!                       │                  BALLOT RELAY                    │
//!                       │                                                  │
//!   Signed vote         │  ┌─────────┐   ┌──────────┐   ┌──────────────┐   │
//!   ────────────────────┼─▶│  http   │──▶│ registry │──▶│   verifier   │   │
//!                       │  │ server  │   │ position │   │ sig + nonce  │◀──┼── getNonce
//!                       │  └─────────┘   └──────────┘   └──────┬───────┘   │
//!                       │                                      │           │
//!                       │                                      ▼           │
//!   Transaction hash    │  ┌─────────┐                  ┌──────────────┐   │
//!   ◀───────────────────┼──│response │◀─────────────────│  submitter   │───┼─▶ executeMeta
//!                       │  └─────────┘                  │ relayer key  │   │   Transaction
//!                       │                               └──────────────┘   │
//!                       │  config · health · observability · security      │
//!                       │  lifecycle (startup / signals / shutdown)        │
//!                       └──────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use ballot_relay::config::load_config;
use ballot_relay::lifecycle;
use ballot_relay::observability::init_logging;

#[derive(Parser)]
#[command(name = "ballot-relay")]
#[command(about = "Gasless voting meta-transaction relay", long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "relay.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config(&args.config)?;
    init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %args.config.display(),
        bind_address = %config.listener.bind_address,
        chain_id = config.chain.chain_id,
        "ballot-relay starting"
    );

    lifecycle::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
