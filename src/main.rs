//! Avasara - registration gateway for the talent registry

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use avasara::{config::Args, server, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("avasara={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Avasara - Registration Gateway");
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("Chain ID: {}", args.chain_id);
    info!("RPC: {}", args.rpc_url);
    if args.local_ledger {
        info!("Contract: (in-process ledger)");
    } else {
        info!("Contract: {}", args.contract_address);
    }
    info!("Registration fee: {} wei", args.registration_fee());
    info!("======================================");

    let state = match AppState::from_args(args) {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize: {}", e);
            std::process::exit(1);
        }
    };
    info!(
        "Backends: contract={} store={} waitlist={}",
        state.backends.contract, state.backends.store, state.backends.waitlist
    );

    server::run(Arc::new(state)).await?;

    Ok(())
}
