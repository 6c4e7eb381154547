//! Edge relay (v1)
//!
//! Authentication-forwarding gateway for the file and identity services.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client ──▶ request-id ─▶ trace ─▶ timeout ─▶ body limit
//!                                                     │
//!                                                     ▼
//!                                  CORS ─▶ session ───┼──▶ identity service
//!                                                     │    (ValidateJWT)
//!                                                     ▼
//!                                                 handlers
//!                                                     │
//!                          classify (extension, magic bytes)
//!                                                     │
//!                                                     ▼
//!                                             storage service
//!                                      (save, replace, delete, from-url)
//! ```

use std::path::PathBuf;

use clap::Parser;

use edge_relay::config::{load_config, GatewayConfig};
use edge_relay::lifecycle::{forward_signals, launch, Shutdown};
use edge_relay::observability::logging;

#[derive(Parser)]
#[command(name = "edge-relay")]
#[command(about = "Session-validating gateway for the file and identity services", long_about = None)]
struct Args {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    logging::init(&config.observability);
    tracing::info!("edge-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        identity = %config.identity.base_url,
        storage = %config.storage.base_url,
        inbound_timeout_secs = config.timeouts.inbound_secs,
        outbound_timeout_secs = config.timeouts.outbound_secs,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    tokio::spawn(forward_signals(shutdown.clone()));

    launch(config, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
