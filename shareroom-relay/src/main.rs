//! ShareRoom relay server -- room-scoped broadcast relay.
//!
//! An axum WebSocket server that lets clients form named sharing rooms and
//! rebroadcasts multi-part data transfers to every other room member. The
//! relay treats transfer chunks as opaque strings -- it never interprets
//! payload contents.
//!
//! # Usage
//!
//! ```bash
//! # Run on default address 0.0.0.0:5491
//! cargo run --bin shareroom-relay
//!
//! # Run on custom address
//! cargo run --bin shareroom-relay -- --bind 127.0.0.1:8080
//!
//! # Or via environment variable
//! SHAREROOM_ADDR=127.0.0.1:8080 cargo run --bin shareroom-relay
//! ```

use clap::Parser;
use shareroom_relay::config::{RelayCliArgs, RelayConfig};
use shareroom_relay::relay;

#[tokio::main]
async fn main() {
    let cli = RelayCliArgs::parse();

    // Load config from CLI args + config file + env vars + defaults.
    let config = match RelayConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize tracing with the resolved log level.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(addr = %config.bind_addr, "starting shareroom relay server");

    match relay::start_server_with_config(&config.bind_addr, &config).await {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, "relay server listening");
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "relay server task failed");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start relay server");
            std::process::exit(1);
        }
    }
}
