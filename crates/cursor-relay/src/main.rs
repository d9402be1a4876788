//! cursor-relay — entry point.
//!
//! Serves a single page that tracks the visitor's mouse and relays every
//! cursor position to all other connected visitors over WebSocket.
//!
//! # Usage
//!
//! ```text
//! cursor-relay [OPTIONS]
//!
//! Options:
//!   --config <PATH>  Path to the YAML configuration file
//!                    [default: configuration.yaml]
//!   --port <PORT>    Override the listening port from the configuration
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable              | Default              | Description             |
//! |-----------------------|----------------------|-------------------------|
//! | `CURSOR_RELAY_CONFIG` | `configuration.yaml` | Configuration file path |
//! | `CURSOR_RELAY_PORT`   | from the config file | Listening port          |
//!
//! CLI args take precedence when both are present. The log level is
//! controlled by `RUST_LOG` (e.g. `RUST_LOG=debug`), defaulting to `info`.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cursor_relay::application::Hub;
use cursor_relay::domain::AppConfig;
use cursor_relay::infrastructure::run_server;

/// Cursor relay server.
///
/// Accepts WebSocket connections from browsers and fans each client's cursor
/// position out to every other connected client.
#[derive(Debug, Parser)]
#[command(
    name = "cursor-relay",
    about = "Relays live cursor positions between connected WebSocket clients",
    version
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(
        long,
        default_value = "configuration.yaml",
        env = "CURSOR_RELAY_CONFIG"
    )]
    config: PathBuf,

    /// Override the listening port from the configuration file.
    #[arg(long, env = "CURSOR_RELAY_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;
    if let Some(port) = cli.port {
        config.app.port = port;
    }

    info!("{} starting on port {}", config.app.title, config.app.port);

    // The hub runs for the whole process lifetime; its handle is the only
    // way the serving layer reaches it.
    let hub = Hub::new().spawn();

    run_server(&config, hub).await
}

// ── Tests ─────────────────────────────────────────────────────────────────────
