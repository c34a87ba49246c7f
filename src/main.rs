//! Edge gate for the course platform.
//!
//! Sits in front of the web application and decides, per request, whether
//! to forward it or answer with a terminal rejection.
//!
//! ```text
//!     Client Request                                   ┌───────────────┐
//!     ──────────────▶ trace ─▶ request id ─▶ timeout ─▶│  gatekeeper   │
//!                                                      │ origin → rate │
//!                                                      │    → auth     │
//!                                                      └──────┬────────┘
//!                                              pass           │   reject
//!                                   ┌─────────────────────────┴──────▶ 403 / 429 / auth response
//!                                   ▼
//!                            upstream forwarder ─────▶ course application
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use edge_gate::config::{self, watcher::ConfigWatcher};
use edge_gate::http::HttpServer;
use edge_gate::lifecycle::{shutdown_signal, Shutdown};
use edge_gate::observability::{logging, metrics};

#[derive(Parser, Debug)]
#[command(name = "edge-gate")]
#[command(about = "Origin, rate and auth gate in front of the course platform")]
struct Args {
    /// TOML configuration file. Watched for policy changes.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(long)]
    bind: Option<String>,

    /// Override upstream.address.
    #[arg(long)]
    upstream: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = config::load_or_default(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }
    if let Some(upstream) = args.upstream {
        config.upstream.address = upstream;
    }

    logging::init_logging(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "edge-gate starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        allowed_origins = ?config.origins.allowed,
        window_ms = config.rate_limit.window_ms,
        max_requests = config.rate_limit.max_requests,
        auth_mode = ?config.auth.mode,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    // Hot reload of policy sections. The watcher handle must stay alive.
    let (_watcher, config_updates) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        trigger.trigger();
    });

    let server = HttpServer::new(config)?;
    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
