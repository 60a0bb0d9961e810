//! Admin runtime entry point.
//!
//! 1. Initialize logging (`RUST_LOG`, `AH_LOG_FORMAT=json`)
//! 2. Load configuration (defaults, `AH_CONFIG` file, `AH_*` overrides)
//! 3. Open storage and migrate lot documents
//! 4. Serve the admin API until Ctrl+C or SIGTERM

use admin_runtime::{AdminRuntime, RuntimeConfig};
use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("AH_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {e}"))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    info!("===========================================");
    info!("  Auction Admin Runtime v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let config = RuntimeConfig::load().context("Failed to load configuration")?;
    let runtime = AdminRuntime::open(config)?;

    info!(addr = %runtime.api().config().http_addr(), "Admin API ready. Press Ctrl+C to stop.");
    runtime.run(shutdown_signal()).await?;

    info!("Shutdown complete");
    Ok(())
}
