// SPDX-License-Identifier: GPL-3.0-only
mod api;
mod config;
mod logging;
mod registry;
mod store;
mod validation;

#[cfg(test)]
mod test_helpers;

use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

use api::HttpServer;
use config::Config;
use logging::setup_logging;
use registry::SpotRegistry;
use store::{SpotStore, SqliteSpotStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    setup_logging(&config.log_level, config.log_format)?;

    info!("Starting parking-control v{}", env!("CARGO_PKG_VERSION"));

    // Initialize store
    let store: Arc<dyn SpotStore> = Arc::new(
        SqliteSpotStore::new(&config.database_path, config.max_connections).await?,
    );
    info!("Spot store initialized at {}", config.database_path.display());

    let registry = SpotRegistry::new(store);

    // Serve until Ctrl+C, letting in-flight requests complete
    let http_server = HttpServer::new(registry, &config);
    if let Err(e) = http_server.serve(shutdown_signal()).await {
        error!(error = %e, "HTTP server error");
        return Err(e);
    }

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Received shutdown signal (Ctrl+C)");
        }
        Err(err) => {
            error!(error = %err, "Unable to listen for shutdown signal");
            // Without a signal handler keep serving
            std::future::pending::<()>().await;
        }
    }
}
