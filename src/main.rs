//! natterd entry point.

use natterd::config::Config;
use natterd::network::Gateway;
use natterd::state::Hub;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let mut config = Config::load_or_default(CONFIG_PATH).map_err(|e| {
        error!(path = %CONFIG_PATH, error = %e, "Failed to load config");
        e
    })?;

    // A port on the command line overrides the config file.
    if let Some(arg) = std::env::args().nth(1) {
        match arg.parse::<u16>() {
            Ok(port) => config.server.port = port,
            Err(_) => {
                eprintln!("Usage: natterd [port]");
                std::process::exit(1);
            }
        }
    }

    info!(version = env!("CARGO_PKG_VERSION"), "Starting natterd");

    let hub = Arc::new(Hub::new(&config));

    {
        let hub = Arc::clone(&hub);
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for interrupt");
                return;
            }
            info!("Interrupt received, shutting down");
            hub.shutdown();
        });
    }

    let addr = format!("{}:{}", config.server.address, config.server.port);
    Gateway::bind(&addr, Arc::clone(&hub)).await?.run().await?;

    info!("Server stopped");
    Ok(())
}
