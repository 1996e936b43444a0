//! # Registry Node
//!
//! Entry point for the modular registry service.
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging and metrics
//! 2. Load configuration (file named by `REGISTRY_CONFIG`, env overrides)
//! 3. Bootstrap: leadership strategy, storage, modules, resources
//! 4. Bring the routing layer live (triggers delegated leader election)
//! 5. Run until Ctrl+C or a fatal error

use std::sync::Arc;

use anyhow::{Context, Result};
use registry_node::{bootstrap, ImplementationRegistry, InMemoryRouter};
use registry_telemetry::{init_telemetry, TelemetryConfig};
use registry_types::{fatal_channel, RegistryConfig};
use tracing::{error, info};

const DEFAULT_CONFIG_PATH: &str = "conf/registry.json";

/// Load configuration from file and environment.
fn load_config() -> Result<RegistryConfig> {
    let path =
        std::env::var("REGISTRY_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = RegistryConfig::from_file(&path)
        .with_context(|| format!("Failed to load configuration from {path}"))?;

    if let Ok(url) = std::env::var("REGISTRY_SERVER_URL") {
        config.server_url = url;
    }

    info!(path = %path, modules = config.modules.len(), ha = config.ha_config.is_some(), "Configuration loaded");
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_telemetry(&TelemetryConfig::from_env()).context("Failed to initialize telemetry")?;

    let config = load_config()?;
    let registry = ImplementationRegistry::with_builtins();
    let router = Arc::new(InMemoryRouter::new());
    let (fatal_tx, mut fatal_rx) = fatal_channel();

    let runtime = bootstrap(&config, &registry, router.clone(), fatal_tx)
        .await
        .context("Bootstrap failed")?;
    runtime.status_report();

    // The routing layer goes live on its own task, like a real server would.
    let live_router = Arc::clone(&router);
    let server_url = config.server_url.clone();
    tokio::spawn(async move {
        live_router.go_live(&server_url).await;
    });

    info!("Registry node is running. Press Ctrl+C to stop.");
    tokio::select! {
        Some(err) = fatal_rx.recv() => {
            error!(kind = err.kind(), error = %err, "Fatal error, terminating");
            return Err(anyhow::Error::new(err).context("Registry node cannot continue serving"));
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl+C")?;
        }
    }

    runtime.shutdown().await;
    Ok(())
}
