//! # Registry Telemetry
//!
//! Logging and metrics for the registry node.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use registry_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     init_telemetry(&TelemetryConfig::from_env()).expect("Failed to init telemetry");
//!     // Bootstrap logs and metrics are now being collected
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `REGISTRY_SERVICE_NAME` | `registry-node` | Service name in logs |
//! | `REGISTRY_LOG_LEVEL` | `info` | Log level filter |
//! | `REGISTRY_JSON_LOGS` | `false` | JSON log output |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{encode_metrics, register_metrics};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Initialize metrics and logging.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    // Initialize metrics first (synchronous, no global subscriber involved)
    register_metrics()?;
    init_logging(config)
}
