//! Prometheus metrics for the bootstrap subsystem.
//!
//! All metrics follow the naming convention: `registry_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Gauge, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Metrics registry for the registry node
    pub static ref REGISTRY: Registry = Registry::new();

    /// Modules successfully activated and wired
    pub static ref MODULES_ACTIVATED: Counter = Counter::new(
        "registry_modules_activated_total",
        "Total number of modules activated during bootstrap"
    ).expect("metric creation failed");

    /// Resources handed to the routing layer
    pub static ref RESOURCES_REGISTERED: Counter = Counter::new(
        "registry_resources_registered_total",
        "Total number of module resources registered with the routing layer"
    ).expect("metric creation failed");

    /// Fatal bootstrap failures by kind
    pub static ref BOOTSTRAP_FAILURES: CounterVec = CounterVec::new(
        Opts::new("registry_bootstrap_failures_total", "Fatal bootstrap failures by kind"),
        &["kind"]  // configuration/resolution/initialization/participation/registration
    ).expect("metric creation failed");

    /// 1 once a leadership participant has been published
    pub static ref LEADERSHIP_PUBLISHED: Gauge = Gauge::new(
        "registry_leadership_published",
        "Whether the leadership reference holds a participant"
    ).expect("metric creation failed");
}

/// Register all metrics with [`REGISTRY`].
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(MODULES_ACTIVATED.clone()),
        Box::new(RESOURCES_REGISTERED.clone()),
        Box::new(BOOTSTRAP_FAILURES.clone()),
        Box::new(LEADERSHIP_PUBLISHED.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }
    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_encode() {
        // May fail if already registered, which is fine
        let _ = register_metrics();
        MODULES_ACTIVATED.inc();
        BOOTSTRAP_FAILURES.with_label_values(&["resolution"]).inc();

        let text = encode_metrics().unwrap();
        assert!(text.contains("registry_modules_activated_total"));
        assert!(text.contains("kind=\"resolution\""));
    }

    #[test]
    fn test_gauge_set() {
        LEADERSHIP_PUBLISHED.set(1.0);
        assert_eq!(LEADERSHIP_PUBLISHED.get(), 1.0);
    }
}
