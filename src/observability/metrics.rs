//! # Metrics Recorder
//!
//! Installs the Prometheus recorder behind the `metrics` facade. The core
//! records its metrics through `counter!`/`gauge!`/`histogram!` regardless;
//! without an installed recorder those are no-ops.
//!
//! There is no HTTP listener here — transport is out of scope for this
//! crate — so `install_recorder` returns a [`PrometheusHandle`] and the
//! caller renders the exposition text on demand.
//!
//! ## Metric set
//! - `switchyard_route_total{strategy,outcome}` — routing decisions
//! - `switchyard_route_duration_seconds` — selection latency
//! - `switchyard_admissions_total{destination,outcome}` — admission gate
//! - `switchyard_destination_in_flight{destination}` — current load

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

use crate::core::config::MetricsConfig;
use crate::core::error::{RoutingError, RoutingResult};

/// Install the Prometheus recorder if metrics are enabled.
///
/// Returns `None` when disabled. Installation fails if another recorder is
/// already registered for this process.
pub fn init_metrics(config: &MetricsConfig) -> RoutingResult<Option<PrometheusHandle>> {
    if !config.enabled {
        info!("Metrics collection disabled by configuration");
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| RoutingError::config(format!("failed to install metrics recorder: {}", e)))?;

    info!("Prometheus metrics recorder installed");
    Ok(Some(handle))
}
