//! Observability: structured logging initialization and the Prometheus
//! metrics recorder.

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
pub use metrics::init_metrics;
