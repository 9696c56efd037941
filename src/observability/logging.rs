//! # Structured Logging
//!
//! Tracing subscriber initialization: an `EnvFilter` seeded from the
//! configured level (overridable via `RUST_LOG`) feeding a text or JSON
//! fmt layer. Initialization is tolerant of being called twice — tests and
//! embedding callers may already have installed a subscriber.

use tracing::{info, warn, Level};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry,
};

use crate::core::config::{LogFormat, LoggingConfig};

/// Initialize the global tracing subscriber from configuration.
///
/// Unknown level strings fall back to `info` with a warning after
/// initialization.
pub fn init_logging(config: &LoggingConfig) {
    let (level, unknown_level) = match config.level.to_lowercase().as_str() {
        "trace" => (Level::TRACE, false),
        "debug" => (Level::DEBUG, false),
        "info" => (Level::INFO, false),
        "warn" => (Level::WARN, false),
        "error" => (Level::ERROR, false),
        _ => (Level::INFO, true),
    };

    let env_filter = EnvFilter::from_default_env().add_directive(level.into());

    match config.format {
        LogFormat::Json => {
            let subscriber = Registry::default()
                .with(env_filter)
                .with(fmt::layer().json().with_target(true).with_current_span(true));

            if subscriber.try_init().is_err() {
                warn!("Tracing subscriber already initialized, skipping initialization");
            }
        }
        LogFormat::Text => {
            let subscriber = Registry::default()
                .with(env_filter)
                .with(fmt::layer().with_target(true));

            if subscriber.try_init().is_err() {
                warn!("Tracing subscriber already initialized, skipping initialization");
            }
        }
    }

    if unknown_level {
        warn!(level = %config.level, "Unknown log level, falling back to info");
    }

    info!(level = %level, format = ?config.format, "Structured logging initialized");
}
