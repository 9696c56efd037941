//! # Configuration Module
//!
//! Configuration management for the routing core: the destination pool,
//! service definitions, the active routing strategy, and observability
//! settings.
//!
//! ## Key Features
//! - YAML/JSON configuration parsing with serde
//! - Environment variable override support (`SWITCHYARD_*`)
//! - Comprehensive validation with all problems collected before failing
//! - A built-in default fleet so the binary runs without any config file

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use crate::core::error::{RoutingError, RoutingResult};

/// Complete configuration for the routing core.
///
/// Destinations are declared once in a shared pool and referenced by address
/// from service definitions, so a destination can belong to several services
/// without being declared (or counted) twice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchyardConfig {
    /// The shared destination pool, unique by address
    pub destinations: Vec<DestinationConfig>,

    /// Request type -> service definition
    pub services: HashMap<String, ServiceConfig>,

    /// The default routing strategy
    #[serde(default)]
    pub strategy: StrategyConfig,

    /// Logging and metrics settings
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// One destination in the shared pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationConfig {
    /// Address, unique within the pool
    pub address: String,

    /// Maximum concurrent requests this destination will admit
    pub capacity: usize,
}

/// A service definition referencing destinations from the pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name; defaults to the request type it is registered under.
    /// Two entries naming the same service share one service instance.
    #[serde(default)]
    pub name: Option<String>,

    /// Addresses of pool destinations that serve this request type
    pub destinations: Vec<String>,
}

/// The routing strategy selected at router construction time.
///
/// A closed set of variants rather than an open trait: the three algorithms
/// are the whole design space here, and a tagged enum keeps configuration,
/// dispatch, and metric labels in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyConfig {
    /// Route to the destination with the fewest in-flight requests
    LeastLoaded,
    /// Route by hash of the request id (sticky routing)
    HashRouted,
    /// Rotate through destinations in a fixed cycle per request type
    RoundRobin,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self::LeastLoaded
    }
}

impl StrategyConfig {
    /// Stable name used in logs, metric labels, and env overrides
    pub fn name(&self) -> &'static str {
        match self {
            Self::LeastLoaded => "least_loaded",
            Self::HashRouted => "hash_routed",
            Self::RoundRobin => "round_robin",
        }
    }
}

impl FromStr for StrategyConfig {
    type Err = RoutingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "least_loaded" => Ok(Self::LeastLoaded),
            "hash_routed" => Ok(Self::HashRouted),
            "round_robin" => Ok(Self::RoundRobin),
            other => Err(RoutingError::config(format!(
                "unknown strategy '{}' (expected least_loaded, hash_routed or round_robin)",
                other
            ))),
        }
    }
}

/// Observability settings (logging and metrics)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error (unknown values fall back
    /// to info with a warning)
    pub level: String,

    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = RoutingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(RoutingError::config(format!(
                "unknown log format '{}' (expected text or json)",
                other
            ))),
        }
    }
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Whether to install the Prometheus recorder at startup
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl SwitchyardConfig {
    /// Load configuration from a YAML file
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> RoutingResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| RoutingError::config(format!("failed to read config file: {}", e)))?;

        let mut config: SwitchyardConfig = serde_yaml::from_str(&content)
            .map_err(|e| RoutingError::config(format!("failed to parse config: {}", e)))?;

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub async fn load_from_json<P: AsRef<Path>>(path: P) -> RoutingResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| RoutingError::config(format!("failed to read config file: {}", e)))?;

        let mut config: SwitchyardConfig = serde_json::from_str(&content)
            .map_err(|e| RoutingError::config(format!("failed to parse JSON config: {}", e)))?;

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `SWITCHYARD_*` environment variable overrides
    pub fn apply_env_overrides(&mut self) -> RoutingResult<()> {
        use std::env;

        if let Ok(level) = env::var("SWITCHYARD_LOG_LEVEL") {
            self.observability.logging.level = level;
        }

        if let Ok(format) = env::var("SWITCHYARD_LOG_FORMAT") {
            self.observability.logging.format = format
                .parse()
                .map_err(|_| RoutingError::config(format!("invalid SWITCHYARD_LOG_FORMAT: {}", format)))?;
        }

        if let Ok(strategy) = env::var("SWITCHYARD_STRATEGY") {
            self.strategy = strategy
                .parse()
                .map_err(|_| RoutingError::config(format!("invalid SWITCHYARD_STRATEGY: {}", strategy)))?;
        }

        if let Ok(enabled) = env::var("SWITCHYARD_METRICS_ENABLED") {
            self.observability.metrics.enabled = enabled
                .parse()
                .map_err(|e| RoutingError::config(format!("invalid SWITCHYARD_METRICS_ENABLED: {}", e)))?;
        }

        Ok(())
    }

    /// Validate the configuration, collecting all problems before failing
    pub fn validate(&self) -> RoutingResult<()> {
        let mut errors = Vec::new();

        if self.destinations.is_empty() {
            errors.push("destination pool is empty".to_string());
        }

        let mut seen = std::collections::HashSet::new();
        for dest in &self.destinations {
            if dest.address.is_empty() {
                errors.push("destination with empty address".to_string());
            }
            if dest.capacity == 0 {
                errors.push(format!(
                    "destination '{}' has zero capacity",
                    dest.address
                ));
            }
            if !seen.insert(dest.address.as_str()) {
                errors.push(format!(
                    "duplicate destination address '{}' in pool",
                    dest.address
                ));
            }
        }

        if self.services.is_empty() {
            errors.push("no services defined".to_string());
        }

        for (request_type, service) in &self.services {
            if service.destinations.is_empty() {
                errors.push(format!(
                    "service for request type '{}' has no destinations",
                    request_type
                ));
            }
            for address in &service.destinations {
                if !seen.contains(address.as_str()) {
                    errors.push(format!(
                        "service for request type '{}' references unknown destination '{}'",
                        request_type, address
                    ));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(RoutingError::config(errors.join("; ")))
        }
    }
}

impl Default for SwitchyardConfig {
    /// The demo fleet: three HTTP destinations with capacities 12, 20 and 15
    fn default() -> Self {
        Self {
            destinations: vec![
                DestinationConfig {
                    address: "192.168.0.1".to_string(),
                    capacity: 12,
                },
                DestinationConfig {
                    address: "192.168.0.2".to_string(),
                    capacity: 20,
                },
                DestinationConfig {
                    address: "192.168.0.3".to_string(),
                    capacity: 15,
                },
            ],
            services: HashMap::from([(
                "http".to_string(),
                ServiceConfig {
                    name: Some("http-service".to_string()),
                    destinations: vec![
                        "192.168.0.1".to_string(),
                        "192.168.0.2".to_string(),
                        "192.168.0.3".to_string(),
                    ],
                },
            )]),
            strategy: StrategyConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}
