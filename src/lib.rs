//! # Switchyard - Request Routing Core
//!
//! A pluggable request-routing core: incoming requests tagged with a request
//! type are switched onto one of several backend destinations registered for
//! that type, using an interchangeable routing strategy, with per-destination
//! in-flight load tracked for admission control.
//!
//! ## Architecture Overview
//!
//! - `core`: error types, configuration, and the leaf data structures
//!   ([`Request`], [`Destination`] with its admission counter)
//! - `registry`: [`Service`] destination sets and the shared
//!   [`ServiceRegistry`] mapping request types to services
//! - `routing`: the three [`RoutingStrategy`] algorithms and the [`Router`]
//!   orchestrating resolve -> select
//! - `observability`: tracing initialization and the Prometheus recorder
//!
//! ## Two-Phase Routing
//!
//! Routing and admission are decoupled. [`Router::route`] returns the chosen
//! destination without committing load to it; the caller invokes
//! [`Destination::try_admit`] as a separate step and later
//! [`Destination::release`]:
//!
//! ```
//! use std::sync::Arc;
//! use switchyard::{Request, Router, RoutingStrategy, ServiceRegistry, SwitchyardConfig};
//!
//! # fn main() -> switchyard::RoutingResult<()> {
//! let registry = Arc::new(ServiceRegistry::from_config(&SwitchyardConfig::default())?);
//! let router = Router::new(registry, RoutingStrategy::least_loaded());
//!
//! let request = Request::new("REQ1", "http");
//! let destination = router.route(&request)?;
//! if destination.try_admit() {
//!     // ... handle the request ...
//!     destination.release();
//! }
//! # Ok(())
//! # }
//! ```

/// Error types, configuration, and core data structures
pub mod core;

/// Logging and metrics initialization
pub mod observability;

/// Services and the request-type registry
pub mod registry;

/// Routing strategies and the router orchestrator
pub mod routing;

// Re-export the types callers touch directly, so `use switchyard::Router`
// works without knowing the module tree.
pub use crate::core::config::{LogFormat, StrategyConfig, SwitchyardConfig};
pub use crate::core::error::{RoutingError, RoutingResult};
pub use crate::core::types::{Destination, DestinationSnapshot, Request};
pub use crate::registry::{RegistryStats, Service, ServiceRegistry};
pub use crate::routing::router::Router;
pub use crate::routing::strategies::RoutingStrategy;
