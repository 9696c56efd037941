//! # Router Module
//!
//! The orchestrator tying the registry and a strategy together: resolve the
//! service for a request's type, snapshot its destinations, delegate
//! selection to the strategy, and hand the chosen destination back.
//!
//! Routing is deliberately decoupled from admission. `route` never calls
//! `try_admit`: the caller inspects or logs the chosen destination and then
//! commits load to it as a separate step, so a routing success does not
//! guarantee admission success (the two-phase "route, then accept" flow).

use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::core::error::RoutingResult;
use crate::core::types::{Destination, Request};
use crate::registry::ServiceRegistry;
use crate::routing::strategies::RoutingStrategy;

/// Routes requests to destinations using a fixed strategy.
///
/// Holds the shared registry by `Arc`; several routers with different
/// strategies can operate over the same fleet and observe a consistent view
/// of registered services. `Send + Sync`, safe for concurrent shared use.
#[derive(Debug)]
pub struct Router {
    registry: Arc<ServiceRegistry>,
    strategy: RoutingStrategy,
}

impl Router {
    /// Create a router over a shared registry with the given strategy.
    ///
    /// The strategy is fixed at construction; build one router per strategy
    /// when callers need to pick between algorithms at runtime.
    pub fn new(registry: Arc<ServiceRegistry>, strategy: RoutingStrategy) -> Self {
        Self { registry, strategy }
    }

    /// The active strategy's name for logs and display
    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// The shared registry this router operates on
    pub fn registry(&self) -> &Arc<ServiceRegistry> {
        &self.registry
    }

    /// Route a request to a destination without admitting it.
    ///
    /// Fails with `ServiceNotFound` for an unregistered request type and
    /// `NoDestinations` for a service with an empty destination set. The
    /// returned destination has NOT been admitted; callers invoke
    /// [`Destination::try_admit`] themselves and later
    /// [`Destination::release`].
    pub fn route(&self, request: &Request) -> RoutingResult<Arc<Destination>> {
        let start = Instant::now();
        let result = self.route_inner(request);
        histogram!("switchyard_route_duration_seconds").record(start.elapsed().as_secs_f64());

        match &result {
            Ok(destination) => {
                counter!(
                    "switchyard_route_total",
                    "strategy" => self.strategy.name(),
                    "outcome" => "selected"
                )
                .increment(1);
                debug!(
                    request_id = %request.id,
                    request_type = %request.request_type,
                    destination = %destination.address(),
                    strategy = self.strategy.name(),
                    "Routed request"
                );
            }
            Err(e) => {
                counter!(
                    "switchyard_route_total",
                    "strategy" => self.strategy.name(),
                    "outcome" => e.error_type()
                )
                .increment(1);
                warn!(
                    request_id = %request.id,
                    request_type = %request.request_type,
                    strategy = self.strategy.name(),
                    error = %e,
                    "Routing failed"
                );
            }
        }

        result
    }

    fn route_inner(&self, request: &Request) -> RoutingResult<Arc<Destination>> {
        let service = self.registry.resolve(&request.request_type)?;
        let destinations = service.destinations();
        self.strategy.select(request, &destinations)
    }

    /// Reset the strategy's internal state (round-robin rotations)
    pub fn reset(&self) {
        self.strategy.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Service;

    fn registry_with(addresses: &[(&str, usize)]) -> Arc<ServiceRegistry> {
        let service = Arc::new(Service::new("http-service"));
        for (address, capacity) in addresses {
            service.add(Arc::new(Destination::new(*address, *capacity)));
        }
        let registry = Arc::new(ServiceRegistry::new());
        registry.register("http", service);
        registry
    }

    #[test]
    fn test_route_resolves_and_selects() {
        let registry = registry_with(&[("192.168.0.1", 12), ("192.168.0.2", 20)]);
        let router = Router::new(registry, RoutingStrategy::least_loaded());

        let destination = router.route(&Request::new("REQ1", "http")).unwrap();
        assert_eq!(destination.address(), "192.168.0.1");
    }

    #[test]
    fn test_route_unknown_type_fails() {
        let registry = registry_with(&[("192.168.0.1", 12)]);
        let router = Router::new(registry, RoutingStrategy::least_loaded());

        let err = router.route(&Request::new("REQ1", "smtp")).unwrap_err();
        assert_eq!(err.error_type(), "service_not_found");
    }

    #[test]
    fn test_route_empty_service_fails() {
        let registry = Arc::new(ServiceRegistry::new());
        registry.register("http", Arc::new(Service::new("hollow")));
        let router = Router::new(registry, RoutingStrategy::round_robin());

        let err = router.route(&Request::new("REQ1", "http")).unwrap_err();
        assert_eq!(err.error_type(), "no_destinations");
    }

    #[test]
    fn test_route_does_not_admit() {
        let registry = registry_with(&[("192.168.0.1", 1)]);
        let router = Router::new(registry, RoutingStrategy::least_loaded());

        let destination = router.route(&Request::new("REQ1", "http")).unwrap();
        assert_eq!(destination.in_flight(), 0);

        // Admission is the caller's separate step, and can fail even after
        // routing succeeded.
        assert!(destination.try_admit());
        let again = router.route(&Request::new("REQ2", "http")).unwrap();
        assert!(!again.try_admit());
    }

    #[test]
    fn test_routers_share_registry_view() {
        let registry = registry_with(&[("192.168.0.1", 12)]);
        let least = Router::new(Arc::clone(&registry), RoutingStrategy::least_loaded());
        let robin = Router::new(Arc::clone(&registry), RoutingStrategy::round_robin());

        // A service registered after construction is visible to both
        let late = Arc::new(Service::new("late"));
        late.add(Arc::new(Destination::new("10.0.0.1", 2)));
        registry.register("grpc", late);

        assert!(least.route(&Request::new("REQ1", "grpc")).is_ok());
        assert!(robin.route(&Request::new("REQ1", "grpc")).is_ok());
    }
}
