//! # Service Registry
//!
//! This module maps request types to services and services to their
//! destination sets. One registry instance is shared (via `Arc`) by every
//! router operating on the same fleet, so all strategies observe a
//! consistent view of what is registered.
//!
//! ## Concurrency
//!
//! Registrations are rare administrative operations; lookups happen on every
//! routed request. The registry uses `DashMap` so concurrent lookups do not
//! block each other, and each service guards its destination set with a
//! `parking_lot::RwLock` held only long enough to take a snapshot.
//!
//! ## Ordering
//!
//! Destination sets are kept in a `BTreeMap` keyed by address. Every snapshot
//! is therefore address-sorted, which pins the enumeration order that the
//! hash-routed and round-robin strategies depend on: selection never varies
//! with registration order or incidental container iteration.

use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

use crate::core::config::SwitchyardConfig;
use crate::core::error::{RoutingError, RoutingResult};
use crate::core::types::{Destination, DestinationSnapshot};

/// A named group of destinations collectively handling one request type.
///
/// Destinations are keyed by address: a destination either appears once or
/// not at all, and adds/removes are idempotent.
#[derive(Debug)]
pub struct Service {
    name: String,
    destinations: RwLock<BTreeMap<String, Arc<Destination>>>,
}

impl Service {
    /// Create an empty service
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            destinations: RwLock::new(BTreeMap::new()),
        }
    }

    /// The service name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a destination. Adding an address that is already present replaces
    /// it; no error either way.
    pub fn add(&self, destination: Arc<Destination>) {
        let mut destinations = self.destinations.write();
        destinations.insert(destination.address().to_string(), destination);
    }

    /// Remove a destination by address. Removing an absent address is a
    /// no-op.
    pub fn remove(&self, address: &str) {
        let mut destinations = self.destinations.write();
        destinations.remove(address);
    }

    /// Address-sorted snapshot of the current destination set.
    ///
    /// The sort order comes from the `BTreeMap` keys, so it is stable across
    /// registration order and add/remove churn.
    pub fn destinations(&self) -> Vec<Arc<Destination>> {
        let destinations = self.destinations.read();
        destinations.values().cloned().collect()
    }

    /// Number of destinations currently in the set
    pub fn len(&self) -> usize {
        self.destinations.read().len()
    }

    /// Whether the service has no destinations
    pub fn is_empty(&self) -> bool {
        self.destinations.read().is_empty()
    }
}

/// Maps request types to services.
///
/// Shared by all routers; lookups are lock-free reads on the `DashMap`
/// shards, registrations are last-write-wins.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    services: DashMap<String, Arc<Service>>,
}

impl ServiceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            services: DashMap::new(),
        }
    }

    /// Register a service for a request type, overwriting any prior mapping.
    ///
    /// Several request types may map to the same service instance.
    pub fn register<S: Into<String>>(&self, request_type: S, service: Arc<Service>) {
        let request_type = request_type.into();
        info!(
            request_type = %request_type,
            service = %service.name(),
            destinations = service.len(),
            "Registered service"
        );
        self.services.insert(request_type, service);
    }

    /// Remove the mapping for a request type. Absent types are a no-op.
    pub fn deregister(&self, request_type: &str) {
        if self.services.remove(request_type).is_some() {
            debug!(request_type = %request_type, "Deregistered service");
        }
    }

    /// Resolve the service for a request type.
    ///
    /// The single lookup every strategy routes its failures through: an
    /// unregistered type fails with `ServiceNotFound`.
    pub fn resolve(&self, request_type: &str) -> RoutingResult<Arc<Service>> {
        self.services
            .get(request_type)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| RoutingError::service_not_found(request_type))
    }

    /// All registered request types, sorted
    pub fn request_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.services.iter().map(|e| e.key().clone()).collect();
        types.sort();
        types
    }

    /// Point-in-time registry statistics for stats output.
    ///
    /// Destinations shared between services are counted once, by address.
    pub fn stats(&self) -> RegistryStats {
        let mut seen: HashMap<String, DestinationSnapshot> = HashMap::new();
        for entry in self.services.iter() {
            for dest in entry.value().destinations() {
                seen.entry(dest.address().to_string())
                    .or_insert_with(|| dest.snapshot());
            }
        }

        let mut destinations: Vec<DestinationSnapshot> = seen.into_values().collect();
        destinations.sort_by(|a, b| a.address.cmp(&b.address));

        RegistryStats {
            services: self.services.len(),
            total_capacity: destinations.iter().map(|d| d.capacity).sum(),
            total_in_flight: destinations.iter().map(|d| d.in_flight).sum(),
            destinations,
        }
    }

    /// Build a registry from configuration.
    ///
    /// The destination pool is instantiated once; services reference pool
    /// destinations by address, and two config entries naming the same
    /// service share a single `Service` instance. The configuration is
    /// assumed validated (`SwitchyardConfig::validate`), but dangling
    /// references still fail here rather than panic.
    pub fn from_config(config: &SwitchyardConfig) -> RoutingResult<Self> {
        let mut pool: HashMap<&str, Arc<Destination>> = HashMap::new();
        for dest in &config.destinations {
            pool.insert(
                dest.address.as_str(),
                Arc::new(Destination::new(dest.address.clone(), dest.capacity)),
            );
        }

        let registry = Self::new();
        let mut by_name: HashMap<String, Arc<Service>> = HashMap::new();

        // Deterministic registration order for reproducible startup logs
        let mut request_types: Vec<&String> = config.services.keys().collect();
        request_types.sort();

        for request_type in request_types {
            let service_config = &config.services[request_type];
            let name = service_config
                .name
                .clone()
                .unwrap_or_else(|| request_type.clone());

            let service = by_name
                .entry(name.clone())
                .or_insert_with(|| Arc::new(Service::new(name)))
                .clone();

            for address in &service_config.destinations {
                let destination = pool.get(address.as_str()).ok_or_else(|| {
                    RoutingError::config(format!(
                        "service for request type '{}' references unknown destination '{}'",
                        request_type, address
                    ))
                })?;
                service.add(Arc::clone(destination));
            }

            registry.register(request_type.clone(), service);
        }

        Ok(registry)
    }
}

/// Serializable registry statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryStats {
    pub services: usize,
    pub total_capacity: usize,
    pub total_in_flight: usize,
    pub destinations: Vec<DestinationSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dest(address: &str, capacity: usize) -> Arc<Destination> {
        Arc::new(Destination::new(address, capacity))
    }

    #[test]
    fn test_add_is_idempotent_by_address() {
        let service = Service::new("web");
        service.add(dest("10.0.0.1", 5));
        service.add(dest("10.0.0.1", 9));
        assert_eq!(service.len(), 1);

        // Last add wins
        assert_eq!(service.destinations()[0].capacity(), 9);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let service = Service::new("web");
        service.add(dest("10.0.0.1", 5));
        service.remove("10.0.0.99");
        assert_eq!(service.len(), 1);
        service.remove("10.0.0.1");
        assert!(service.is_empty());
    }

    #[test]
    fn test_snapshot_is_address_sorted() {
        let service = Service::new("web");
        // Deliberately inserted out of order
        service.add(dest("10.0.0.3", 1));
        service.add(dest("10.0.0.1", 1));
        service.add(dest("10.0.0.2", 1));

        let addresses: Vec<String> = service
            .destinations()
            .iter()
            .map(|d| d.address().to_string())
            .collect();
        assert_eq!(addresses, vec!["10.0.0.1", "10.0.0.2", "10.0.0.3"]);
    }

    #[test]
    fn test_resolve_unregistered_type_fails() {
        let registry = ServiceRegistry::new();
        let err = registry.resolve("grpc").unwrap_err();
        assert_eq!(err.error_type(), "service_not_found");
    }

    #[test]
    fn test_register_is_last_write_wins() {
        let registry = ServiceRegistry::new();
        let first = Arc::new(Service::new("first"));
        let second = Arc::new(Service::new("second"));

        registry.register("http", first);
        registry.register("http", second);

        assert_eq!(registry.resolve("http").unwrap().name(), "second");
        assert_eq!(registry.request_types(), vec!["http".to_string()]);
    }

    #[test]
    fn test_from_config_builds_shared_pool() {
        let config = SwitchyardConfig::default();
        let registry = ServiceRegistry::from_config(&config).unwrap();

        let service = registry.resolve("http").unwrap();
        assert_eq!(service.name(), "http-service");
        assert_eq!(service.len(), 3);

        let stats = registry.stats();
        assert_eq!(stats.services, 1);
        assert_eq!(stats.total_capacity, 12 + 20 + 15);
        assert_eq!(stats.total_in_flight, 0);
    }

    #[test]
    fn test_shared_service_between_request_types() {
        use crate::core::config::{DestinationConfig, ServiceConfig};
        use std::collections::HashMap;

        let config = SwitchyardConfig {
            destinations: vec![DestinationConfig {
                address: "10.0.0.1".to_string(),
                capacity: 4,
            }],
            services: HashMap::from([
                (
                    "http".to_string(),
                    ServiceConfig {
                        name: Some("edge".to_string()),
                        destinations: vec!["10.0.0.1".to_string()],
                    },
                ),
                (
                    "grpc".to_string(),
                    ServiceConfig {
                        name: Some("edge".to_string()),
                        destinations: vec!["10.0.0.1".to_string()],
                    },
                ),
            ]),
            strategy: Default::default(),
            observability: Default::default(),
        };

        let registry = ServiceRegistry::from_config(&config).unwrap();
        let http = registry.resolve("http").unwrap();
        let grpc = registry.resolve("grpc").unwrap();
        assert!(Arc::ptr_eq(&http, &grpc));

        // The shared destination is counted once in stats
        let stats = registry.stats();
        assert_eq!(stats.destinations.len(), 1);
        assert_eq!(stats.total_capacity, 4);
    }

    #[test]
    fn test_stats_track_in_flight() {
        let registry = ServiceRegistry::from_config(&SwitchyardConfig::default()).unwrap();
        let service = registry.resolve("http").unwrap();
        let destinations = service.destinations();

        assert!(destinations[0].try_admit());
        assert!(destinations[1].try_admit());

        assert_eq!(registry.stats().total_in_flight, 2);
        destinations[0].release();
        destinations[1].release();
        assert_eq!(registry.stats().total_in_flight, 0);
    }
}
