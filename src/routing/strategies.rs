//! # Routing Strategies
//!
//! The three selection algorithms behind the [`RoutingStrategy`] enum:
//!
//! 1. **Least-Loaded**: the destination with the fewest in-flight requests
//! 2. **Hash-Routed**: sticky routing by hash of the request id
//! 3. **Round-Robin**: a strict rotation per request type
//!
//! The strategy set is closed: a tagged enum rather than an open trait keeps
//! configuration, dispatch, and metric labels in one place, and selection is
//! a short synchronous critical section with no reason to suspend.
//!
//! All three consume the address-sorted snapshot produced by
//! [`Service::destinations`](crate::registry::Service::destinations), which
//! pins every ordering-sensitive decision (least-loaded tie-breaks,
//! hash indexing, rotation seeding) to a reproducible order.

use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

use crate::core::config::StrategyConfig;
use crate::core::error::{RoutingError, RoutingResult};
use crate::core::types::{Destination, Request};

/// A routing strategy selecting one destination for a request.
///
/// Constructed once (typically per [`Router`](crate::routing::Router)) and
/// safe for concurrent shared use: least-loaded and hash-routed are
/// stateless, round-robin serializes per-request-type rotations through its
/// `DashMap` entry guards.
#[derive(Debug)]
pub enum RoutingStrategy {
    LeastLoaded,
    HashRouted,
    RoundRobin(RotationState),
}

impl RoutingStrategy {
    /// Create a least-loaded strategy
    pub fn least_loaded() -> Self {
        Self::LeastLoaded
    }

    /// Create a hash-routed (sticky) strategy
    pub fn hash_routed() -> Self {
        Self::HashRouted
    }

    /// Create a round-robin strategy with empty rotation state
    pub fn round_robin() -> Self {
        Self::RoundRobin(RotationState::new())
    }

    /// Build the strategy named by configuration
    pub fn from_config(config: StrategyConfig) -> Self {
        match config {
            StrategyConfig::LeastLoaded => Self::least_loaded(),
            StrategyConfig::HashRouted => Self::hash_routed(),
            StrategyConfig::RoundRobin => Self::round_robin(),
        }
    }

    /// The algorithm name for logs and metric labels
    pub fn name(&self) -> &'static str {
        match self {
            Self::LeastLoaded => "least_loaded",
            Self::HashRouted => "hash_routed",
            Self::RoundRobin(_) => "round_robin",
        }
    }

    /// Select a destination for `request` from `destinations`.
    ///
    /// `destinations` must be the address-sorted snapshot of the resolved
    /// service. Fails with `NoDestinations` when there is nothing to choose
    /// from (for round-robin: when a rotation would have to seed from an
    /// empty set).
    pub fn select(
        &self,
        request: &Request,
        destinations: &[Arc<Destination>],
    ) -> RoutingResult<Arc<Destination>> {
        let selected = match self {
            Self::LeastLoaded => select_least_loaded(request, destinations)?,
            Self::HashRouted => select_hash_routed(request, destinations)?,
            Self::RoundRobin(state) => state.select(request, destinations)?,
        };

        debug!(
            request_id = %request.id,
            request_type = %request.request_type,
            destination = %selected.address(),
            algorithm = self.name(),
            "Selected destination"
        );

        Ok(selected)
    }

    /// Reset internal state (useful for testing or reconfiguration).
    ///
    /// For round-robin this drops all rotation queues, so the next select
    /// per request type re-seeds from the live destination set. Stateless
    /// strategies have nothing to reset.
    pub fn reset(&self) {
        if let Self::RoundRobin(state) = self {
            state.reset();
        }
    }
}

/// Least-loaded selection: minimum in-flight count, ties broken by
/// lexicographically smallest address.
///
/// The tie-break makes selection deterministic for any input order instead
/// of leaning on whichever minimum a container happens to yield first.
fn select_least_loaded(
    request: &Request,
    destinations: &[Arc<Destination>],
) -> RoutingResult<Arc<Destination>> {
    destinations
        .iter()
        .min_by_key(|d| (d.in_flight(), d.address().to_string()))
        .cloned()
        .ok_or_else(|| RoutingError::no_destinations(&request.request_type))
}

/// Hash-routed selection: `hash(request.id) mod |destinations|` over the
/// address-sorted snapshot.
///
/// For a fixed (id, destination set) pair the same destination is always
/// chosen — sticky routing without storing any state.
fn select_hash_routed(
    request: &Request,
    destinations: &[Arc<Destination>],
) -> RoutingResult<Arc<Destination>> {
    if destinations.is_empty() {
        return Err(RoutingError::no_destinations(&request.request_type));
    }

    let index = (hash_id(&request.id) % destinations.len() as u64) as usize;
    Ok(Arc::clone(&destinations[index]))
}

/// Hash a request id to u64: SHA-256, first 8 bytes, big-endian.
///
/// Stable across processes and platforms, unlike `DefaultHasher`, so sticky
/// routing survives restarts and mixed deployments.
fn hash_id(id: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(id.as_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[0..8]);
    u64::from_be_bytes(bytes)
}

/// Per-request-type rotation queues for the round-robin strategy.
#[derive(Debug, Default)]
pub struct RotationState {
    queues: DashMap<String, VecDeque<Arc<Destination>>>,
}

impl RotationState {
    fn new() -> Self {
        Self {
            queues: DashMap::new(),
        }
    }

    /// Pop-rotate-push on the queue for the request's type.
    ///
    /// The queue is seeded from the snapshot only when empty (first use, or
    /// after `reset`). Mid-cycle the rotation order is frozen: destinations
    /// added or removed from the service are not reflected until the state
    /// is reset, so every destination present at seed time is visited
    /// exactly once per full cycle. The whole operation happens under the
    /// map entry's exclusive guard, so concurrent selects for one request
    /// type cannot hand out the same destination out of turn.
    fn select(
        &self,
        request: &Request,
        destinations: &[Arc<Destination>],
    ) -> RoutingResult<Arc<Destination>> {
        let mut queue = self
            .queues
            .entry(request.request_type.clone())
            .or_default();

        if queue.is_empty() {
            if destinations.is_empty() {
                return Err(RoutingError::no_destinations(&request.request_type));
            }
            queue.extend(destinations.iter().cloned());
            debug!(
                request_type = %request.request_type,
                destinations = queue.len(),
                "Seeded round-robin rotation"
            );
        }

        // Queue is non-empty here; rotation keeps it that way.
        let destination = queue.pop_front().ok_or_else(|| {
            RoutingError::no_destinations(&request.request_type)
        })?;
        queue.push_back(Arc::clone(&destination));
        Ok(destination)
    }

    fn reset(&self) {
        self.queues.clear();
    }
}
