//! # Core Data Types
//!
//! This module contains the two leaf data structures of the routing core:
//! the synthetic [`Request`] descriptor and the [`Destination`] endpoint with
//! its admission-control counter.
//!
//! ## Concurrency
//!
//! `Destination` is shared across request-handling tasks as
//! `Arc<Destination>`. Its in-flight counter is an `AtomicUsize` mutated only
//! through `try_admit`/`release`, both implemented as CAS loops so that the
//! check-and-update never races: two concurrent admits can never both succeed
//! for a single remaining capacity slot.

use metrics::{counter, gauge};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// An incoming request to be routed.
///
/// Immutable once constructed; routing takes `&Request` and never mutates it.
/// The `id` is caller-supplied and need not be globally unique, but sticky
/// (hash-routed) routing quality assumes low collision between ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Caller-supplied request identifier
    pub id: String,

    /// The request type used to resolve a service in the registry
    pub request_type: String,

    /// Opaque payload, carried but never inspected by routing
    #[serde(default)]
    pub parameters: HashMap<String, String>,
}

impl Request {
    /// Create a new request with no parameters
    pub fn new<S: Into<String>>(id: S, request_type: S) -> Self {
        Self {
            id: id.into(),
            request_type: request_type.into(),
            parameters: HashMap::new(),
        }
    }

    /// Attach an opaque parameter (builder style)
    pub fn with_parameter<S: Into<String>>(mut self, key: S, value: S) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

/// A routable backend endpoint with bounded concurrent-request capacity.
///
/// Identity within a service is the address string; instances are shared as
/// `Arc<Destination>` between services, rotation queues, and callers holding
/// an admitted slot. Invariant: `0 <= in_flight <= capacity` at all times.
#[derive(Debug)]
pub struct Destination {
    address: String,
    capacity: usize,
    in_flight: AtomicUsize,
}

impl Destination {
    /// Create a new destination with zero in-flight requests.
    ///
    /// A zero-capacity destination is representable but inert (admits
    /// nothing); configuration validation rejects it so one cannot be
    /// shipped by accident.
    pub fn new<S: Into<String>>(address: S, capacity: usize) -> Self {
        Self {
            address: address.into(),
            capacity,
            in_flight: AtomicUsize::new(0),
        }
    }

    /// The destination's address (its identity within a service)
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Maximum number of concurrently admitted requests
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of in-flight requests
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Try to admit one more request.
    ///
    /// Atomically increments the in-flight counter and returns `true` iff it
    /// was below capacity at the moment of the update; otherwise returns
    /// `false` and leaves state unchanged. This is the sole admission gate —
    /// no queueing, no backpressure beyond the boolean.
    pub fn try_admit(&self) -> bool {
        let result = self
            .in_flight
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                if current < self.capacity {
                    Some(current + 1)
                } else {
                    None
                }
            });

        match result {
            Ok(previous) => {
                counter!(
                    "switchyard_admissions_total",
                    "destination" => self.address.clone(),
                    "outcome" => "accepted"
                )
                .increment(1);
                gauge!(
                    "switchyard_destination_in_flight",
                    "destination" => self.address.clone()
                )
                .set((previous + 1) as f64);
                true
            }
            Err(_) => {
                counter!(
                    "switchyard_admissions_total",
                    "destination" => self.address.clone(),
                    "outcome" => "rejected"
                )
                .increment(1);
                false
            }
        }
    }

    /// Release one previously admitted request.
    ///
    /// Atomically decrements the in-flight counter if it is positive. A
    /// release at zero is a silent no-op, so duplicate cleanup calls are
    /// never fatal.
    pub fn release(&self) {
        let result = self
            .in_flight
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                if current > 0 {
                    Some(current - 1)
                } else {
                    None
                }
            });

        if let Ok(previous) = result {
            gauge!(
                "switchyard_destination_in_flight",
                "destination" => self.address.clone()
            )
            .set((previous - 1) as f64);
        }
    }

    /// Point-in-time view of this destination for stats output
    pub fn snapshot(&self) -> DestinationSnapshot {
        DestinationSnapshot {
            address: self.address.clone(),
            capacity: self.capacity,
            in_flight: self.in_flight(),
        }
    }
}

/// Serializable point-in-time state of a destination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationSnapshot {
    pub address: String,
    pub capacity: usize,
    pub in_flight: usize,
}
