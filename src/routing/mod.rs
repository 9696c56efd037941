//! Request routing: the pluggable strategies and the router orchestrating
//! resolve -> select over the shared registry.

pub mod router;
pub mod strategies;

pub use router::Router;
pub use strategies::RoutingStrategy;
