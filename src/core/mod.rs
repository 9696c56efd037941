//! Core building blocks: error types, configuration, and the leaf data
//! structures (requests and destinations) used throughout the crate.

pub mod config;
pub mod error;
pub mod types;
