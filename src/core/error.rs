//! # Error Handling Module
//!
//! This module defines the error taxonomy for the routing core using the
//! `thiserror` crate. The two routing failures (`ServiceNotFound`,
//! `NoDestinations`) are expected, recoverable conditions that callers report
//! per request; the remaining variants cover configuration and I/O edges.
//!
//! All errors are plain data (`Clone`-able, `String` payloads), so they can be
//! stored, logged, and turned into metric labels without lifetime gymnastics.

use thiserror::Error;

/// Main result type used throughout the routing core.
///
/// Type alias so call sites can write `RoutingResult<T>` instead of
/// `Result<T, RoutingError>` everywhere.
pub type RoutingResult<T> = Result<T, RoutingError>;

/// All failure modes of the routing core.
///
/// The `#[error("...")]` attribute from `thiserror` implements `Display`
/// with the given message for each variant.
#[derive(Debug, Error, Clone)]
pub enum RoutingError {
    /// No service is registered for the request type on the request.
    #[error("no service registered for request type: {request_type}")]
    ServiceNotFound { request_type: String },

    /// The resolved service has zero destinations at selection time.
    #[error("no destinations available for request type: {request_type}")]
    NoDestinations { request_type: String },

    /// Configuration-related errors (invalid config, missing references, etc.)
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// I/O errors (reading configuration files, stdin, etc.)
    #[error("I/O error: {message}")]
    Io { message: String },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json { message: String },

    /// YAML parsing errors for configuration files
    #[error("YAML error: {message}")]
    Yaml { message: String },
}

impl RoutingError {
    /// Create a `ServiceNotFound` error for the given request type
    pub fn service_not_found<S: Into<String>>(request_type: S) -> Self {
        Self::ServiceNotFound {
            request_type: request_type.into(),
        }
    }

    /// Create a `NoDestinations` error for the given request type
    pub fn no_destinations<S: Into<String>>(request_type: S) -> Self {
        Self::NoDestinations {
            request_type: request_type.into(),
        }
    }

    /// Create a configuration error with a custom message
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Get a string representation of the error type for metric labels
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::ServiceNotFound { .. } => "service_not_found",
            Self::NoDestinations { .. } => "no_destinations",
            Self::Configuration { .. } => "configuration_error",
            Self::Io { .. } => "io_error",
            Self::Json { .. } => "json_error",
            Self::Yaml { .. } => "yaml_error",
        }
    }

    /// Check if this error should be retried
    ///
    /// `NoDestinations` is transient (a destination may be added, or a frozen
    /// rotation reset). Retry policy itself is a caller decision: the core
    /// never retries internally.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NoDestinations { .. })
    }
}

impl From<std::io::Error> for RoutingError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for RoutingError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for RoutingError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Yaml {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            RoutingError::service_not_found("grpc").to_string(),
            "no service registered for request type: grpc"
        );
        assert_eq!(
            RoutingError::no_destinations("http").to_string(),
            "no destinations available for request type: http"
        );
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            RoutingError::service_not_found("http").error_type(),
            "service_not_found"
        );
        assert_eq!(
            RoutingError::no_destinations("http").error_type(),
            "no_destinations"
        );
        assert_eq!(
            RoutingError::config("bad fleet").error_type(),
            "configuration_error"
        );
    }

    #[test]
    fn test_retryable_errors() {
        assert!(RoutingError::no_destinations("http").is_retryable());
        assert!(!RoutingError::service_not_found("http").is_retryable());
        assert!(!RoutingError::config("bad fleet").is_retryable());
    }

    #[test]
    fn test_io_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: RoutingError = io_err.into();
        assert_eq!(err.error_type(), "io_error");
    }
}
