//! Common error types for telemetry backends

use thiserror::Error;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors that can occur in telemetry backends
#[derive(Debug, Error)]
pub enum BackendError {
    /// No backend is registered or configured for the requested concern
    #[error("Backend not configured: {0}")]
    NotConfigured(String),

    /// Operation not supported by this backend
    #[error("Operation not supported: {0}")]
    NotSupported(String),

    /// The query payload could not be turned into a request
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Token acquisition or authorization failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The remote API answered with an error response
    #[error("Request failed ({status}): {message}")]
    Request {
        /// HTTP status returned by the API
        status: u16,
        /// Error message from the response body
        message: String,
    },

    /// Transport/communication error
    #[error("Transport error: {0}")]
    Transport(String),

    /// Timeout waiting for response
    #[error("Operation timed out")]
    Timeout,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors raised while loading datasource settings
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Settings file could not be read
    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file is not valid TOML for `DatasourceSettings`
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_error_message_includes_status() {
        let err = BackendError::Request {
            status: 403,
            message: "Forbidden".to_string(),
        };
        assert_eq!(err.to_string(), "Request failed (403): Forbidden");
    }

    #[test]
    fn not_configured_message() {
        let err = BackendError::NotConfigured("Azure Log Analytics".to_string());
        assert_eq!(
            err.to_string(),
            "Backend not configured: Azure Log Analytics"
        );
    }
}
