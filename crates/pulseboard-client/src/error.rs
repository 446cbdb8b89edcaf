//! Error types for backend access

use thiserror::Error;

/// Result type alias for backend operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while talking to the dashboard backend
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport-level failure (connect, timeout, TLS, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Backend returned {status} for {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Request URL
        url: String,
    },

    /// Response body could not be decoded
    #[error("Failed to decode response from {url}: {message}")]
    Decode {
        /// Request URL
        url: String,
        /// Decoder message
        message: String,
    },

    /// Requested entity does not exist
    #[error("Not found: {resource}")]
    NotFound {
        /// Resource description
        resource: String,
    },

    /// Client could not be constructed from configuration
    #[error("Invalid client configuration: {message}")]
    InvalidConfig {
        /// Error message
        message: String,
    },

    /// Data source cannot serve the request right now
    #[error("Data source unavailable: {message}")]
    Unavailable {
        /// Error message
        message: String,
    },
}

impl ClientError {
    /// Create a not-found error
    #[must_use]
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an unavailable error
    #[must_use]
    pub fn unavailable<S: Into<String>>(message: S) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Whether retrying on the next poll cycle may succeed
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(err) => err.is_timeout() || err.is_connect() || err.is_request(),
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::Unavailable { .. } => true,
            Self::Decode { .. } | Self::NotFound { .. } | Self::InvalidConfig { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_display() {
        let err = ClientError::Status {
            status: 503,
            url: "http://localhost/api/v1/health".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Backend returned 503 for http://localhost/api/v1/health"
        );
        assert!(err.is_transient());
    }

    #[test]
    fn test_client_errors_are_not_transient() {
        let err = ClientError::Status {
            status: 422,
            url: "x".to_string(),
        };
        assert!(!err.is_transient());
        assert!(!ClientError::not_found("truck T-1").is_transient());
        assert!(ClientError::unavailable("offline").is_transient());
    }
}
