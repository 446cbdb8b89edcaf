//! Error types for the dashboard layer

use pulseboard_client::ClientError;
use std::{error::Error as StdError, fmt};

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Errors that can occur while driving dashboard views
#[derive(Debug)]
pub enum DashboardError {
    /// Backend call failed
    Client(ClientError),

    /// I/O error
    Io(std::io::Error),

    /// Serialization error
    Serialization(serde_json::Error),

    /// Configuration error
    Configuration {
        /// Error message
        message: String,
    },

    /// Form input rejected before reaching the backend
    Validation {
        /// Field that failed validation
        field: String,
        /// Validation error message
        message: String,
    },

    /// Entity not present in the current snapshot
    NotFound {
        /// Resource description
        resource: String,
    },

    /// Polling coordinator is already active
    AlreadyActive,

    /// Operation requires an active coordinator
    NotActive,

    /// Shutdown error
    Shutdown {
        /// Error message
        message: String,
    },
}

impl DashboardError {
    /// Create a new configuration error
    #[must_use]
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a new validation error
    #[must_use]
    pub fn validation<F: Into<String>, S: Into<String>>(field: F, message: S) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new not-found error
    #[must_use]
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a new shutdown error
    #[must_use]
    pub fn shutdown<S: Into<String>>(message: S) -> Self {
        Self::Shutdown {
            message: message.into(),
        }
    }
}

impl fmt::Display for DashboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Serialization(err) => write!(f, "Serialization error: {err}"),
            Self::Configuration { message } => write!(f, "Configuration error: {message}"),
            Self::Validation { field, message } => write!(f, "Invalid {field}: {message}"),
            Self::NotFound { resource } => write!(f, "Not found: {resource}"),
            Self::AlreadyActive => write!(f, "Polling coordinator is already active"),
            Self::NotActive => write!(f, "Polling coordinator is not active"),
            Self::Shutdown { message } => write!(f, "Shutdown error: {message}"),
        }
    }
}

impl StdError for DashboardError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Client(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ClientError> for DashboardError {
    fn from(err: ClientError) -> Self {
        Self::Client(err)
    }
}

impl From<std::io::Error> for DashboardError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for DashboardError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err)
    }
}

impl From<pulseboard_core::Error> for DashboardError {
    fn from(err: pulseboard_core::Error) -> Self {
        use pulseboard_core::Error as CoreError;

        match err {
            CoreError::Io(e) => Self::Io(e),
            CoreError::Serialization(e) => Self::Serialization(e),
            CoreError::Configuration { message } => Self::Configuration { message },
            CoreError::Validation { field, message } => Self::Validation { field, message },
            CoreError::NotFound { resource } => Self::NotFound { resource },
            CoreError::Other(message) => Self::Configuration { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_validation_display() {
        let err = DashboardError::validation("name", "must not be empty");
        assert_eq!(err.to_string(), "Invalid name: must not be empty");
    }

    #[test]
    fn test_core_validation_maps_through() {
        let err = DashboardError::from(pulseboard_core::Error::validation("role", "required"));
        assert!(matches!(err, DashboardError::Validation { ref field, .. } if field == "role"));
    }

    #[test]
    fn test_client_error_is_source() {
        let err = DashboardError::from(ClientError::unavailable("offline"));
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "Data source unavailable: offline");
    }
}
