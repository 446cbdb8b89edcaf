//! Core types and utilities for pulseboard
//!
//! Holds the data model received from the dashboard backend, the form buffers used by
//! the configuration screens, the startup configuration object and the shared error type.

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod forms;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::{Config, DataMode};
pub use error::{Error, Result};
pub use forms::{CrudEntity, EntityForm};
pub use types::{Alert, AiAction, CommunicationType, FieldDefinition, GeoPoint, Store, Truck, UserProfile};

/// Initialize the logging system from a [`config::LoggingConfig`]
///
/// `RUST_LOG` takes precedence over the configured level.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(logging: &config::LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer().pretty()).try_init()
    };

    result.map_err(|e| Error::configuration(format!("Failed to initialize logging: {e}")))
}
