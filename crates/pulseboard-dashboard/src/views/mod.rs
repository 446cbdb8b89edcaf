//! View-state containers, one per dashboard screen
//!
//! Each view owns its resources and local state. Nothing is shared between views
//! except the backend handle they were built from.

pub mod catalog;
pub mod comms_config;
pub mod control_center;
pub mod process_mining;
pub mod profile;
pub mod supply_chain;

pub use catalog::CatalogView;
pub use comms_config::CommsConfigView;
pub use control_center::ControlCenterView;
pub use process_mining::{OperationState, ProcessMiningView, ProcessOperation};
pub use profile::ProfileEditor;
pub use supply_chain::SupplyChainView;

use crate::error::Result;
use crate::poller::PollingCoordinator;
use crate::resource::{PolledResource, ResourceHandle};
use futures::future::BoxFuture;
use pulseboard_client::ClientResult;
use pulseboard_core::config::PollingConfig;
use serde::Serialize;
use std::sync::Arc;

/// An error flag scoped to one resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceError {
    /// Resource name
    pub resource: String,
    /// Error message
    pub message: String,
}

fn coordinator(name: &str, polling: &PollingConfig) -> PollingCoordinator {
    PollingCoordinator::new(name, polling.interval(), polling.shutdown_timeout())
}

/// Build a resource over `source`, register it and return its read side
fn track<S, T, F>(
    poller: &PollingCoordinator,
    name: &str,
    source: &Arc<S>,
    fetch: F,
) -> Result<ResourceHandle<T>>
where
    S: ?Sized + Send + Sync + 'static,
    T: Default + Clone + Send + Sync + 'static,
    F: Fn(Arc<S>) -> BoxFuture<'static, ClientResult<T>> + Send + Sync + 'static,
{
    let source = source.clone();
    let resource = Arc::new(PolledResource::new(name, move || fetch(source.clone())));
    let handle = resource.handle();
    poller.register(resource)?;
    Ok(handle)
}

fn error_of<T: Clone>(handle: &ResourceHandle<T>) -> Option<ResourceError> {
    handle.error().map(|message| ResourceError {
        resource: handle.name().to_string(),
        message,
    })
}
