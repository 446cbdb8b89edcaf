//! View-state and data orchestration for pulseboard dashboards
//!
//! Each screen is a view-state container that owns its polled resources, selection and
//! form buffers. A [`PollingCoordinator`] keeps the resources of one view fresh on a
//! fixed interval; derived metrics are recomputed from the latest snapshots on demand.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod actions;
pub mod app;
pub mod crud;
pub mod error;
pub mod metrics;
pub mod poller;
pub mod reconcile;
pub mod resource;
pub mod selection;
pub mod settings;
pub mod views;

// Re-export commonly used types
pub use app::Dashboard;
pub use crud::{CrudController, Dialog, DialogMode};
pub use error::{DashboardError, Result};
pub use metrics::{ControlCenterSummary, SupplyChainSummary, health_score};
pub use poller::{CoordinatorStatus, CycleReport, PollStats, PollingCoordinator};
pub use reconcile::OptimisticOverlay;
pub use resource::{PollTarget, PolledResource, ResourceHandle, ResourceState};
pub use selection::{MapViewport, Selection, SelectionCoordinator, ViewportState};
pub use settings::SettingsStore;
pub use views::{
    CatalogView, CommsConfigView, ControlCenterView, ProcessMiningView, ProfileEditor,
    ResourceError, SupplyChainView,
};

/// Build the dashboard from the default configuration sources
///
/// # Errors
///
/// Returns [`DashboardError`] if:
/// - Configuration loading or validation fails
/// - The backend client cannot be built
/// - The settings snapshot exists but cannot be read
pub async fn init() -> Result<Dashboard> {
    let config = pulseboard_core::Config::load()?;
    config.validate()?;
    Dashboard::connect(&config).await
}
