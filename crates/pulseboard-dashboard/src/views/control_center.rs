//! Control-center monitoring view

use super::{ResourceError, coordinator, error_of, track};
use crate::error::Result;
use crate::metrics::ControlCenterSummary;
use crate::poller::{CycleReport, PollingCoordinator};
use crate::resource::ResourceHandle;
use futures::FutureExt;
use pulseboard_client::ControlCenterSource;
use pulseboard_core::Config;
use pulseboard_core::types::{DataSourceInfo, MetricPoint, ServiceInfo, SystemHealth};
use std::sync::Arc;

/// Polled system health, services, metrics history and data sources
#[derive(Debug)]
pub struct ControlCenterView {
    poller: PollingCoordinator,
    health: ResourceHandle<Option<SystemHealth>>,
    services: ResourceHandle<Vec<ServiceInfo>>,
    metrics_history: ResourceHandle<Vec<MetricPoint>>,
    data_sources: ResourceHandle<Vec<DataSourceInfo>>,
}

impl ControlCenterView {
    /// Build the view over a data source
    ///
    /// # Errors
    ///
    /// Returns an error if a resource cannot be registered with the coordinator.
    pub fn new(source: Arc<dyn ControlCenterSource>, config: &Config) -> Result<Self> {
        let poller = coordinator("control-center", &config.polling);

        let health = track(&poller, "system-health", &source, |s| {
            async move { s.system_health().await.map(Some) }.boxed()
        })?;
        let services = track(&poller, "services", &source, |s| {
            async move { s.services().await }.boxed()
        })?;
        let metrics_history = track(&poller, "metrics-history", &source, |s| {
            async move { s.metrics_history().await }.boxed()
        })?;
        let data_sources = track(&poller, "data-sources", &source, |s| {
            async move { s.data_sources().await }.boxed()
        })?;

        Ok(Self {
            poller,
            health,
            services,
            metrics_history,
            data_sources,
        })
    }

    /// Fetch everything and start the timer
    ///
    /// # Errors
    ///
    /// Returns an error if the view is already active.
    pub async fn activate(&self) -> Result<CycleReport> {
        self.poller.activate().await
    }

    /// Stop the timer
    ///
    /// # Errors
    ///
    /// Returns an error if the timer task failed.
    pub async fn deactivate(&self) -> Result<()> {
        self.poller.deactivate().await
    }

    /// Manual refresh
    pub async fn refresh(&self) -> CycleReport {
        self.poller.refresh_now().await
    }

    /// The coordinator driving this view
    #[must_use]
    pub const fn poller(&self) -> &PollingCoordinator {
        &self.poller
    }

    /// Latest health snapshot; `None` until the first successful fetch
    #[must_use]
    pub fn health(&self) -> Option<SystemHealth> {
        self.health.data()
    }

    /// Backend services
    #[must_use]
    pub fn services(&self) -> Vec<ServiceInfo> {
        self.services.data()
    }

    /// Metrics samples, oldest first
    #[must_use]
    pub fn metrics_history(&self) -> Vec<MetricPoint> {
        self.metrics_history.data()
    }

    /// Connected data sources
    #[must_use]
    pub fn data_sources(&self) -> Vec<DataSourceInfo> {
        self.data_sources.data()
    }

    /// Service and data-source counts
    #[must_use]
    pub fn summary(&self) -> ControlCenterSummary {
        self.services.with_data(|services| {
            self.data_sources
                .with_data(|sources| ControlCenterSummary::compute(services, sources))
        })
    }

    /// Resource-scoped error flags
    #[must_use]
    pub fn errors(&self) -> Vec<ResourceError> {
        [
            error_of(&self.health),
            error_of(&self.services),
            error_of(&self.metrics_history),
            error_of(&self.data_sources),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}
