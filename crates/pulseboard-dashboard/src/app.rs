//! Dashboard shell: every view built from one backend and one configuration object

use crate::error::Result;
use crate::settings::SettingsStore;
use crate::views::{
    CatalogView, CommsConfigView, ControlCenterView, ProcessMiningView, ProfileEditor,
    SupplyChainView,
};
use pulseboard_client::Backend;
use pulseboard_core::Config;
use tracing::info;

/// All view-state containers of the dashboard
#[derive(Debug)]
pub struct Dashboard {
    /// Supply-chain map
    pub supply_chain: SupplyChainView,
    /// Control-center monitoring
    pub control_center: ControlCenterView,
    /// Query catalog
    pub catalog: CatalogView,
    /// Communication configuration
    pub comms: CommsConfigView,
    /// Profile form
    pub profile: ProfileEditor,
    /// Process mining
    pub process_mining: ProcessMiningView,
    backend: Backend,
}

impl Dashboard {
    /// Build every view over `backend`
    ///
    /// # Errors
    ///
    /// Returns an error if a view cannot register its resources.
    pub fn new(backend: Backend, config: &Config, settings: SettingsStore) -> Result<Self> {
        Ok(Self {
            supply_chain: SupplyChainView::new(backend.supply_chain.clone(), config)?,
            control_center: ControlCenterView::new(backend.control_center.clone(), config)?,
            catalog: CatalogView::new(backend.catalog.clone(), config)?,
            comms: CommsConfigView::new(backend.comm_types.clone(), backend.comm_fields.clone()),
            profile: ProfileEditor::new(backend.profile.clone(), settings),
            process_mining: ProcessMiningView::new(backend.process_mining.clone()),
            backend,
        })
    }

    /// Connect to the configured backend and open the settings snapshot
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be built or the settings snapshot exists
    /// but cannot be read. A snapshot that cannot be parsed is discarded with a warning.
    pub async fn connect(config: &Config) -> Result<Self> {
        let backend = Backend::connect(&config.backend)?;
        let settings = match &config.settings.snapshot_file {
            Some(path) => SettingsStore::open_or_empty(path).await?,
            None => SettingsStore::in_memory(),
        };

        info!(mode = ?backend.mode(), "Dashboard initialized");
        Self::new(backend, config, settings)
    }

    /// Backend the views were built from
    #[must_use]
    pub const fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Stop every polling view
    ///
    /// # Errors
    ///
    /// Returns the first teardown error; every view is still asked to stop.
    pub async fn shutdown(&self) -> Result<()> {
        let (supply, control, catalog) = tokio::join!(
            self.supply_chain.deactivate(),
            self.control_center.deactivate(),
            self.catalog.deactivate()
        );
        supply.and(control).and(catalog)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pulseboard_core::DataMode;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_connect_with_fixtures() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.settings.snapshot_file = Some(dir.path().join("settings.json"));

        let dashboard = Dashboard::connect(&config).await.unwrap();
        assert_eq!(dashboard.backend().mode(), DataMode::Fixture);
        assert_eq!(
            dashboard.profile.settings().path(),
            Some(dir.path().join("settings.json").as_path())
        );
        dashboard.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_connect_over_corrupt_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        tokio::fs::write(&path, "{\"profile\":").await.unwrap();

        let mut config = Config::default();
        config.settings.snapshot_file = Some(path);

        let dashboard = Dashboard::connect(&config).await.unwrap();
        assert_eq!(dashboard.profile.settings().keys().count(), 0);
        dashboard.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_active_views() {
        let mut config = Config::default();
        config.settings.snapshot_file = None;
        let dashboard = Dashboard::connect(&config).await.unwrap();

        dashboard.supply_chain.activate().await.unwrap();
        dashboard.control_center.activate().await.unwrap();
        assert!(dashboard.supply_chain.is_active());

        dashboard.shutdown().await.unwrap();
        assert!(!dashboard.supply_chain.is_active());
    }
}
