//! Backend handle selected once at startup from [`DataMode`]

use crate::api::ApiClient;
use crate::error::ClientResult;
use crate::fixtures::FixtureSource;
use crate::source::{
    CatalogSource, ControlCenterSource, CrudEndpoint, ProcessMiningSource, ProfileSource,
    SupplyChainSource,
};
use pulseboard_core::config::BackendConfig;
use pulseboard_core::types::{CommunicationType, FieldDefinition};
use pulseboard_core::DataMode;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// One handle per source trait, shared by every view
#[derive(Clone)]
pub struct Backend {
    /// Supply-chain map data
    pub supply_chain: Arc<dyn SupplyChainSource>,
    /// Control-center monitoring data
    pub control_center: Arc<dyn ControlCenterSource>,
    /// Query catalog
    pub catalog: Arc<dyn CatalogSource>,
    /// Communication type configuration
    pub comm_types: Arc<dyn CrudEndpoint<CommunicationType>>,
    /// Field definition configuration
    pub comm_fields: Arc<dyn CrudEndpoint<FieldDefinition>>,
    /// User profile
    pub profile: Arc<dyn ProfileSource>,
    /// Process mining
    pub process_mining: Arc<dyn ProcessMiningSource>,
    mode: DataMode,
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl Backend {
    /// Build the backend for the configured data mode
    ///
    /// # Errors
    ///
    /// Returns an error if live mode is selected and the HTTP client cannot be built.
    pub fn connect(config: &BackendConfig) -> ClientResult<Self> {
        match config.mode {
            DataMode::Live => {
                let client = ApiClient::from_config(config)?;
                info!(base_url = client.base_url(), "Using live backend");
                Ok(Self::from_source(Arc::new(client), DataMode::Live))
            }
            DataMode::Fixture => {
                info!("Using bundled fixture data");
                Ok(Self::from_source(Arc::new(FixtureSource::new()), DataMode::Fixture))
            }
        }
    }

    /// Wrap a single source implementing every trait
    pub fn from_source<S>(source: Arc<S>, mode: DataMode) -> Self
    where
        S: SupplyChainSource
            + ControlCenterSource
            + CatalogSource
            + CrudEndpoint<CommunicationType>
            + CrudEndpoint<FieldDefinition>
            + ProfileSource
            + ProcessMiningSource
            + 'static,
    {
        Self {
            supply_chain: source.clone(),
            control_center: source.clone(),
            catalog: source.clone(),
            comm_types: source.clone(),
            comm_fields: source.clone(),
            profile: source.clone(),
            process_mining: source,
            mode,
        }
    }

    /// Data mode this backend was built for
    #[must_use]
    pub const fn mode(&self) -> DataMode {
        self.mode
    }
}
