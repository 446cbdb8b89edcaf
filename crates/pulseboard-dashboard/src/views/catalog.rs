//! Query catalog view: schemas and backend health
//!
//! An empty schema list is a valid state and gets placeholder text rather than an
//! error flag.

use super::{ResourceError, coordinator, error_of, track};
use crate::error::Result;
use crate::poller::{CycleReport, PollingCoordinator};
use crate::resource::ResourceHandle;
use futures::FutureExt;
use pulseboard_client::CatalogSource;
use pulseboard_core::Config;
use pulseboard_core::types::{HealthSnapshot, SchemaInfo};
use std::sync::Arc;

/// Placeholder shown once the catalog is loaded but holds no schemas
pub const EMPTY_CATALOG_TEXT: &str = "No schemas available. Connect a data source to browse tables.";

/// Polled schema list and health snapshot
#[derive(Debug)]
pub struct CatalogView {
    poller: PollingCoordinator,
    schemas: ResourceHandle<Vec<SchemaInfo>>,
    health: ResourceHandle<Option<HealthSnapshot>>,
}

impl CatalogView {
    /// Build the view over a data source
    ///
    /// # Errors
    ///
    /// Returns an error if a resource cannot be registered with the coordinator.
    pub fn new(source: Arc<dyn CatalogSource>, config: &Config) -> Result<Self> {
        let poller = coordinator("catalog", &config.polling);
        let schemas = track(&poller, "schemas", &source, |s| {
            async move { s.schemas().await }.boxed()
        })?;
        let health = track(&poller, "health", &source, |s| {
            async move { s.health().await.map(Some) }.boxed()
        })?;

        Ok(Self {
            poller,
            schemas,
            health,
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

    /// Schemas from the latest successful fetch
    #[must_use]
    pub fn schemas(&self) -> Vec<SchemaInfo> {
        self.schemas.data()
    }

    /// Total tables across all schemas
    #[must_use]
    pub fn table_count(&self) -> usize {
        self.schemas
            .with_data(|schemas| schemas.iter().map(|s| s.tables.len()).sum())
    }

    /// Latest health snapshot
    #[must_use]
    pub fn health(&self) -> Option<HealthSnapshot> {
        self.health.data()
    }

    /// Placeholder text when the schema list was fetched and is empty
    #[must_use]
    pub fn placeholder(&self) -> Option<&'static str> {
        let state = self.schemas.snapshot();
        (state.has_data() && state.data.is_empty()).then_some(EMPTY_CATALOG_TEXT)
    }

    /// Resource-scoped error flags
    #[must_use]
    pub fn errors(&self) -> Vec<ResourceError> {
        [error_of(&self.schemas), error_of(&self.health)]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use pulseboard_client::{ClientResult, FixtureSource};

    struct EmptyCatalog;

    #[async_trait]
    impl CatalogSource for EmptyCatalog {
        async fn schemas(&self) -> ClientResult<Vec<SchemaInfo>> {
            Ok(Vec::new())
        }

        async fn health(&self) -> ClientResult<HealthSnapshot> {
            Ok(HealthSnapshot {
                status: "ok".to_string(),
                version: None,
                components: std::collections::BTreeMap::new(),
            })
        }
    }

    #[tokio::test]
    async fn test_fixture_catalog() {
        let view = CatalogView::new(Arc::new(FixtureSource::new()), &Config::default()).unwrap();
        view.refresh().await;

        assert_eq!(view.schemas().len(), 2);
        assert_eq!(view.table_count(), 5);
        assert_eq!(view.placeholder(), None);
        assert_eq!(view.health().unwrap().status, "ok");
    }

    #[tokio::test]
    async fn test_empty_catalog_is_placeholder_not_error() {
        let view = CatalogView::new(Arc::new(EmptyCatalog), &Config::default()).unwrap();
        assert_eq!(view.placeholder(), None);

        view.refresh().await;
        assert_eq!(view.placeholder(), Some(EMPTY_CATALOG_TEXT));
        assert!(view.errors().is_empty());
    }
}
