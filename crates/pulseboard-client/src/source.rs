//! Data source traits, one per dashboard domain
//!
//! Views depend on these traits rather than on a concrete transport, so the same view
//! runs against the live REST backend, the bundled fixtures, or a test double.

use crate::error::ClientResult;
use async_trait::async_trait;
use pulseboard_core::CrudEntity;
use pulseboard_core::forms::ProfileForm;
use pulseboard_core::types::{
    AiAction, Alert, ConformanceRequest, DataSourceInfo, DiscoverRequest, HealthSnapshot,
    MetricPoint, ProcessSummary, SchemaInfo, ServiceInfo, SimulateRequest, Store, SystemHealth,
    Truck, UserProfile,
};

/// Supply-chain map data: fleet, facilities, alerts and recommendations
#[async_trait]
pub trait SupplyChainSource: Send + Sync {
    /// Current fleet
    async fn list_trucks(&self) -> ClientResult<Vec<Truck>>;

    /// Current stores and facilities
    async fn list_stores(&self) -> ClientResult<Vec<Store>>;

    /// Current alerts
    async fn list_alerts(&self) -> ClientResult<Vec<Alert>>;

    /// Backend recommendations, `None` when the source does not produce any
    async fn list_actions(&self) -> ClientResult<Option<Vec<AiAction>>> {
        Ok(None)
    }

    /// Dismiss an alert
    async fn dismiss_alert(&self, id: &str) -> ClientResult<()>;

    /// Approve a recommendation
    async fn approve_action(&self, id: &str) -> ClientResult<()>;
}

/// Control-center monitoring data
#[async_trait]
pub trait ControlCenterSource: Send + Sync {
    /// Platform health snapshot
    async fn system_health(&self) -> ClientResult<SystemHealth>;

    /// Backend service states
    async fn services(&self) -> ClientResult<Vec<ServiceInfo>>;

    /// Recent metric samples
    async fn metrics_history(&self) -> ClientResult<Vec<MetricPoint>>;

    /// Connected data sources
    async fn data_sources(&self) -> ClientResult<Vec<DataSourceInfo>>;
}

/// Query catalog and backend health
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Queryable schemas
    async fn schemas(&self) -> ClientResult<Vec<SchemaInfo>>;

    /// Backend health
    async fn health(&self) -> ClientResult<HealthSnapshot>;
}

/// Create/read/update/delete access to one entity collection
#[async_trait]
pub trait CrudEndpoint<E: CrudEntity>: Send + Sync {
    /// Full collection
    async fn list(&self) -> ClientResult<Vec<E>>;

    /// Create a new entity from a normalized form
    async fn create(&self, form: &E::Form) -> ClientResult<E>;

    /// Replace an existing entity with a normalized form
    async fn update(&self, id: &str, form: &E::Form) -> ClientResult<E>;

    /// Delete an entity
    async fn delete(&self, id: &str) -> ClientResult<()>;
}

/// The signed-in user's profile
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// Current profile, `None` if the user has not saved one yet
    async fn get_profile(&self) -> ClientResult<Option<UserProfile>>;

    /// First save
    async fn create_profile(&self, form: &ProfileForm) -> ClientResult<UserProfile>;

    /// Subsequent saves
    async fn update_profile(&self, form: &ProfileForm) -> ClientResult<UserProfile>;
}

/// Process-mining operations, computed entirely by the backend
#[async_trait]
pub trait ProcessMiningSource: Send + Sync {
    /// Known processes
    async fn processes(&self) -> ClientResult<Vec<ProcessSummary>>;

    /// Run process discovery
    async fn discover(&self, request: &DiscoverRequest) -> ClientResult<serde_json::Value>;

    /// Run a what-if simulation
    async fn simulate(&self, request: &SimulateRequest) -> ClientResult<serde_json::Value>;

    /// Run conformance checking
    async fn conformance(&self, request: &ConformanceRequest) -> ClientResult<serde_json::Value>;

    /// Fetch generated insights for a process
    async fn insights(&self, process_id: &str) -> ClientResult<serde_json::Value>;
}
