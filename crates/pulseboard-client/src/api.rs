//! HTTP client for the dashboard REST backend

use crate::error::{ClientError, ClientResult};
use crate::source::{
    CatalogSource, ControlCenterSource, CrudEndpoint, ProcessMiningSource, ProfileSource,
    SupplyChainSource,
};
use async_trait::async_trait;
use pulseboard_core::config::BackendConfig;
use pulseboard_core::forms::ProfileForm;
use pulseboard_core::types::{
    AiAction, Alert, CommunicationType, ConformanceRequest, DataSourceInfo, DiscoverRequest,
    FieldDefinition, HealthSnapshot, MetricPoint, ProcessSummary, SchemaInfo, ServiceInfo,
    SimulateRequest, Store, SystemHealth, Truck, UserProfile,
};
use pulseboard_core::CrudEntity;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Backend endpoint paths
pub mod paths {
    /// Fleet
    pub const TRUCKS: &str = "/api/v1/supply-chain/trucks";
    /// Stores and facilities
    pub const STORES: &str = "/api/v1/supply-chain/stores";
    /// Alerts
    pub const ALERTS: &str = "/api/v1/supply-chain/alerts";
    /// Recommendations
    pub const ACTIONS: &str = "/api/v1/supply-chain/actions";
    /// Platform health
    pub const SYSTEM_HEALTH: &str = "/api/v1/control-center/system-health";
    /// Service states
    pub const SERVICES: &str = "/api/v1/control-center/services";
    /// Metric samples
    pub const METRICS_HISTORY: &str = "/api/v1/control-center/metrics-history";
    /// Data sources
    pub const DATA_SOURCES: &str = "/api/v1/control-center/data-sources";
    /// Query catalog
    pub const SCHEMAS: &str = "/api/v1/schemas";
    /// Backend health
    pub const HEALTH: &str = "/api/v1/health";
    /// Communication types
    pub const COMM_TYPES: &str = "/api/v1/comms/config/types";
    /// Field definitions
    pub const COMM_FIELDS: &str = "/api/v1/comms/config/fields";
    /// User profile
    pub const PROFILE: &str = "/api/v1/profile";
    /// Process list
    pub const PROCESSES: &str = "/api/v1/process-mining/processes";
    /// Process discovery
    pub const DISCOVER: &str = "/api/v1/process-mining/discover";
    /// What-if simulation
    pub const SIMULATE: &str = "/api/v1/process-mining/simulate";
    /// Conformance checking
    pub const CONFORMANCE: &str = "/api/v1/process-mining/conformance";
    /// Process insights
    pub const INSIGHTS: &str = "/api/v1/process-mining/insights";
}

/// A collection exposed as a REST resource with `/{id}` members
pub trait RestCollection: CrudEntity + DeserializeOwned {
    /// Collection path
    const PATH: &'static str;
}

impl RestCollection for CommunicationType {
    const PATH: &'static str = paths::COMM_TYPES;
}

impl RestCollection for FieldDefinition {
    const PATH: &'static str = paths::COMM_FIELDS;
}

/// API client for making HTTP requests to the dashboard backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ApiClient {
    /// Create a new API client with reqwest defaults
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    /// Create a client from backend configuration
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidConfig`] if the base URL is empty or the HTTP
    /// client cannot be built.
    pub fn from_config(config: &BackendConfig) -> ClientResult<Self> {
        if config.base_url.trim().is_empty() {
            return Err(ClientError::InvalidConfig {
                message: "base_url is empty".to_string(),
            });
        }

        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ClientError::InvalidConfig {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// Set the API key for authentication
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Base URL without trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let mut request = self.client.request(method, url);
        if let Some(ref api_key) = self.api_key {
            request = request.header("X-API-Key", api_key);
        }
        request
    }

    async fn execute(&self, request: RequestBuilder, url: &str) -> ClientResult<reqwest::Response> {
        let response = request.send().await.inspect_err(|e| {
            warn!(url, error = %e, "Backend request failed");
        })?;

        let status = response.status();
        debug!(url, status = status.as_u16(), "Backend responded");

        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::not_found(url));
        }
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response, url: &str) -> ClientResult<T> {
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ClientError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    /// GET a JSON document
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the status is not 2xx, or the body
    /// does not decode as `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = self.url(path);
        let response = self.execute(self.request(Method::GET, &url), &url).await?;
        Self::decode(response, &url).await
    }

    /// POST a JSON body and decode the JSON reply
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the status is not 2xx, or the body
    /// does not decode as `T`.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let request = self.request(Method::POST, &url).json(body);
        let response = self.execute(request, &url).await?;
        Self::decode(response, &url).await
    }

    /// PUT a JSON body and decode the JSON reply
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the status is not 2xx, or the body
    /// does not decode as `T`.
    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let request = self.request(Method::PUT, &url).json(body);
        let response = self.execute(request, &url).await?;
        Self::decode(response, &url).await
    }

    /// POST without a body, ignoring the reply body
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the status is not 2xx.
    pub async fn post_empty(&self, path: &str) -> ClientResult<()> {
        let url = self.url(path);
        self.execute(self.request(Method::POST, &url), &url).await?;
        Ok(())
    }

    /// DELETE a resource
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the status is not 2xx.
    pub async fn delete_resource(&self, path: &str) -> ClientResult<()> {
        let url = self.url(path);
        self.execute(self.request(Method::DELETE, &url), &url).await?;
        Ok(())
    }
}

fn member(collection: &str, id: &str) -> String {
    format!("{collection}/{}", urlencoding::encode(id))
}

#[async_trait]
impl SupplyChainSource for ApiClient {
    async fn list_trucks(&self) -> ClientResult<Vec<Truck>> {
        self.get_json(paths::TRUCKS).await
    }

    async fn list_stores(&self) -> ClientResult<Vec<Store>> {
        self.get_json(paths::STORES).await
    }

    async fn list_alerts(&self) -> ClientResult<Vec<Alert>> {
        self.get_json(paths::ALERTS).await
    }

    async fn list_actions(&self) -> ClientResult<Option<Vec<AiAction>>> {
        // Backends without a recommendation engine do not expose the endpoint
        match self.get_json(paths::ACTIONS).await {
            Ok(actions) => Ok(Some(actions)),
            Err(ClientError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn dismiss_alert(&self, id: &str) -> ClientResult<()> {
        self.post_empty(&format!("{}/dismiss", member(paths::ALERTS, id)))
            .await
    }

    async fn approve_action(&self, id: &str) -> ClientResult<()> {
        self.post_empty(&format!("{}/approve", member(paths::ACTIONS, id)))
            .await
    }
}

#[async_trait]
impl ControlCenterSource for ApiClient {
    async fn system_health(&self) -> ClientResult<SystemHealth> {
        self.get_json(paths::SYSTEM_HEALTH).await
    }

    async fn services(&self) -> ClientResult<Vec<ServiceInfo>> {
        self.get_json(paths::SERVICES).await
    }

    async fn metrics_history(&self) -> ClientResult<Vec<MetricPoint>> {
        self.get_json(paths::METRICS_HISTORY).await
    }

    async fn data_sources(&self) -> ClientResult<Vec<DataSourceInfo>> {
        self.get_json(paths::DATA_SOURCES).await
    }
}

#[async_trait]
impl CatalogSource for ApiClient {
    async fn schemas(&self) -> ClientResult<Vec<SchemaInfo>> {
        self.get_json(paths::SCHEMAS).await
    }

    async fn health(&self) -> ClientResult<HealthSnapshot> {
        self.get_json(paths::HEALTH).await
    }
}

#[async_trait]
impl<E: RestCollection> CrudEndpoint<E> for ApiClient {
    async fn list(&self) -> ClientResult<Vec<E>> {
        self.get_json(E::PATH).await
    }

    async fn create(&self, form: &E::Form) -> ClientResult<E> {
        self.post_json(E::PATH, form).await
    }

    async fn update(&self, id: &str, form: &E::Form) -> ClientResult<E> {
        self.put_json(&member(E::PATH, id), form).await
    }

    async fn delete(&self, id: &str) -> ClientResult<()> {
        self.delete_resource(&member(E::PATH, id)).await
    }
}

#[async_trait]
impl ProfileSource for ApiClient {
    async fn get_profile(&self) -> ClientResult<Option<UserProfile>> {
        match self.get_json(paths::PROFILE).await {
            Ok(profile) => Ok(Some(profile)),
            Err(ClientError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_profile(&self, form: &ProfileForm) -> ClientResult<UserProfile> {
        self.post_json(paths::PROFILE, form).await
    }

    async fn update_profile(&self, form: &ProfileForm) -> ClientResult<UserProfile> {
        self.put_json(paths::PROFILE, form).await
    }
}

#[async_trait]
impl ProcessMiningSource for ApiClient {
    async fn processes(&self) -> ClientResult<Vec<ProcessSummary>> {
        self.get_json(paths::PROCESSES).await
    }

    async fn discover(&self, request: &DiscoverRequest) -> ClientResult<serde_json::Value> {
        self.post_json(paths::DISCOVER, request).await
    }

    async fn simulate(&self, request: &SimulateRequest) -> ClientResult<serde_json::Value> {
        self.post_json(paths::SIMULATE, request).await
    }

    async fn conformance(&self, request: &ConformanceRequest) -> ClientResult<serde_json::Value> {
        self.post_json(paths::CONFORMANCE, request).await
    }

    async fn insights(&self, process_id: &str) -> ClientResult<serde_json::Value> {
        let path = format!(
            "{}?process_id={}",
            paths::INSIGHTS,
            urlencoding::encode(process_id)
        );
        self.get_json(&path).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use pulseboard_core::forms::CommunicationTypeForm;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn truck_json() -> serde_json::Value {
        json!([{
            "id": "T-1",
            "name": "Rig 1",
            "position": {"lat": 41.9, "lon": -87.6},
            "status": "delayed",
            "cargoLoad": 12.0,
            "cargoCapacity": 20.0,
            "fuelLevel": 55.0
        }])
    }

    #[test]
    fn test_from_config_rejects_empty_base_url() {
        let config = BackendConfig {
            base_url: "   ".to_string(),
            ..BackendConfig::default()
        };
        assert!(matches!(
            ApiClient::from_config(&config),
            Err(ClientError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[tokio::test]
    async fn test_list_trucks_sends_api_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(paths::TRUCKS))
            .and(header("X-API-Key", "k-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(truck_json()))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).with_api_key("k-123");
        let trucks = client.list_trucks().await.unwrap();

        assert_eq!(trucks.len(), 1);
        assert_eq!(trucks[0].id, "T-1");
        assert_eq!(trucks[0].status, pulseboard_core::types::TruckStatus::Delayed);
    }

    #[tokio::test]
    async fn test_server_error_maps_to_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(paths::ALERTS))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri());
        let err = client.list_alerts().await.unwrap_err();

        assert!(matches!(err, ClientError::Status { status: 502, .. }));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_malformed_body_maps_to_decode() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(paths::STORES))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri());
        let err = client.list_stores().await.unwrap_err();
        assert!(matches!(err, ClientError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_missing_profile_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(paths::PROFILE))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri());
        assert_eq!(client.get_profile().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_actions_endpoint_is_none() {
        let server = MockServer::start().await;
        let client = ApiClient::new(server.uri());
        assert_eq!(client.list_actions().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_communication_type_posts_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(paths::COMM_TYPES))
            .and(body_json(json!({
                "name": "service_ticket",
                "displayName": "Service ticket",
                "sortOrder": 0,
                "enabled": true
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "ct-9",
                "name": "service_ticket",
                "displayName": "Service ticket",
                "sortOrder": 0,
                "enabled": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri());
        let form = CommunicationTypeForm {
            name: "service_ticket".to_string(),
            display_name: "Service ticket".to_string(),
            enabled: true,
            ..Default::default()
        };
        let created: CommunicationType = CrudEndpoint::<CommunicationType>::create(&client, &form)
            .await
            .unwrap();
        assert_eq!(created.id, "ct-9");
    }

    #[tokio::test]
    async fn test_delete_encodes_member_id() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/v1/comms/config/fields/f%201"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri());
        CrudEndpoint::<FieldDefinition>::delete(&client, "f 1")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_dismiss_alert_posts_to_member() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/supply-chain/alerts/A-7/dismiss"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri());
        client.dismiss_alert("A-7").await.unwrap();
    }

    #[tokio::test]
    async fn test_insights_passes_process_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(paths::INSIGHTS))
            .and(query_param("process_id", "order to cash"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"bottlenecks": []})))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri());
        let insights = client.insights("order to cash").await.unwrap();
        assert_eq!(insights, json!({"bottlenecks": []}));
    }
}
