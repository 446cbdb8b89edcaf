//! Bundled fixture data served without a backend
//!
//! The fixture set is a small Midwest distribution network. Read-only collections are
//! rebuilt deterministically on construction; configuration entities and the profile
//! live in memory so a create followed by a list behaves like the live backend.

use crate::error::{ClientError, ClientResult};
use crate::source::{
    CatalogSource, ControlCenterSource, CrudEndpoint, ProcessMiningSource, ProfileSource,
    SupplyChainSource,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use pulseboard_core::forms::{CommunicationTypeForm, FieldDefinitionForm, ProfileForm};
use pulseboard_core::types::{
    Alert, AlertSeverity, AlertStatus, CommunicationType, ConformanceRequest, DataSourceInfo,
    DiscoverRequest, FieldDefinition, FieldType, GeoPoint, HealthSnapshot, MetricPoint,
    ProcessSummary, SchemaInfo, ServiceInfo, ServiceState, SimulateRequest, Store, SystemHealth,
    TableInfo, Truck, TruckStatus, UserProfile,
};
use serde_json::json;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;
use uuid::Uuid;

/// Fixed reference time so fixture timestamps are reproducible
const FIXTURE_EPOCH_SECONDS: i64 = 1_735_689_600;

#[derive(Debug, Default)]
struct FixtureState {
    trucks: Vec<Truck>,
    stores: Vec<Store>,
    alerts: Vec<Alert>,
    comm_types: Vec<CommunicationType>,
    fields: Vec<FieldDefinition>,
    profile: Option<UserProfile>,
    approved_actions: HashSet<String>,
}

/// In-memory data source backed by the bundled fixture set
#[derive(Debug)]
pub struct FixtureSource {
    state: RwLock<FixtureState>,
    available: AtomicBool,
}

impl Default for FixtureSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FixtureSource {
    /// Build the fixture set
    #[must_use]
    pub fn new() -> Self {
        let state = FixtureState {
            trucks: fixture_trucks(),
            stores: fixture_stores(),
            alerts: fixture_alerts(),
            comm_types: fixture_comm_types(),
            fields: fixture_fields(),
            ..FixtureState::default()
        };
        Self {
            state: RwLock::new(state),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate a backend outage; every call fails with [`ClientError::Unavailable`]
    /// while set to `false`
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Ids of recommendations approved through this source
    #[must_use]
    pub fn approved_actions(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.state.read().approved_actions.iter().cloned().collect();
        ids.sort();
        ids
    }

    fn check(&self) -> ClientResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ClientError::unavailable("fixture source is offline"))
        }
    }
}

fn epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(FIXTURE_EPOCH_SECONDS, 0).unwrap_or_default()
}

fn truck(
    id: &str,
    position: GeoPoint,
    status: TruckStatus,
    load: f64,
    fuel: f64,
    destination: Option<&str>,
) -> Truck {
    Truck {
        id: id.to_string(),
        name: format!("Rig {}", id.trim_start_matches("TRK-")),
        position,
        status,
        cargo_load: load,
        cargo_capacity: 24.0,
        fuel_level: fuel,
        destination: destination.map(str::to_string),
        eta: destination.map(|_| epoch() + Duration::hours(4)),
    }
}

fn fixture_trucks() -> Vec<Truck> {
    vec![
        truck("TRK-101", GeoPoint::new(41.8781, -87.6298), TruckStatus::InTransit, 18.5, 72.0, Some("STR-2")),
        truck("TRK-102", GeoPoint::new(41.5868, -87.3387), TruckStatus::Delayed, 22.0, 45.0, Some("STR-3")),
        truck("TRK-103", GeoPoint::new(42.0334, -88.0834), TruckStatus::Idle, 0.0, 88.0, None),
        truck("TRK-104", GeoPoint::new(41.7508, -88.1535), TruckStatus::InTransit, 12.0, 14.5, Some("STR-4")),
        truck("TRK-105", GeoPoint::new(42.2711, -89.0940), TruckStatus::Maintenance, 0.0, 60.0, None),
        truck("TRK-106", GeoPoint::new(41.6764, -86.2520), TruckStatus::Delivered, 3.0, 38.0, None),
        truck("TRK-107", GeoPoint::new(43.0389, -87.9065), TruckStatus::InTransit, 20.0, 55.0, Some("STR-5")),
        truck("TRK-108", GeoPoint::new(41.5250, -88.0817), TruckStatus::Delayed, 16.0, 9.0, Some("STR-1")),
    ]
}

fn fixture_stores() -> Vec<Store> {
    let store = |id: &str, name: &str, position, stock_level, capacity, demand_rate, skus: &[&str]| Store {
        id: id.to_string(),
        name: name.to_string(),
        position,
        stock_level,
        capacity,
        demand_rate,
        skus: skus.iter().map(|s| (*s).to_string()).collect(),
    };

    vec![
        store("STR-1", "Joliet Distribution Center", GeoPoint::new(41.5250, -88.0817), 64.0, 12_000, 410.0, &["SKU-100", "SKU-200", "SKU-300"]),
        store("STR-2", "Loop Market", GeoPoint::new(41.8837, -87.6278), 18.0, 1_500, 95.0, &["SKU-100", "SKU-110"]),
        store("STR-3", "Gary Depot", GeoPoint::new(41.6020, -87.3372), 42.0, 4_000, 160.0, &["SKU-200"]),
        store("STR-4", "Naperville Grocer", GeoPoint::new(41.7508, -88.1535), 11.5, 900, 70.0, &["SKU-110", "SKU-300"]),
        store("STR-5", "Milwaukee Cross-Dock", GeoPoint::new(43.0389, -87.9065), 77.0, 8_000, 300.0, &["SKU-100", "SKU-200"]),
    ]
}

fn fixture_alerts() -> Vec<Alert> {
    let alert = |id: &str, severity, position, message: &str, actions: &[&str], status, minutes_ago| Alert {
        id: id.to_string(),
        severity,
        position,
        message: message.to_string(),
        suggested_actions: actions.iter().map(|a| (*a).to_string()).collect(),
        status,
        created_at: Some(epoch() - Duration::minutes(minutes_ago)),
    };

    vec![
        alert(
            "ALT-1",
            AlertSeverity::Critical,
            GeoPoint::new(41.8800, -87.6300),
            "Loop Market below safety stock",
            &["Expedite replenishment", "Transfer from STR-1"],
            AlertStatus::Open,
            12,
        ),
        alert(
            "ALT-2",
            AlertSeverity::High,
            GeoPoint::new(41.5900, -87.3400),
            "TRK-102 delayed by congestion on I-94",
            &["Reroute via I-80"],
            AlertStatus::Open,
            35,
        ),
        alert(
            "ALT-3",
            AlertSeverity::Medium,
            GeoPoint::new(41.7500, -88.1500),
            "TRK-104 fuel below 15%",
            &["Refuel at next stop"],
            AlertStatus::Acknowledged,
            50,
        ),
        alert(
            "ALT-4",
            AlertSeverity::Low,
            GeoPoint::new(43.0400, -87.9100),
            "Dock door 3 sensor offline",
            &[],
            AlertStatus::Resolved,
            240,
        ),
    ]
}

fn fixture_comm_types() -> Vec<CommunicationType> {
    vec![
        CommunicationType {
            id: "ct-email".to_string(),
            name: "email".to_string(),
            display_name: "Email".to_string(),
            description: Some("Outbound email notifications".to_string()),
            icon: Some("mail".to_string()),
            color: Some("#1976d2".to_string()),
            sort_order: 0,
            enabled: true,
        },
        CommunicationType {
            id: "ct-sms".to_string(),
            name: "sms".to_string(),
            display_name: "SMS".to_string(),
            description: None,
            icon: Some("sms".to_string()),
            color: None,
            sort_order: 1,
            enabled: true,
        },
    ]
}

fn fixture_fields() -> Vec<FieldDefinition> {
    vec![FieldDefinition {
        id: "fd-priority".to_string(),
        communication_type_id: Some("ct-email".to_string()),
        name: "priority".to_string(),
        label: "Priority".to_string(),
        field_type: FieldType::Select,
        required: true,
        sort_order: 0,
        options: vec!["low".to_string(), "normal".to_string(), "high".to_string()],
    }]
}

#[async_trait]
impl SupplyChainSource for FixtureSource {
    async fn list_trucks(&self) -> ClientResult<Vec<Truck>> {
        self.check()?;
        Ok(self.state.read().trucks.clone())
    }

    async fn list_stores(&self) -> ClientResult<Vec<Store>> {
        self.check()?;
        Ok(self.state.read().stores.clone())
    }

    async fn list_alerts(&self) -> ClientResult<Vec<Alert>> {
        self.check()?;
        Ok(self.state.read().alerts.clone())
    }

    async fn dismiss_alert(&self, id: &str) -> ClientResult<()> {
        self.check()?;
        let mut state = self.state.write();
        let alert = state
            .alerts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| ClientError::not_found(format!("alert {id}")))?;
        alert.status = AlertStatus::Dismissed;
        debug!(alert_id = id, "Fixture alert dismissed");
        Ok(())
    }

    async fn approve_action(&self, id: &str) -> ClientResult<()> {
        self.check()?;
        self.state.write().approved_actions.insert(id.to_string());
        debug!(action_id = id, "Fixture action approved");
        Ok(())
    }
}

#[async_trait]
impl ControlCenterSource for FixtureSource {
    async fn system_health(&self) -> ClientResult<SystemHealth> {
        self.check()?;
        Ok(SystemHealth {
            status: "healthy".to_string(),
            uptime_seconds: 86_400 * 3 + 4_512,
            cpu_percent: 37.5,
            memory_percent: 61.2,
            checked_at: Some(epoch()),
        })
    }

    async fn services(&self) -> ClientResult<Vec<ServiceInfo>> {
        self.check()?;
        let service = |name: &str, status, latency_ms| ServiceInfo {
            name: name.to_string(),
            status,
            latency_ms,
        };
        Ok(vec![
            service("query-engine", ServiceState::Up, 42.0),
            service("process-mining", ServiceState::Up, 118.0),
            service("ingestion", ServiceState::Degraded, 640.0),
            service("notifications", ServiceState::Up, 23.0),
        ])
    }

    async fn metrics_history(&self) -> ClientResult<Vec<MetricPoint>> {
        self.check()?;
        Ok((0..12_u32)
            .map(|i| {
                let step = f64::from(i);
                MetricPoint {
                    timestamp: epoch() - Duration::minutes(i64::from(55 - i * 5)),
                    requests_per_minute: 1_150.0 + step * 25.0,
                    error_rate: 0.004 + (step % 4.0) * 0.001,
                    p95_latency_ms: 180.0 + (step % 3.0) * 15.0,
                }
            })
            .collect())
    }

    async fn data_sources(&self) -> ClientResult<Vec<DataSourceInfo>> {
        self.check()?;
        Ok(vec![
            DataSourceInfo {
                id: "ds-warehouse".to_string(),
                name: "Warehouse".to_string(),
                kind: "postgres".to_string(),
                connected: true,
                last_sync: Some(epoch() - Duration::minutes(3)),
            },
            DataSourceInfo {
                id: "ds-telematics".to_string(),
                name: "Fleet telematics".to_string(),
                kind: "kafka".to_string(),
                connected: true,
                last_sync: Some(epoch()),
            },
            DataSourceInfo {
                id: "ds-erp".to_string(),
                name: "ERP export".to_string(),
                kind: "sftp".to_string(),
                connected: false,
                last_sync: None,
            },
        ])
    }
}

#[async_trait]
impl CatalogSource for FixtureSource {
    async fn schemas(&self) -> ClientResult<Vec<SchemaInfo>> {
        self.check()?;
        let table = |name: &str, row_count| TableInfo {
            name: name.to_string(),
            row_count,
        };
        Ok(vec![
            SchemaInfo {
                name: "logistics".to_string(),
                tables: vec![
                    table("shipments", 184_220),
                    table("trucks", 8),
                    table("routes", 1_312),
                ],
            },
            SchemaInfo {
                name: "retail".to_string(),
                tables: vec![table("stores", 5), table("inventory", 48_900)],
            },
        ])
    }

    async fn health(&self) -> ClientResult<HealthSnapshot> {
        self.check()?;
        Ok(HealthSnapshot {
            status: "ok".to_string(),
            version: Some("fixture".to_string()),
            components: BTreeMap::from([
                ("database".to_string(), "ok".to_string()),
                ("llm".to_string(), "ok".to_string()),
            ]),
        })
    }
}

#[async_trait]
impl CrudEndpoint<CommunicationType> for FixtureSource {
    async fn list(&self) -> ClientResult<Vec<CommunicationType>> {
        self.check()?;
        let mut items = self.state.read().comm_types.clone();
        items.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.name.cmp(&b.name)));
        Ok(items)
    }

    async fn create(&self, form: &CommunicationTypeForm) -> ClientResult<CommunicationType> {
        self.check()?;
        let entity = form.clone().into_entity(Uuid::new_v4().to_string());
        self.state.write().comm_types.push(entity.clone());
        Ok(entity)
    }

    async fn update(&self, id: &str, form: &CommunicationTypeForm) -> ClientResult<CommunicationType> {
        self.check()?;
        let mut state = self.state.write();
        let slot = state
            .comm_types
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| ClientError::not_found(format!("communication type {id}")))?;
        *slot = form.clone().into_entity(id.to_string());
        Ok(slot.clone())
    }

    async fn delete(&self, id: &str) -> ClientResult<()> {
        self.check()?;
        let mut state = self.state.write();
        let before = state.comm_types.len();
        state.comm_types.retain(|t| t.id != id);
        if state.comm_types.len() == before {
            return Err(ClientError::not_found(format!("communication type {id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl CrudEndpoint<FieldDefinition> for FixtureSource {
    async fn list(&self) -> ClientResult<Vec<FieldDefinition>> {
        self.check()?;
        let mut items = self.state.read().fields.clone();
        items.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.name.cmp(&b.name)));
        Ok(items)
    }

    async fn create(&self, form: &FieldDefinitionForm) -> ClientResult<FieldDefinition> {
        self.check()?;
        let entity = form.clone().into_entity(Uuid::new_v4().to_string());
        self.state.write().fields.push(entity.clone());
        Ok(entity)
    }

    async fn update(&self, id: &str, form: &FieldDefinitionForm) -> ClientResult<FieldDefinition> {
        self.check()?;
        let mut state = self.state.write();
        let slot = state
            .fields
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| ClientError::not_found(format!("field definition {id}")))?;
        *slot = form.clone().into_entity(id.to_string());
        Ok(slot.clone())
    }

    async fn delete(&self, id: &str) -> ClientResult<()> {
        self.check()?;
        let mut state = self.state.write();
        let before = state.fields.len();
        state.fields.retain(|f| f.id != id);
        if state.fields.len() == before {
            return Err(ClientError::not_found(format!("field definition {id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileSource for FixtureSource {
    async fn get_profile(&self) -> ClientResult<Option<UserProfile>> {
        self.check()?;
        Ok(self.state.read().profile.clone())
    }

    async fn create_profile(&self, form: &ProfileForm) -> ClientResult<UserProfile> {
        self.check()?;
        let profile = UserProfile::from(form.clone());
        self.state.write().profile = Some(profile.clone());
        Ok(profile)
    }

    async fn update_profile(&self, form: &ProfileForm) -> ClientResult<UserProfile> {
        self.check()?;
        let mut state = self.state.write();
        if state.profile.is_none() {
            return Err(ClientError::not_found("profile"));
        }
        let profile = UserProfile::from(form.clone());
        state.profile = Some(profile.clone());
        Ok(profile)
    }
}

#[async_trait]
impl ProcessMiningSource for FixtureSource {
    async fn processes(&self) -> ClientResult<Vec<ProcessSummary>> {
        self.check()?;
        Ok(vec![
            ProcessSummary {
                id: "order-to-cash".to_string(),
                name: "Order to cash".to_string(),
                case_count: 1_204,
                event_count: 9_870,
            },
            ProcessSummary {
                id: "procure-to-pay".to_string(),
                name: "Procure to pay".to_string(),
                case_count: 642,
                event_count: 4_115,
            },
        ])
    }

    async fn discover(&self, request: &DiscoverRequest) -> ClientResult<serde_json::Value> {
        self.check()?;
        Ok(json!({
            "processId": request.process_id,
            "algorithm": request.algorithm,
            "noiseThreshold": request.noise_threshold,
            "activities": ["Create order", "Approve", "Ship", "Invoice", "Receive payment"],
            "edges": [
                {"from": "Create order", "to": "Approve", "frequency": 1204},
                {"from": "Approve", "to": "Ship", "frequency": 1150},
                {"from": "Ship", "to": "Invoice", "frequency": 1150},
                {"from": "Invoice", "to": "Receive payment", "frequency": 1098}
            ]
        }))
    }

    async fn simulate(&self, request: &SimulateRequest) -> ClientResult<serde_json::Value> {
        self.check()?;
        Ok(json!({
            "processId": request.process_id,
            "iterations": request.iterations,
            "parameters": request.parameters,
            "avgCycleTimeHours": 52.4,
            "throughputPerDay": 38.0
        }))
    }

    async fn conformance(&self, request: &ConformanceRequest) -> ClientResult<serde_json::Value> {
        self.check()?;
        Ok(json!({
            "processId": request.process_id,
            "modelId": request.model_id,
            "fitness": 0.93,
            "deviations": [{"activity": "Ship", "kind": "skipped", "cases": 54}]
        }))
    }

    async fn insights(&self, process_id: &str) -> ClientResult<serde_json::Value> {
        self.check()?;
        Ok(json!({
            "processId": process_id,
            "bottlenecks": [{"activity": "Approve", "avgWaitHours": 14.2}]
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_fixture_collections_are_deterministic() {
        let a = FixtureSource::new();
        let b = FixtureSource::new();
        assert_eq!(a.list_trucks().await.unwrap(), b.list_trucks().await.unwrap());
        assert_eq!(a.list_alerts().await.unwrap(), b.list_alerts().await.unwrap());
    }

    #[tokio::test]
    async fn test_fixture_does_not_supply_actions() {
        let source = FixtureSource::new();
        assert_eq!(source.list_actions().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_offline_fixture_fails_every_call() {
        let source = FixtureSource::new();
        source.set_available(false);

        assert!(matches!(
            source.list_stores().await,
            Err(ClientError::Unavailable { .. })
        ));

        source.set_available(true);
        assert_eq!(source.list_stores().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_dismiss_alert_updates_status() {
        let source = FixtureSource::new();
        source.dismiss_alert("ALT-1").await.unwrap();

        let alerts = source.list_alerts().await.unwrap();
        let alert = alerts.iter().find(|a| a.id == "ALT-1").unwrap();
        assert_eq!(alert.status, AlertStatus::Dismissed);

        assert!(matches!(
            source.dismiss_alert("missing").await,
            Err(ClientError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_then_list_includes_entity() {
        let source = FixtureSource::new();
        let form = CommunicationTypeForm {
            name: "push".to_string(),
            display_name: "Push".to_string(),
            sort_order: 5,
            enabled: true,
            ..Default::default()
        };

        let created = CrudEndpoint::<CommunicationType>::create(&source, &form)
            .await
            .unwrap();
        let listed = CrudEndpoint::<CommunicationType>::list(&source).await.unwrap();

        assert!(listed.contains(&created));
        assert_eq!(created.name, "push");
    }

    #[tokio::test]
    async fn test_update_missing_field_is_not_found() {
        let source = FixtureSource::new();
        let result =
            CrudEndpoint::<FieldDefinition>::update(&source, "nope", &FieldDefinitionForm::default())
                .await;
        assert!(matches!(result, Err(ClientError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_profile_requires_create_before_update() {
        let source = FixtureSource::new();
        assert_eq!(source.get_profile().await.unwrap(), None);

        let form = ProfileForm {
            role: "planner".to_string(),
            ..Default::default()
        };
        assert!(source.update_profile(&form).await.is_err());

        source.create_profile(&form).await.unwrap();
        assert_eq!(
            source.get_profile().await.unwrap().map(|p| p.role),
            Some("planner".to_string())
        );
    }
}
