//! Core data types received from the dashboard backend
//!
//! Every entity here is a plain record held in client memory only. Collections are
//! replaced wholesale on each poll, so none of these types carry client-side identity
//! beyond the backend's `id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Backend-assigned entity identifier
pub type EntityId = String;

/// Geographic position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lon: f64,
}

impl GeoPoint {
    /// Create a new point
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lat, self.lon)
    }
}

/// Truck movement status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TruckStatus {
    /// On the road toward a destination
    InTransit,
    /// Behind schedule
    Delayed,
    /// Parked without an assignment
    Idle,
    /// Out of service
    Maintenance,
    /// Cargo handed over
    Delivered,
}

impl fmt::Display for TruckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InTransit => write!(f, "in-transit"),
            Self::Delayed => write!(f, "delayed"),
            Self::Idle => write!(f, "idle"),
            Self::Maintenance => write!(f, "maintenance"),
            Self::Delivered => write!(f, "delivered"),
        }
    }
}

/// A fleet vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Truck {
    /// Backend identifier
    pub id: EntityId,
    /// Display name
    pub name: String,
    /// Last reported position
    pub position: GeoPoint,
    /// Movement status
    pub status: TruckStatus,
    /// Current cargo load in tonnes
    pub cargo_load: f64,
    /// Cargo capacity in tonnes
    pub cargo_capacity: f64,
    /// Fuel level in percent
    pub fuel_level: f64,
    /// Destination facility id, if assigned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<EntityId>,
    /// Estimated arrival time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta: Option<DateTime<Utc>>,
}

impl Truck {
    /// Fraction of capacity in use, in `[0, 1]`
    #[must_use]
    pub fn load_factor(&self) -> f64 {
        if self.cargo_capacity <= 0.0 {
            return 0.0;
        }
        (self.cargo_load / self.cargo_capacity).clamp(0.0, 1.0)
    }
}

/// A store or distribution facility
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    /// Backend identifier
    pub id: EntityId,
    /// Display name
    pub name: String,
    /// Facility position
    pub position: GeoPoint,
    /// Stock level in percent of capacity
    pub stock_level: f64,
    /// Storage capacity in units
    pub capacity: u32,
    /// Units consumed per day
    pub demand_rate: f64,
    /// Stocked SKUs
    #[serde(default)]
    pub skus: Vec<String>,
}

impl Store {
    /// Whether stock is at or below the given percentage
    #[must_use]
    pub fn is_low_stock(&self, threshold: f64) -> bool {
        self.stock_level <= threshold
    }
}

/// Alert severity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum AlertSeverity {
    /// Informational
    Low,
    /// Needs attention soon
    Medium,
    /// Needs attention now
    High,
    /// Service impacting
    Critical,
}

/// Alert lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum AlertStatus {
    /// Newly raised
    Open,
    /// Seen by an operator
    Acknowledged,
    /// Dismissed by an operator
    Dismissed,
    /// Closed by the backend
    Resolved,
}

/// An operational alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// Backend identifier
    pub id: EntityId,
    /// Severity
    pub severity: AlertSeverity,
    /// Where the alert applies
    pub position: GeoPoint,
    /// Human readable message
    pub message: String,
    /// Suggested remediation steps
    #[serde(default)]
    pub suggested_actions: Vec<String>,
    /// Lifecycle status
    pub status: AlertStatus,
    /// When the backend raised it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Alert {
    /// Open or acknowledged alerts still count against health
    #[must_use]
    pub const fn is_unresolved(&self) -> bool {
        matches!(self.status, AlertStatus::Open | AlertStatus::Acknowledged)
    }
}

/// Kind of automated recommendation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum AiActionType {
    /// Send a delayed truck another way
    Reroute,
    /// Restock a store
    Replenish,
    /// Send a truck to refuel
    Refuel,
    /// Hand a critical alert to a human
    Escalate,
    /// Book a workshop slot
    ScheduleMaintenance,
}

impl fmt::Display for AiActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reroute => write!(f, "reroute"),
            Self::Replenish => write!(f, "replenish"),
            Self::Refuel => write!(f, "refuel"),
            Self::Escalate => write!(f, "escalate"),
            Self::ScheduleMaintenance => write!(f, "schedule-maintenance"),
        }
    }
}

/// Approval state of a recommendation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum AiActionStatus {
    /// Waiting for an operator
    PendingApproval,
    /// Approved and carried out
    Completed,
}

/// Automated recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAction {
    /// Identifier
    pub id: EntityId,
    /// What kind of action
    pub action_type: AiActionType,
    /// The truck, store or alert it applies to
    pub target_id: EntityId,
    /// Operator-facing description
    pub description: String,
    /// Model confidence in `[0, 1]`
    pub confidence: f64,
    /// Predicted impact score
    pub predicted_impact: f64,
    /// Measured impact once completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_impact: Option<f64>,
    /// Approval state
    pub status: AiActionStatus,
}

/// A configurable communication channel type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationType {
    /// Backend identifier
    pub id: EntityId,
    /// Machine name, lower-case with underscores
    pub name: String,
    /// Label shown in lists
    pub display_name: String,
    /// Longer description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Icon name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Accent color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Position in lists
    #[serde(default)]
    pub sort_order: i32,
    /// Whether the type is offered to users
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

const fn default_enabled() -> bool {
    true
}

/// Input kind of a configurable field
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    /// Free text
    #[default]
    Text,
    /// Numeric input
    Number,
    /// Calendar date
    Date,
    /// One of `options`
    Select,
    /// Checkbox
    Boolean,
}

/// A field attached to communication records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    /// Backend identifier
    pub id: EntityId,
    /// Owning communication type, if scoped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub communication_type_id: Option<EntityId>,
    /// Machine name, lower-case with underscores
    pub name: String,
    /// Label shown in forms
    pub label: String,
    /// Input kind
    #[serde(default)]
    pub field_type: FieldType,
    /// Whether a value is mandatory
    #[serde(default)]
    pub required: bool,
    /// Position in forms
    #[serde(default)]
    pub sort_order: i32,
    /// Choices for select fields
    #[serde(default)]
    pub options: Vec<String>,
}

/// The signed-in user's dashboard profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Business role
    pub role: String,
    /// Areas the user cares about
    #[serde(default)]
    pub focus_areas: Vec<String>,
    /// Free-form display preferences
    #[serde(default)]
    pub preferences: BTreeMap<String, String>,
}

/// Overall platform health reported by the control center
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemHealth {
    /// Status label, e.g. `healthy`
    pub status: String,
    /// Process uptime
    pub uptime_seconds: u64,
    /// CPU usage in percent
    pub cpu_percent: f64,
    /// Memory usage in percent
    pub memory_percent: f64,
    /// When the snapshot was taken
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_at: Option<DateTime<Utc>>,
}

/// State of a backend service
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceState {
    /// Serving normally
    Up,
    /// Serving with errors or latency
    Degraded,
    /// Not serving
    Down,
}

/// A backend service entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
    /// Service name
    pub name: String,
    /// Current state
    pub status: ServiceState,
    /// Last measured latency
    #[serde(default)]
    pub latency_ms: f64,
}

/// One sample of the metrics history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricPoint {
    /// Sample time
    pub timestamp: DateTime<Utc>,
    /// Request rate
    pub requests_per_minute: f64,
    /// Error rate in `[0, 1]`
    pub error_rate: f64,
    /// 95th percentile latency
    pub p95_latency_ms: f64,
}

/// A connected data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceInfo {
    /// Identifier
    pub id: EntityId,
    /// Display name
    pub name: String,
    /// Kind, e.g. `postgres`
    pub kind: String,
    /// Whether the backend can reach it
    pub connected: bool,
    /// Last successful sync
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<DateTime<Utc>>,
}

/// A queryable table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableInfo {
    /// Table name
    pub name: String,
    /// Approximate row count
    #[serde(default)]
    pub row_count: u64,
}

/// A schema in the query catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaInfo {
    /// Schema name
    pub name: String,
    /// Tables it contains
    #[serde(default)]
    pub tables: Vec<TableInfo>,
}

/// Backend health snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSnapshot {
    /// Aggregate status
    pub status: String,
    /// Backend version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Per-component status
    #[serde(default)]
    pub components: BTreeMap<String, String>,
}

/// A mined business process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSummary {
    /// Identifier
    pub id: EntityId,
    /// Display name
    pub name: String,
    /// Number of cases in the event log
    #[serde(default)]
    pub case_count: u64,
    /// Number of events in the event log
    #[serde(default)]
    pub event_count: u64,
}

/// Parameters for process discovery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverRequest {
    /// Process to mine
    pub process_id: EntityId,
    /// Discovery algorithm name
    pub algorithm: String,
    /// Noise filtering threshold in `[0, 1]`
    pub noise_threshold: f64,
}

/// Parameters for a what-if simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateRequest {
    /// Process to simulate
    pub process_id: EntityId,
    /// Scenario adjustments, e.g. `{"staff": 1.2}`
    #[serde(default)]
    pub parameters: BTreeMap<String, f64>,
    /// Simulation runs
    pub iterations: u32,
}

/// Parameters for conformance checking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConformanceRequest {
    /// Process whose log is checked
    pub process_id: EntityId,
    /// Reference model, defaults to the latest discovered one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<EntityId>,
}
