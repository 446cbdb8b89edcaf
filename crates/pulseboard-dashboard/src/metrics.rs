//! Derived metrics
//!
//! Pure functions over the latest snapshots. Nothing here keeps history; every value is
//! recomputed from the collections passed in.

use pulseboard_core::config::MetricsConfig;
use pulseboard_core::types::{
    Alert, AlertSeverity, DataSourceInfo, ServiceInfo, ServiceState, Store, Truck, TruckStatus,
};
use pulseboard_core::utils::percentage;
use serde::Serialize;
use std::collections::BTreeMap;

/// Health score for a number of unresolved issues
///
/// `ceiling - penalty * n`, clamped to `[floor, ceiling]`. With the default configuration
/// this is `max(60, 100 - 3n)`.
#[must_use]
pub fn health_score(unresolved: usize, config: &MetricsConfig) -> u32 {
    let count = u32::try_from(unresolved).unwrap_or(u32::MAX);
    let floor = config.health_floor.min(config.health_ceiling);
    config
        .health_ceiling
        .saturating_sub(config.alert_penalty.saturating_mul(count))
        .clamp(floor, config.health_ceiling)
}

/// Fleet counts
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetSummary {
    /// Trucks in the snapshot
    pub total: usize,
    /// On the road
    pub in_transit: usize,
    /// Behind schedule
    pub delayed: usize,
    /// Parked
    pub idle: usize,
    /// Out of service
    pub maintenance: usize,
    /// Delivered
    pub delivered: usize,
    /// Fuel at or below the low-fuel threshold
    pub low_fuel: usize,
    /// Cargo load across the fleet as a percentage of capacity
    pub utilization_percent: f64,
    /// Trucks not delayed, as a percentage
    pub on_time_percent: f64,
}

impl FleetSummary {
    /// Summarize a fleet snapshot
    #[must_use]
    pub fn compute(trucks: &[Truck], config: &MetricsConfig) -> Self {
        let count = |status: TruckStatus| trucks.iter().filter(|t| t.status == status).count();

        let load: f64 = trucks.iter().map(|t| t.cargo_load).sum();
        let capacity: f64 = trucks.iter().map(|t| t.cargo_capacity).sum();
        let utilization_percent = if capacity > 0.0 {
            (load / capacity * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };

        let delayed = count(TruckStatus::Delayed);
        Self {
            total: trucks.len(),
            in_transit: count(TruckStatus::InTransit),
            delayed,
            idle: count(TruckStatus::Idle),
            maintenance: count(TruckStatus::Maintenance),
            delivered: count(TruckStatus::Delivered),
            low_fuel: trucks
                .iter()
                .filter(|t| t.fuel_level <= config.low_fuel_threshold)
                .count(),
            utilization_percent,
            on_time_percent: percentage(trucks.len() - delayed, trucks.len(), 100.0),
        }
    }

    /// Trucks currently moving cargo
    #[must_use]
    pub const fn active(&self) -> usize {
        self.in_transit + self.delayed
    }
}

/// Store counts
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSummary {
    /// Stores in the snapshot
    pub total: usize,
    /// Stock at or below the low-stock threshold
    pub low_stock: usize,
    /// Mean stock level in percent
    pub average_stock_level: f64,
    /// Units consumed per day across all stores
    pub total_demand: f64,
}

impl StoreSummary {
    /// Summarize a store snapshot
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compute(stores: &[Store], config: &MetricsConfig) -> Self {
        let total_stock: f64 = stores.iter().map(|s| s.stock_level).sum();
        let average_stock_level = if stores.is_empty() {
            0.0
        } else {
            total_stock / stores.len() as f64
        };

        Self {
            total: stores.len(),
            low_stock: stores
                .iter()
                .filter(|s| s.is_low_stock(config.low_stock_threshold))
                .count(),
            average_stock_level,
            total_demand: stores.iter().map(|s| s.demand_rate).sum(),
        }
    }
}

/// Alert counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertSummary {
    /// Alerts in the snapshot
    pub total: usize,
    /// Open or acknowledged
    pub unresolved: usize,
    /// Unresolved and critical
    pub critical: usize,
    /// Unresolved alerts per severity
    pub by_severity: BTreeMap<AlertSeverity, usize>,
}

impl AlertSummary {
    /// Summarize an alert snapshot
    #[must_use]
    pub fn compute(alerts: &[Alert]) -> Self {
        let mut by_severity = BTreeMap::new();
        let mut unresolved = 0;
        for alert in alerts.iter().filter(|a| a.is_unresolved()) {
            unresolved += 1;
            *by_severity.entry(alert.severity).or_insert(0) += 1;
        }

        Self {
            total: alerts.len(),
            unresolved,
            critical: by_severity.get(&AlertSeverity::Critical).copied().unwrap_or(0),
            by_severity,
        }
    }
}

/// Everything the supply-chain header shows
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplyChainSummary {
    /// Network health in `[floor, ceiling]`
    pub health_score: u32,
    /// Fleet counts
    pub fleet: FleetSummary,
    /// Store counts
    pub stores: StoreSummary,
    /// Alert counts
    pub alerts: AlertSummary,
    /// Recommendations waiting for approval
    pub pending_actions: usize,
}

impl SupplyChainSummary {
    /// Summarize the supply-chain snapshots
    #[must_use]
    pub fn compute(
        trucks: &[Truck],
        stores: &[Store],
        alerts: &[Alert],
        config: &MetricsConfig,
    ) -> Self {
        let alerts = AlertSummary::compute(alerts);
        Self {
            health_score: health_score(alerts.unresolved, config),
            fleet: FleetSummary::compute(trucks, config),
            stores: StoreSummary::compute(stores, config),
            alerts,
            pending_actions: 0,
        }
    }

    /// Attach the pending recommendation count
    #[must_use]
    pub const fn with_pending_actions(mut self, pending: usize) -> Self {
        self.pending_actions = pending;
        self
    }
}

/// Control-center service and data-source counts
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlCenterSummary {
    /// Services reporting up
    pub services_up: usize,
    /// Services reporting degraded
    pub services_degraded: usize,
    /// Services reporting down
    pub services_down: usize,
    /// Up services as a percentage of all services
    pub availability_percent: f64,
    /// Reachable data sources
    pub connected_sources: usize,
    /// Data sources in the snapshot
    pub total_sources: usize,
}

impl ControlCenterSummary {
    /// Summarize the control-center snapshots
    #[must_use]
    pub fn compute(services: &[ServiceInfo], sources: &[DataSourceInfo]) -> Self {
        let count = |state: ServiceState| services.iter().filter(|s| s.status == state).count();
        let services_up = count(ServiceState::Up);

        Self {
            services_up,
            services_degraded: count(ServiceState::Degraded),
            services_down: count(ServiceState::Down),
            availability_percent: percentage(services_up, services.len(), 100.0),
            connected_sources: sources.iter().filter(|s| s.connected).count(),
            total_sources: sources.len(),
        }
    }
}
