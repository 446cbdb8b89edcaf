//! Recommendations derived from the current snapshots
//!
//! Used when the backend does not supply its own. Ids are `{type}-{target}`, so the same
//! snapshot always yields the same actions and approvals survive re-derivation.

use pulseboard_core::config::MetricsConfig;
use pulseboard_core::types::{
    AiAction, AiActionStatus, AiActionType, Alert, AlertSeverity, Store, Truck, TruckStatus,
};

/// Confidence assigned to derived reroutes
pub const REROUTE_CONFIDENCE: f64 = 0.82;
/// Confidence assigned to derived refuels
pub const REFUEL_CONFIDENCE: f64 = 0.9;
/// Confidence assigned to derived maintenance bookings
pub const MAINTENANCE_CONFIDENCE: f64 = 0.7;
/// Confidence assigned to derived replenishments
pub const REPLENISH_CONFIDENCE: f64 = 0.85;
/// Confidence assigned to derived escalations
pub const ESCALATE_CONFIDENCE: f64 = 0.75;

fn action(
    action_type: AiActionType,
    target_id: &str,
    description: String,
    confidence: f64,
    predicted_impact: f64,
) -> AiAction {
    AiAction {
        id: format!("{action_type}-{target_id}"),
        action_type,
        target_id: target_id.to_string(),
        description,
        confidence,
        predicted_impact,
        actual_impact: None,
        status: AiActionStatus::PendingApproval,
    }
}

/// Derive recommendations from trucks, stores and alerts
#[must_use]
pub fn derive_actions(
    trucks: &[Truck],
    stores: &[Store],
    alerts: &[Alert],
    config: &MetricsConfig,
) -> Vec<AiAction> {
    let mut actions = Vec::new();

    for truck in trucks {
        if truck.status == TruckStatus::Delayed {
            actions.push(action(
                AiActionType::Reroute,
                &truck.id,
                format!("Reroute {} around the current delay", truck.name),
                REROUTE_CONFIDENCE,
                truck.load_factor() * 10.0,
            ));
        }
        if truck.fuel_level <= config.low_fuel_threshold {
            actions.push(action(
                AiActionType::Refuel,
                &truck.id,
                format!("Refuel {} ({:.0}% remaining)", truck.name, truck.fuel_level),
                REFUEL_CONFIDENCE,
                (config.low_fuel_threshold - truck.fuel_level).max(0.0),
            ));
        }
        if truck.status == TruckStatus::Maintenance {
            actions.push(action(
                AiActionType::ScheduleMaintenance,
                &truck.id,
                format!("Book a workshop slot for {}", truck.name),
                MAINTENANCE_CONFIDENCE,
                5.0,
            ));
        }
    }

    for store in stores.iter().filter(|s| s.is_low_stock(config.low_stock_threshold)) {
        actions.push(action(
            AiActionType::Replenish,
            &store.id,
            format!("Replenish {} (stock at {:.0}%)", store.name, store.stock_level),
            REPLENISH_CONFIDENCE,
            store.demand_rate,
        ));
    }

    for alert in alerts
        .iter()
        .filter(|a| a.is_unresolved() && a.severity == AlertSeverity::Critical)
    {
        actions.push(action(
            AiActionType::Escalate,
            &alert.id,
            format!("Escalate: {}", alert.message),
            ESCALATE_CONFIDENCE,
            20.0,
        ));
    }

    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use pulseboard_core::types::{AlertStatus, GeoPoint};

    fn truck(id: &str, status: TruckStatus, fuel: f64) -> Truck {
        Truck {
            id: id.to_string(),
            name: id.to_string(),
            position: GeoPoint::new(0.0, 0.0),
            status,
            cargo_load: 5.0,
            cargo_capacity: 10.0,
            fuel_level: fuel,
            destination: None,
            eta: None,
        }
    }

    #[test]
    fn test_truck_rules() {
        let trucks = vec![
            truck("T-1", TruckStatus::Delayed, 80.0),
            truck("T-2", TruckStatus::InTransit, 10.0),
            truck("T-3", TruckStatus::Maintenance, 50.0),
            truck("T-4", TruckStatus::Idle, 90.0),
        ];

        let actions = derive_actions(&trucks, &[], &[], &MetricsConfig::default());
        let ids: Vec<_> = actions.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["reroute-T-1", "refuel-T-2", "schedule-maintenance-T-3"]
        );
        assert!(actions.iter().all(|a| a.status == AiActionStatus::PendingApproval));
        assert!((actions[0].confidence - REROUTE_CONFIDENCE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_store_and_alert_rules() {
        let stores = vec![Store {
            id: "S-1".to_string(),
            name: "Corner".to_string(),
            position: GeoPoint::new(0.0, 0.0),
            stock_level: 12.0,
            capacity: 100,
            demand_rate: 4.0,
            skus: vec![],
        }];
        let critical = |id: &str, status| Alert {
            id: id.to_string(),
            severity: AlertSeverity::Critical,
            position: GeoPoint::new(0.0, 0.0),
            message: "Outage".to_string(),
            suggested_actions: vec![],
            status,
            created_at: None,
        };
        let alerts = vec![
            critical("A-1", AlertStatus::Open),
            critical("A-2", AlertStatus::Dismissed),
        ];

        let actions = derive_actions(&[], &stores, &alerts, &MetricsConfig::default());
        let ids: Vec<_> = actions.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["replenish-S-1", "escalate-A-1"]);
    }

    #[test]
    fn test_derivation_is_stable() {
        let trucks = vec![truck("T-1", TruckStatus::Delayed, 5.0)];
        let config = MetricsConfig::default();
        assert_eq!(
            derive_actions(&trucks, &[], &[], &config),
            derive_actions(&trucks, &[], &[], &config)
        );
    }
}
