//! Shared helpers for dashboard integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use pulseboard_client::{ClientError, ClientResult, SupplyChainSource};
use pulseboard_core::Config;
use pulseboard_core::types::{
    Alert, AlertSeverity, AlertStatus, GeoPoint, Store, Truck, TruckStatus,
};
use std::sync::Arc;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Notify;

static INIT_LOGGER: Once = Once::new();

/// Initialize test logging (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    });
}

/// Default configuration with fixture data and no settings file
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.settings.snapshot_file = None;
    config
}

pub fn truck(id: &str, status: TruckStatus) -> Truck {
    Truck {
        id: id.to_string(),
        name: format!("Truck {id}"),
        position: GeoPoint::new(41.88, -87.63),
        status,
        cargo_load: 10.0,
        cargo_capacity: 20.0,
        fuel_level: 70.0,
        destination: None,
        eta: None,
    }
}

pub fn store(id: &str, stock_level: f64) -> Store {
    Store {
        id: id.to_string(),
        name: format!("Store {id}"),
        position: GeoPoint::new(41.88, -87.63),
        stock_level,
        capacity: 1_000,
        demand_rate: 50.0,
        skus: vec!["SKU-1".to_string()],
    }
}

pub fn alert(id: &str, severity: AlertSeverity) -> Alert {
    Alert {
        id: id.to_string(),
        severity,
        position: GeoPoint::new(41.88, -87.63),
        message: format!("Alert {id}"),
        suggested_actions: vec![],
        status: AlertStatus::Open,
        created_at: None,
    }
}

/// Supply-chain source that counts calls, can be switched off and can hold alert
/// responses until released
pub struct CountingSource {
    trucks: Vec<Truck>,
    stores: Vec<Store>,
    alerts: Mutex<Vec<Alert>>,
    truck_calls: AtomicUsize,
    alert_calls: AtomicUsize,
    failing: AtomicBool,
    hold_alerts: AtomicBool,
    release: Notify,
}

impl CountingSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            trucks: vec![
                truck("T-1", TruckStatus::InTransit),
                truck("T-2", TruckStatus::Delayed),
            ],
            stores: vec![store("S-1", 55.0), store("S-2", 10.0)],
            alerts: Mutex::new(vec![
                alert("A-1", AlertSeverity::Critical),
                alert("A-2", AlertSeverity::Low),
            ]),
            truck_calls: AtomicUsize::new(0),
            alert_calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            hold_alerts: AtomicBool::new(false),
            release: Notify::new(),
        })
    }

    pub fn truck_calls(&self) -> usize {
        self.truck_calls.load(Ordering::SeqCst)
    }

    pub fn alert_calls(&self) -> usize {
        self.alert_calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Hold subsequent alert responses until [`Self::release_alerts`]
    pub fn hold_alerts(&self) {
        self.hold_alerts.store(true, Ordering::SeqCst);
    }

    /// Stop holding new alert responses; calls already held stay held
    pub fn resume_alerts(&self) {
        self.hold_alerts.store(false, Ordering::SeqCst);
    }

    pub fn release_alerts(&self) {
        self.hold_alerts.store(false, Ordering::SeqCst);
        self.release.notify_one();
    }

    fn check(&self) -> ClientResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(ClientError::unavailable("scripted outage"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SupplyChainSource for CountingSource {
    async fn list_trucks(&self) -> ClientResult<Vec<Truck>> {
        self.truck_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.trucks.clone())
    }

    async fn list_stores(&self) -> ClientResult<Vec<Store>> {
        self.check()?;
        Ok(self.stores.clone())
    }

    async fn list_alerts(&self) -> ClientResult<Vec<Alert>> {
        // Snapshot first so a held response is stale by the time it lands
        let snapshot = self.alerts.lock().clone();
        self.alert_calls.fetch_add(1, Ordering::SeqCst);
        if self.hold_alerts.load(Ordering::SeqCst) {
            self.release.notified().await;
        }
        self.check()?;
        Ok(snapshot)
    }

    async fn dismiss_alert(&self, id: &str) -> ClientResult<()> {
        self.check()?;
        let mut alerts = self.alerts.lock();
        let alert = alerts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| ClientError::not_found(format!("alert {id}")))?;
        alert.status = AlertStatus::Dismissed;
        Ok(())
    }

    async fn approve_action(&self, _id: &str) -> ClientResult<()> {
        self.check()
    }
}
