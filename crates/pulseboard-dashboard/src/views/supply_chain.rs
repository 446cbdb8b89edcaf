//! Supply-chain map view
//!
//! Polls trucks, stores, alerts and (when the backend has them) recommendations. Alert
//! dismissals and action approvals are applied locally first and reconciled against
//! later polls through [`OptimisticOverlay`].

use super::{ResourceError, coordinator, error_of, track};
use crate::actions::derive_actions;
use crate::error::{DashboardError, Result};
use crate::metrics::SupplyChainSummary;
use crate::poller::{CoordinatorStatus, CycleReport, PollingCoordinator};
use crate::reconcile::OptimisticOverlay;
use crate::resource::ResourceHandle;
use crate::selection::{Selection, SelectionCoordinator, ViewportState};
use futures::FutureExt;
use pulseboard_client::SupplyChainSource;
use pulseboard_core::Config;
use pulseboard_core::config::MetricsConfig;
use pulseboard_core::types::{AiAction, AiActionStatus, Alert, AlertStatus, Store, Truck};
use pulseboard_core::utils::nearby;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// State behind the supply-chain map
pub struct SupplyChainView {
    poller: PollingCoordinator,
    source: Arc<dyn SupplyChainSource>,
    trucks: ResourceHandle<Vec<Truck>>,
    stores: ResourceHandle<Vec<Store>>,
    alerts: ResourceHandle<Vec<Alert>>,
    actions: ResourceHandle<Option<Vec<AiAction>>>,
    alert_overlay: OptimisticOverlay<AlertStatus>,
    action_overlay: OptimisticOverlay<AiActionStatus>,
    selection: SelectionCoordinator<ViewportState>,
    metrics: MetricsConfig,
    proximity_degrees: f64,
}

impl fmt::Debug for SupplyChainView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupplyChainView")
            .field("poller", &self.poller)
            .field("pending_dismissals", &self.alert_overlay.len())
            .field("pending_approvals", &self.action_overlay.len())
            .field("selection", &self.selection.selection().id())
            .finish_non_exhaustive()
    }
}

impl SupplyChainView {
    /// Build the view over a data source
    ///
    /// # Errors
    ///
    /// Returns an error if a resource cannot be registered with the coordinator.
    pub fn new(source: Arc<dyn SupplyChainSource>, config: &Config) -> Result<Self> {
        let poller = coordinator("supply-chain", &config.polling);

        let trucks = track(&poller, "trucks", &source, |s| {
            async move { s.list_trucks().await }.boxed()
        })?;
        let stores = track(&poller, "stores", &source, |s| {
            async move { s.list_stores().await }.boxed()
        })?;
        let alerts = track(&poller, "alerts", &source, |s| {
            async move { s.list_alerts().await }.boxed()
        })?;
        let actions = track(&poller, "actions", &source, |s| {
            async move { s.list_actions().await }.boxed()
        })?;

        Ok(Self {
            poller,
            source,
            trucks,
            stores,
            alerts,
            actions,
            alert_overlay: OptimisticOverlay::new(),
            action_overlay: OptimisticOverlay::new(),
            selection: SelectionCoordinator::new(&config.map),
            metrics: config.metrics.clone(),
            proximity_degrees: config.proximity.threshold_degrees,
        })
    }

    /// Fetch everything and start the timer
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::AlreadyActive`] if the view is already active.
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

    /// Manual refresh; the timer keeps its schedule
    pub async fn refresh(&self) -> CycleReport {
        self.poller.refresh_now().await
    }

    /// The coordinator driving this view
    #[must_use]
    pub const fn poller(&self) -> &PollingCoordinator {
        &self.poller
    }

    /// Whether the timer is armed
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.poller.status() == CoordinatorStatus::Active
    }

    /// Current fleet
    #[must_use]
    pub fn trucks(&self) -> Vec<Truck> {
        self.trucks.data()
    }

    /// Current stores
    #[must_use]
    pub fn stores(&self) -> Vec<Store> {
        self.stores.data()
    }

    /// Current alerts with local dismissals applied
    #[must_use]
    pub fn alerts(&self) -> Vec<Alert> {
        let state = self.alerts.snapshot();
        if let Some(issued_at) = state.issued_at {
            self.alert_overlay.reconcile(issued_at);
        }

        let mut alerts = state.data;
        self.alert_overlay
            .apply(&mut alerts, |a| a.id.as_str(), |a, status| a.status = *status);
        alerts
    }

    /// Recommendations from the backend, or derived from the snapshots when the
    /// backend supplies none, with local approvals applied
    #[must_use]
    pub fn actions(&self) -> Vec<AiAction> {
        let state = self.actions.snapshot();
        let mut actions = match state.data {
            Some(actions) => {
                if let Some(issued_at) = state.issued_at {
                    self.action_overlay.reconcile(issued_at);
                }
                actions
            }
            None => derive_actions(
                &self.trucks.data(),
                &self.stores.data(),
                &self.alerts(),
                &self.metrics,
            ),
        };

        self.action_overlay
            .apply(&mut actions, |a| a.id.as_str(), |a, status| a.status = *status);
        actions
    }

    /// Header metrics for the current snapshots
    #[must_use]
    pub fn summary(&self) -> SupplyChainSummary {
        let pending = self
            .actions()
            .iter()
            .filter(|a| a.status == AiActionStatus::PendingApproval)
            .count();

        SupplyChainSummary::compute(
            &self.trucks.data(),
            &self.stores.data(),
            &self.alerts(),
            &self.metrics,
        )
        .with_pending_actions(pending)
    }

    /// Resource-scoped error flags
    #[must_use]
    pub fn errors(&self) -> Vec<ResourceError> {
        [
            error_of(&self.trucks),
            error_of(&self.stores),
            error_of(&self.alerts),
            error_of(&self.actions),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Whether any resource fetch is in flight
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.trucks.is_loading()
            || self.stores.is_loading()
            || self.alerts.is_loading()
            || self.actions.is_loading()
    }

    /// Current detail-panel selection
    #[must_use]
    pub const fn selection(&self) -> &Selection {
        self.selection.selection()
    }

    /// Map viewport driven by the selection
    #[must_use]
    pub const fn viewport(&self) -> &ViewportState {
        self.selection.viewport()
    }

    /// Open the store panel
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::NotFound`] if the store is not in the current snapshot.
    pub fn select_store(&mut self, id: &str) -> Result<()> {
        let stores = self.stores.data();
        self.selection.select_store_by_id(&stores, id)
    }

    /// Open the truck panel
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::NotFound`] if the truck is not in the current snapshot.
    pub fn select_truck(&mut self, id: &str) -> Result<()> {
        let trucks = self.trucks.data();
        self.selection.select_truck_by_id(&trucks, id)
    }

    /// Open the alert panel
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::NotFound`] if the alert is not in the current snapshot.
    pub fn select_alert(&mut self, id: &str) -> Result<()> {
        let alerts = self.alerts();
        self.selection.select_alert_by_id(&alerts, id)
    }

    /// Close the open panel
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Unresolved alerts near the selected store
    ///
    /// Proximity is the coordinate-delta heuristic from
    /// [`pulseboard_core::utils::is_nearby`]; empty when no store is selected.
    #[must_use]
    pub fn nearby_alerts(&self) -> Vec<Alert> {
        let Some(store) = self.selection.selection().store() else {
            return Vec::new();
        };

        let alerts = self.alerts();
        nearby(store.position, &alerts, |a| a.position, self.proximity_degrees)
            .into_iter()
            .filter(|a| a.is_unresolved())
            .cloned()
            .collect()
    }

    /// Dismiss an alert, showing it dismissed before the backend confirms
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::NotFound`] for an unknown alert. A backend failure
    /// reverts the local change, flags the alerts resource and is returned.
    pub async fn dismiss_alert(&self, id: &str) -> Result<()> {
        if !self.alerts.with_data(|alerts| alerts.iter().any(|a| a.id == id)) {
            return Err(DashboardError::not_found(format!("alert {id}")));
        }

        self.alert_overlay.record(id, AlertStatus::Dismissed);
        match self.source.dismiss_alert(id).await {
            Ok(()) => {
                self.alert_overlay.confirm(id);
                info!(alert_id = id, "Alert dismissed");
                Ok(())
            }
            Err(e) => {
                self.alert_overlay.revert(id);
                self.alerts
                    .record_error(format!("Failed to dismiss alert {id}: {e}"));
                warn!(alert_id = id, error = %e, "Dismiss failed, reverted");
                Err(e.into())
            }
        }
    }

    /// Approve a recommendation, showing it completed before the backend confirms
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::NotFound`] for an unknown action. A backend failure
    /// reverts the local change, flags the actions resource and is returned.
    pub async fn approve_action(&self, id: &str) -> Result<()> {
        if !self.actions().iter().any(|a| a.id == id) {
            return Err(DashboardError::not_found(format!("action {id}")));
        }

        self.action_overlay.record(id, AiActionStatus::Completed);
        match self.source.approve_action(id).await {
            Ok(()) => {
                self.action_overlay.confirm(id);
                info!(action_id = id, "Action approved");
                Ok(())
            }
            Err(e) => {
                self.action_overlay.revert(id);
                self.actions
                    .record_error(format!("Failed to approve action {id}: {e}"));
                warn!(action_id = id, error = %e, "Approve failed, reverted");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use pulseboard_client::FixtureSource;

    async fn view() -> (Arc<FixtureSource>, SupplyChainView) {
        let source = Arc::new(FixtureSource::new());
        let view = SupplyChainView::new(source.clone(), &Config::default()).unwrap();
        view.refresh().await;
        (source, view)
    }

    #[tokio::test]
    async fn test_refresh_populates_collections() {
        let (_, view) = view().await;
        assert_eq!(view.trucks().len(), 8);
        assert_eq!(view.stores().len(), 5);
        assert!(view.errors().is_empty());
        assert!(!view.is_active());
    }

    #[tokio::test]
    async fn test_actions_derived_without_backend_actions() {
        let (_, view) = view().await;
        let ids: Vec<_> = view.actions().into_iter().map(|a| a.id).collect();
        assert!(ids.contains(&"reroute-TRK-102".to_string()));
        assert!(ids.contains(&"escalate-ALT-1".to_string()));
    }

    #[tokio::test]
    async fn test_dismiss_applies_before_next_poll() {
        let (_, view) = view().await;
        view.dismiss_alert("ALT-2").await.unwrap();

        let alert = view.alerts().into_iter().find(|a| a.id == "ALT-2").unwrap();
        assert_eq!(alert.status, AlertStatus::Dismissed);

        view.refresh().await;
        let alert = view.alerts().into_iter().find(|a| a.id == "ALT-2").unwrap();
        assert_eq!(alert.status, AlertStatus::Dismissed);
    }

    #[tokio::test]
    async fn test_failed_dismiss_reverts_and_flags() {
        let (source, view) = view().await;
        source.set_available(false);

        assert!(view.dismiss_alert("ALT-1").await.is_err());
        let alert = view.alerts().into_iter().find(|a| a.id == "ALT-1").unwrap();
        assert_eq!(alert.status, AlertStatus::Open);
        assert_eq!(view.errors().len(), 1);
        assert_eq!(view.errors()[0].resource, "alerts");
    }

    #[tokio::test]
    async fn test_unknown_alert_is_not_found() {
        let (_, view) = view().await;
        assert!(matches!(
            view.dismiss_alert("ALT-99").await,
            Err(DashboardError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_approve_marks_action_completed() {
        let (source, view) = view().await;
        view.approve_action("refuel-TRK-104").await.unwrap();

        let action = view
            .actions()
            .into_iter()
            .find(|a| a.id == "refuel-TRK-104")
            .unwrap();
        assert_eq!(action.status, AiActionStatus::Completed);
        assert_eq!(source.approved_actions(), vec!["refuel-TRK-104".to_string()]);
    }

    #[tokio::test]
    async fn test_nearby_alerts_for_selected_store() {
        let (_, mut view) = view().await;
        assert!(view.nearby_alerts().is_empty());

        view.select_store("STR-2").unwrap();
        let ids: Vec<_> = view.nearby_alerts().into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["ALT-1".to_string(), "ALT-2".to_string()]);
        assert_eq!(view.viewport().center, view.stores()[1].position);
    }

    #[tokio::test]
    async fn test_stale_on_failure_keeps_collections() {
        let (source, view) = view().await;
        let before = view.trucks();

        source.set_available(false);
        let report = view.refresh().await;
        // Fixture sources supply no recommendations, so that fetch still succeeds
        assert_eq!(report.failed, 3);
        assert_eq!(view.trucks(), before);
        assert_eq!(view.errors().len(), 3);
    }
}
