//! Master/detail selection for the map view
//!
//! One detail panel is open at a time. [`Selection`] holds the selected entity, so two
//! panels can never be open together, and every transition is a single assignment.

use crate::error::{DashboardError, Result};
use pulseboard_core::config::MapConfig;
use pulseboard_core::types::{Alert, GeoPoint, Store, Truck};
use tracing::debug;

/// The entity shown in the detail panel
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Selection {
    /// No panel open
    #[default]
    None,
    /// Store detail panel
    Store(Store),
    /// Truck detail panel
    Truck(Truck),
    /// Alert detail panel
    Alert(Alert),
}

impl Selection {
    /// Selected store, if the store panel is open
    #[must_use]
    pub const fn store(&self) -> Option<&Store> {
        match self {
            Self::Store(store) => Some(store),
            _ => None,
        }
    }

    /// Selected truck, if the truck panel is open
    #[must_use]
    pub const fn truck(&self) -> Option<&Truck> {
        match self {
            Self::Truck(truck) => Some(truck),
            _ => None,
        }
    }

    /// Selected alert, if the alert panel is open
    #[must_use]
    pub const fn alert(&self) -> Option<&Alert> {
        match self {
            Self::Alert(alert) => Some(alert),
            _ => None,
        }
    }

    /// Whether no panel is open
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Position of the selected entity
    #[must_use]
    pub const fn position(&self) -> Option<GeoPoint> {
        match self {
            Self::None => None,
            Self::Store(store) => Some(store.position),
            Self::Truck(truck) => Some(truck.position),
            Self::Alert(alert) => Some(alert.position),
        }
    }

    /// Id of the selected entity
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Store(store) => Some(&store.id),
            Self::Truck(truck) => Some(&truck.id),
            Self::Alert(alert) => Some(&alert.id),
        }
    }
}

/// A map that can be recentered
pub trait MapViewport: Send + Sync {
    /// Move the map; fire-and-forget
    fn fly_to(&mut self, center: GeoPoint, zoom: u8);
}

/// In-memory viewport used when no map is attached
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    /// Current center
    pub center: GeoPoint,
    /// Current zoom
    pub zoom: u8,
}

impl ViewportState {
    /// Viewport at the configured default position
    #[must_use]
    pub const fn from_config(config: &MapConfig) -> Self {
        Self {
            center: config.default_center,
            zoom: config.default_zoom,
        }
    }
}

impl MapViewport for ViewportState {
    fn fly_to(&mut self, center: GeoPoint, zoom: u8) {
        self.center = center;
        self.zoom = zoom;
    }
}

/// Selection slot plus the viewport it drives
#[derive(Debug)]
pub struct SelectionCoordinator<V = ViewportState> {
    selection: Selection,
    viewport: V,
    focus_zoom: u8,
}

impl SelectionCoordinator<ViewportState> {
    /// Coordinator with an in-memory viewport at the configured default
    #[must_use]
    pub const fn new(config: &MapConfig) -> Self {
        Self::with_viewport(ViewportState::from_config(config), config.focus_zoom)
    }
}

impl<V: MapViewport> SelectionCoordinator<V> {
    /// Coordinator driving a caller-supplied viewport
    pub const fn with_viewport(viewport: V, focus_zoom: u8) -> Self {
        Self {
            selection: Selection::None,
            viewport,
            focus_zoom,
        }
    }

    /// Current selection
    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The driven viewport
    #[must_use]
    pub const fn viewport(&self) -> &V {
        &self.viewport
    }

    /// Open the store panel, closing any other
    pub fn select_store(&mut self, store: Store) {
        self.set(Selection::Store(store));
    }

    /// Open the truck panel, closing any other
    pub fn select_truck(&mut self, truck: Truck) {
        self.set(Selection::Truck(truck));
    }

    /// Open the alert panel, closing any other
    pub fn select_alert(&mut self, alert: Alert) {
        self.set(Selection::Alert(alert));
    }

    /// Select a store from a snapshot by id
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::NotFound`] if no store has that id; the current
    /// selection is left untouched.
    pub fn select_store_by_id(&mut self, stores: &[Store], id: &str) -> Result<()> {
        let store = find(stores, id, |s| &s.id, "store")?;
        self.select_store(store.clone());
        Ok(())
    }

    /// Select a truck from a snapshot by id
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::NotFound`] if no truck has that id.
    pub fn select_truck_by_id(&mut self, trucks: &[Truck], id: &str) -> Result<()> {
        let truck = find(trucks, id, |t| &t.id, "truck")?;
        self.select_truck(truck.clone());
        Ok(())
    }

    /// Select an alert from a snapshot by id
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::NotFound`] if no alert has that id.
    pub fn select_alert_by_id(&mut self, alerts: &[Alert], id: &str) -> Result<()> {
        let alert = find(alerts, id, |a| &a.id, "alert")?;
        self.select_alert(alert.clone());
        Ok(())
    }

    /// Close the open panel; the map stays where it is
    pub fn clear(&mut self) {
        self.selection = Selection::None;
    }

    fn set(&mut self, selection: Selection) {
        let center = selection.position();
        debug!(selected = ?selection.id(), "Selection changed");
        self.selection = selection;
        if let Some(center) = center {
            self.viewport.fly_to(center, self.focus_zoom);
        }
    }
}

fn find<'a, T>(
    items: &'a [T],
    id: &str,
    id_of: impl Fn(&T) -> &String,
    kind: &str,
) -> Result<&'a T> {
    items
        .iter()
        .find(|item| id_of(item) == id)
        .ok_or_else(|| DashboardError::not_found(format!("{kind} {id}")))
}
