//! Optimistic local changes layered over polled snapshots
//!
//! A change recorded here is re-applied to every fresh snapshot until a poll that was
//! issued after the backend confirmed the change succeeds. From then on the snapshot
//! itself reflects the change and the entry is dropped. Unconfirmed entries are never
//! dropped by a poll, so an alert dismissed locally cannot flick back to open while its
//! request is still in flight.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::fmt;
use tracing::debug;

/// One locally applied change
#[derive(Debug, Clone, PartialEq)]
pub struct LocalChange<P> {
    /// What to apply to the entity
    pub patch: P,
    /// When the change was applied, or confirmed if it has been
    pub applied_at: DateTime<Utc>,
    /// Whether the backend acknowledged the change
    pub confirmed: bool,
}

/// Local changes keyed by entity id
pub struct OptimisticOverlay<P> {
    entries: DashMap<String, LocalChange<P>>,
}

impl<P> fmt::Debug for OptimisticOverlay<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptimisticOverlay")
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl<P> Default for OptimisticOverlay<P> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<P: Clone> OptimisticOverlay<P> {
    /// Empty overlay
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a change now; returns its timestamp
    pub fn record(&self, id: impl Into<String>, patch: P) -> DateTime<Utc> {
        let applied_at = Utc::now();
        self.record_at(id, patch, applied_at);
        applied_at
    }

    /// Record a change with an explicit timestamp
    pub fn record_at(&self, id: impl Into<String>, patch: P, applied_at: DateTime<Utc>) {
        self.entries.insert(
            id.into(),
            LocalChange {
                patch,
                applied_at,
                confirmed: false,
            },
        );
    }

    /// Mark a change as acknowledged by the backend, stamping it now
    pub fn confirm(&self, id: &str) -> bool {
        self.confirm_at(id, Utc::now())
    }

    /// Mark a change as acknowledged with an explicit timestamp
    pub fn confirm_at(&self, id: &str, confirmed_at: DateTime<Utc>) -> bool {
        self.entries.get_mut(id).is_some_and(|mut entry| {
            entry.confirmed = true;
            entry.applied_at = confirmed_at;
            true
        })
    }

    /// Drop a change whose backend call failed
    pub fn revert(&self, id: &str) -> Option<P> {
        self.entries.remove(id).map(|(_, change)| change.patch)
    }

    /// Drop confirmed changes that a poll issued at `issued_at` has already seen
    ///
    /// Returns the number of entries dropped.
    pub fn reconcile(&self, issued_at: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, change| !(change.confirmed && change.applied_at < issued_at));
        let dropped = before.saturating_sub(self.entries.len());
        if dropped > 0 {
            debug!(dropped, "Optimistic changes superseded by poll");
        }
        dropped
    }

    /// Apply surviving changes to a fresh snapshot
    pub fn apply<T>(&self, items: &mut [T], id_of: impl Fn(&T) -> &str, patch_fn: impl Fn(&mut T, &P)) {
        if self.entries.is_empty() {
            return;
        }
        for item in items.iter_mut() {
            let patch = self.entries.get(id_of(item)).map(|e| e.patch.clone());
            if let Some(patch) = patch {
                patch_fn(item, &patch);
            }
        }
    }

    /// Pending change for an entity
    #[must_use]
    pub fn get(&self, id: &str) -> Option<LocalChange<P>> {
        self.entries.get(id).map(|e| e.value().clone())
    }

    /// Number of live changes
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no changes are live
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
