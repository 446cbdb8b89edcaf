//! Utility functions shared by the dashboard views

use crate::types::GeoPoint;

/// Coordinate delta, in degrees, under which two positions count as "near".
///
/// This is a heuristic: it compares latitude and longitude deltas independently, so
/// the covered area is a box that shrinks in real distance away from the equator, and
/// entities sitting right at the boundary may flip between related and unrelated.
pub const PROXIMITY_THRESHOLD_DEGREES: f64 = 0.5;

/// Normalize a machine name: trimmed, lower-cased, spaces replaced by underscores
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Whether a machine name is already in normalized form
#[must_use]
pub fn is_normalized_name(name: &str) -> bool {
    !name.is_empty() && normalize_name(name) == name
}

/// Whether two points lie within `threshold` degrees on both axes (inclusive)
#[must_use]
pub fn is_nearby(a: GeoPoint, b: GeoPoint, threshold: f64) -> bool {
    (a.lat - b.lat).abs() <= threshold && (a.lon - b.lon).abs() <= threshold
}

/// Items whose position lies near `origin`
#[must_use]
pub fn nearby<'a, T, F>(origin: GeoPoint, items: &'a [T], position_of: F, threshold: f64) -> Vec<&'a T>
where
    F: Fn(&T) -> GeoPoint,
{
    items
        .iter()
        .filter(|item| is_nearby(origin, position_of(item), threshold))
        .collect()
}

/// Percentage of `part` in `total`, `default` when `total` is zero
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percentage(part: usize, total: usize, default: f64) -> f64 {
    if total == 0 {
        return default;
    }
    part as f64 / total as f64 * 100.0
}
