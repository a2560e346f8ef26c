// RunShape - core/sequence.rs
//
// Deterministic ordering of extracted entries.

use crate::core::model::Distance;
use std::cmp::Ordering;

/// Order two optional distances: numbers ascending, `None` after every
/// number, two `None`s equal.
pub fn compare_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable-sort entries ascending by distance, unknown distances last.
/// Entries with equal distance keep their extraction order.
pub fn sequence<E: Distance>(entries: &mut [E]) {
    entries.sort_by(|a, b| compare_distance(a.distance_mi(), b.distance_mi()));
}
