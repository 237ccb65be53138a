//! Derived statistics over a ranked collection sequence.
//!
//! Every function here is total: empty input produces `None` or zero, never a
//! panic. The sequence is assumed to be sorted by proximity already, so
//! "nearest" and "farthest" are positional.
//!
//! Time estimates are deliberately crude: each stop costs a fixed handling
//! time and each leg costs thirty minutes per kilometre of the *next* stop's
//! server-reported distance from the device, not the leg's own length.

use std::time::Duration;

use crate::{CollectionPoint, distance::haversine_km};

/// Fixed handling time spent at each stop.
pub const STOP_HANDLING_TIME: Duration = Duration::from_secs(5 * 60);

/// Travel time charged per kilometre in [`estimate_total_time`].
pub const TRAVEL_SECS_PER_KM: f64 = 30.0 * 60.0;

/// First element of the sequence.
#[must_use]
pub fn nearest(collections: &[CollectionPoint]) -> Option<&CollectionPoint> {
    collections.first()
}

/// Last element of the sequence.
#[must_use]
pub fn farthest(collections: &[CollectionPoint]) -> Option<&CollectionPoint> {
    collections.last()
}

/// Collections in `zone_name`, preserving order.
#[must_use]
pub fn by_zone(collections: &[CollectionPoint], zone_name: &str) -> Vec<CollectionPoint> {
    collections
        .iter()
        .filter(|collection| collection.in_zone(zone_name))
        .cloned()
        .collect()
}

/// Sum of haversine distances between consecutive addresses, in kilometres.
///
/// Walks the sequence in order, so the result depends on ordering. Returns
/// `0.0` for fewer than two collections.
#[must_use]
pub fn total_distance_km(collections: &[CollectionPoint]) -> f64 {
    collections
        .windows(2)
        .map(|pair| match pair {
            [previous, current] => haversine_km(previous.address.point(), current.address.point()),
            _ => 0.0,
        })
        .sum()
}

/// Rough time needed to visit every collection in order.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use tricycle_core::stats::estimate_total_time;
///
/// assert_eq!(estimate_total_time(&[]), Duration::ZERO);
/// ```
#[must_use]
pub fn estimate_total_time(collections: &[CollectionPoint]) -> Duration {
    let stops = u32::try_from(collections.len()).unwrap_or(u32::MAX);
    let handling = STOP_HANDLING_TIME.saturating_mul(stops);
    collections
        .windows(2)
        .filter_map(|pair| match pair {
            [_, next] => Some(travel_leg(next)),
            _ => None,
        })
        .fold(handling, Duration::saturating_add)
}

fn travel_leg(next: &CollectionPoint) -> Duration {
    let secs = next.distance_km * TRAVEL_SECS_PER_KM;
    Duration::try_from_secs_f64(secs).unwrap_or_else(|_| {
        log::warn!(
            "collection {} has unusable distance {} km; travel leg counted as zero",
            next.id,
            next.distance_km
        );
        Duration::ZERO
    })
}

/// All derived statistics for one sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteStats {
    /// First collection in proximity order.
    pub nearest: Option<CollectionPoint>,
    /// Last collection in proximity order.
    pub farthest: Option<CollectionPoint>,
    /// Number of collections.
    pub count: usize,
    /// Cumulative distance between consecutive stops.
    pub total_distance_km: f64,
    /// Estimated time to visit every stop.
    pub estimated_time: Duration,
}

impl RouteStats {
    /// Compute every statistic over `collections`.
    #[must_use]
    pub fn compute(collections: &[CollectionPoint]) -> Self {
        Self {
            nearest: nearest(collections).cloned(),
            farthest: farthest(collections).cloned(),
            count: collections.len(),
            total_distance_km: total_distance_km(collections),
            estimated_time: estimate_total_time(collections),
        }
    }
}
