//! User-configurable filters over a ranked collection sequence.
//!
//! Filtering is a pure, order-preserving projection of the last fetched
//! sequence. The source slice is never modified.

use serde::{Deserialize, Serialize};

use crate::CollectionPoint;

/// Active filter settings.
///
/// # Examples
/// ```
/// use tricycle_core::{FilterChange, FilterConfig};
///
/// let mut config = FilterConfig::default();
/// config.apply_change(FilterChange::MaxDistance(Some(5.0)));
/// assert_eq!(config.max_distance, Some(5.0));
/// assert!(!config.hide_completed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Keep only collections at most this many kilometres away.
    ///
    /// A limit of zero, a negative limit or `NaN` leaves distance unfiltered.
    pub max_distance: Option<f64>,
    /// Drop collections whose status is `completed`.
    pub hide_completed: bool,
}

/// A single filter mutation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value", rename_all = "snake_case")]
pub enum FilterChange {
    /// Set or clear the distance ceiling in kilometres.
    MaxDistance(Option<f64>),
    /// Toggle hiding of completed collections.
    HideCompleted(bool),
}

impl FilterConfig {
    /// Construct a configuration from explicit values.
    #[must_use]
    pub const fn new(max_distance: Option<f64>, hide_completed: bool) -> Self {
        Self {
            max_distance,
            hide_completed,
        }
    }

    /// Apply one mutation to this configuration.
    pub const fn apply_change(&mut self, change: FilterChange) {
        match change {
            FilterChange::MaxDistance(limit) => self.max_distance = limit,
            FilterChange::HideCompleted(hide) => self.hide_completed = hide,
        }
    }

    /// The distance ceiling actually in force.
    #[must_use]
    pub fn active_max_distance(&self) -> Option<f64> {
        self.max_distance.filter(|limit| *limit > 0.0)
    }

    /// Whether `collection` passes every active filter.
    #[must_use]
    pub fn admits(&self, collection: &CollectionPoint) -> bool {
        let within_range = self
            .active_max_distance()
            .is_none_or(|limit| collection.distance_km <= limit);
        let visible = !(self.hide_completed && collection.is_completed());
        within_range && visible
    }
}

/// Filter `collections` by `config`, preserving order.
///
/// Empty input yields empty output. Applying the same configuration to the
/// result again returns it unchanged.
#[must_use]
pub fn apply(collections: &[CollectionPoint], config: &FilterConfig) -> Vec<CollectionPoint> {
    collections
        .iter()
        .filter(|collection| config.admits(collection))
        .cloned()
        .collect()
}
