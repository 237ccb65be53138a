//! Sorter configuration.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tricycle_core::{FilterConfig, Position};
use tricycle_data::DEFAULT_ENDPOINT;

use super::observer::{Callbacks, SorterObserver};
use crate::location::WatchOptions;

/// Default period between background refreshes.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Everything a [`super::CollectionSorter`] needs to run.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use tricycle_core::FilterConfig;
/// use tricycle_tracker::{Callbacks, SorterConfig};
///
/// let config = SorterConfig::new("https://collect.example/api/collections/by-distance/")
///     .with_refresh_interval(Duration::ZERO)
///     .with_filters(FilterConfig::new(Some(5.0), true))
///     .with_observer(Callbacks::new().with_update(|update| {
///         println!("{} visible", update.collections.len());
///     }));
/// assert!(config.refresh_interval.is_zero());
/// ```
#[derive(Clone)]
pub struct SorterConfig {
    /// Ranking endpoint URL.
    pub endpoint: String,
    /// Period between background refreshes; zero disables them.
    pub refresh_interval: Duration,
    /// Subscribe to continuous position updates.
    pub watch_position: bool,
    /// Options passed to the location provider.
    pub watch_options: WatchOptions,
    /// Filters in effect at start.
    pub filters: FilterConfig,
    /// Optional `date` query parameter.
    pub date: Option<String>,
    /// Baseline position used before the first accepted fix.
    pub initial_position: Option<Position>,
    /// Receiver of updates, errors and position changes.
    pub observer: Arc<dyn SorterObserver>,
}

impl Default for SorterConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            watch_position: true,
            watch_options: WatchOptions::default(),
            filters: FilterConfig::default(),
            date: None,
            initial_position: None,
            observer: Arc::new(Callbacks::default()),
        }
    }
}

impl SorterConfig {
    /// Configuration for `endpoint` with every other setting at its default.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Set the refresh period.
    #[must_use]
    pub const fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Enable or disable continuous position tracking.
    #[must_use]
    pub const fn with_watch_position(mut self, watch: bool) -> Self {
        self.watch_position = watch;
        self
    }

    /// Set the provider subscription options.
    #[must_use]
    pub const fn with_watch_options(mut self, options: WatchOptions) -> Self {
        self.watch_options = options;
        self
    }

    /// Set the initial filters.
    #[must_use]
    pub const fn with_filters(mut self, filters: FilterConfig) -> Self {
        self.filters = filters;
        self
    }

    /// Set or clear the `date` query parameter.
    #[must_use]
    pub fn with_date(mut self, date: Option<String>) -> Self {
        self.date = date;
        self
    }

    /// Seed the position used for fetching until the device reports one.
    #[must_use]
    pub const fn with_initial_position(mut self, position: Position) -> Self {
        self.initial_position = Some(position);
        self
    }

    /// Set the observer.
    #[must_use]
    pub fn with_observer(mut self, observer: impl SorterObserver + 'static) -> Self {
        self.observer = Arc::new(observer);
        self
    }
}

impl fmt::Debug for SorterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SorterConfig")
            .field("endpoint", &self.endpoint)
            .field("refresh_interval", &self.refresh_interval)
            .field("watch_position", &self.watch_position)
            .field("watch_options", &self.watch_options)
            .field("filters", &self.filters)
            .field("date", &self.date)
            .field("initial_position", &self.initial_position)
            .field("observer", &"<observer>")
            .finish()
    }
}
