//! Observer surface of the sorter.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tricycle_core::{CollectionPoint, FilterConfig, Position, SorterError};

/// Server metadata accompanying a fetched sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchMetadata {
    /// Server-computed statistics.
    pub stats: Value,
    /// Position the server ranked against.
    pub user_position: Value,
    /// Complete decoded response body.
    pub raw: Value,
}

/// What produced an update.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOrigin {
    /// A fetch completed successfully.
    Fetch(FetchMetadata),
    /// A filter changed; no network request was made.
    Filter,
}

/// Snapshot delivered through [`SorterObserver::on_update`].
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionUpdate {
    /// `all_collections` after filtering, in server order.
    pub collections: Vec<CollectionPoint>,
    /// The full last-fetched sequence.
    pub all_collections: Arc<[CollectionPoint]>,
    /// Filters that produced `collections`.
    pub filters: FilterConfig,
    /// Cause of this update.
    pub origin: UpdateOrigin,
}

impl CollectionUpdate {
    /// Whether this update follows a fetch.
    #[must_use]
    pub const fn is_fetch(&self) -> bool {
        matches!(self.origin, UpdateOrigin::Fetch(_))
    }

    /// Fetch metadata, absent for filter updates.
    #[must_use]
    pub const fn metadata(&self) -> Option<&FetchMetadata> {
        match &self.origin {
            UpdateOrigin::Fetch(metadata) => Some(metadata),
            UpdateOrigin::Filter => None,
        }
    }
}

/// Receives sorter notifications on the sorter's task.
///
/// Every method defaults to doing nothing. Implementations should return
/// quickly; the sorter handles nothing else while a callback runs.
pub trait SorterObserver: Send + Sync {
    /// The filtered view changed.
    fn on_update(&self, _update: &CollectionUpdate) {}

    /// A fetch or geolocation error occurred. None are fatal.
    fn on_error(&self, _error: &SorterError) {}

    /// The device moved past the significance threshold.
    fn on_position_change(&self, _position: &Position) {}
}

type Handler<T> = Box<dyn Fn(&T) + Send + Sync>;

/// Observer assembled from optional closures.
#[derive(Default)]
pub struct Callbacks {
    update: Option<Handler<CollectionUpdate>>,
    error: Option<Handler<SorterError>>,
    position_change: Option<Handler<Position>>,
}

impl Callbacks {
    /// Observer with no handlers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle updates.
    #[must_use]
    pub fn with_update(mut self, handler: impl Fn(&CollectionUpdate) + Send + Sync + 'static) -> Self {
        self.update = Some(Box::new(handler));
        self
    }

    /// Handle errors.
    #[must_use]
    pub fn with_error(mut self, handler: impl Fn(&SorterError) + Send + Sync + 'static) -> Self {
        self.error = Some(Box::new(handler));
        self
    }

    /// Handle position changes.
    #[must_use]
    pub fn with_position_change(
        mut self,
        handler: impl Fn(&Position) + Send + Sync + 'static,
    ) -> Self {
        self.position_change = Some(Box::new(handler));
        self
    }
}

impl SorterObserver for Callbacks {
    fn on_update(&self, update: &CollectionUpdate) {
        if let Some(handler) = &self.update {
            handler(update);
        }
    }

    fn on_error(&self, error: &SorterError) {
        if let Some(handler) = &self.error {
            handler(error);
        }
    }

    fn on_position_change(&self, position: &Position) {
        if let Some(handler) = &self.position_change {
            handler(position);
        }
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_update", &self.update.is_some())
            .field("on_error", &self.error.is_some())
            .field("on_position_change", &self.position_change.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[rstest]
    fn callbacks_dispatch_to_registered_handlers() {
        let errors = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&errors);
        let callbacks = Callbacks::new().with_error(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let observer: &dyn SorterObserver = &callbacks;
        observer.on_error(&SorterError::Api {
            message: "no data".to_owned(),
        });
        observer.on_position_change(&Position::new(0.0, 0.0));

        assert_eq!(errors.load(Ordering::SeqCst), 1);
        assert_eq!(
            format!("{callbacks:?}"),
            "Callbacks { on_update: false, on_error: true, on_position_change: false }"
        );
    }

    #[rstest]
    fn filter_updates_carry_no_metadata() {
        let update = CollectionUpdate {
            collections: Vec::new(),
            all_collections: Arc::from(Vec::new()),
            filters: FilterConfig::default(),
            origin: UpdateOrigin::Filter,
        };
        assert!(!update.is_fetch());
        assert!(update.metadata().is_none());
    }
}
