//! Keeps a distance-ranked collection list current as the device moves.
//!
//! A [`CollectionSorter`] owns a background task that tracks the device,
//! refetches the ranked list on every significant move and on a fixed
//! cadence, and reports filtered views to a [`SorterObserver`].
//!
//! # Example
//!
//! ```no_run
//! use tricycle_core::{FilterChange, Position};
//! use tricycle_tracker::{Callbacks, CollectionSorter, FixedLocationProvider, SorterConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SorterConfig::new("http://localhost:8000/api/collections/by-distance/")
//!     .with_observer(
//!         Callbacks::new()
//!             .with_update(|update| println!("{} collections", update.collections.len()))
//!             .with_error(|error| eprintln!("{}: {error}", error.kind())),
//!     );
//! let location = FixedLocationProvider::new(Position::new(5.3453, -4.0244));
//! let sorter = CollectionSorter::start(config, location)?;
//!
//! sorter.set_filter(FilterChange::HideCompleted(true));
//! sorter.shutdown().await;
//! # Ok(())
//! # }
//! ```

mod config;
mod event_loop;
mod observer;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tricycle_core::{CollectionPoint, CollectionSource, FilterChange, RouteStats, stats};
use tricycle_data::{HttpCollectionSource, SourceBuildError};

pub use config::{DEFAULT_REFRESH_INTERVAL, SorterConfig};
pub use observer::{Callbacks, CollectionUpdate, FetchMetadata, SorterObserver, UpdateOrigin};

use event_loop::{Command, EventLoop};

use crate::location::LocationProvider;

/// Handle to a running sorter.
///
/// Dropping the handle ends the background task once it next runs.
#[derive(Debug)]
pub struct CollectionSorter {
    commands: mpsc::UnboundedSender<Command>,
    snapshot: watch::Receiver<Arc<[CollectionPoint]>>,
    task: JoinHandle<()>,
}

impl CollectionSorter {
    /// Start a sorter fetching from `config.endpoint` over HTTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is invalid or the HTTP client fails
    /// to build.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn start<L>(config: SorterConfig, location: L) -> Result<Self, SourceBuildError>
    where
        L: LocationProvider + 'static,
    {
        let source = HttpCollectionSource::new(config.endpoint.clone())?;
        Ok(Self::start_with_source(config, source, location))
    }

    /// Start a sorter fetching from an arbitrary source.
    ///
    /// Tracking begins and the first fetch is attempted as soon as the
    /// background task runs; `config.endpoint` is ignored.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn start_with_source<S, L>(config: SorterConfig, source: S, location: L) -> Self
    where
        S: CollectionSource + 'static,
        L: LocationProvider + 'static,
    {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot) = watch::channel(Arc::from(Vec::new()));
        let event_loop = EventLoop::new(config, Arc::new(source), location, snapshot_tx);
        let task = tokio::spawn(event_loop.run(command_rx));
        Self {
            commands,
            snapshot,
            task,
        }
    }

    /// Change one filter and re-emit the filtered view without refetching.
    pub fn set_filter(&self, change: FilterChange) {
        self.send(Command::SetFilter(change));
    }

    /// Stop tracking and periodic refresh. Safe to call repeatedly.
    ///
    /// Fetches already in flight still complete and are applied.
    pub fn stop(&self) {
        self.send(Command::Stop);
    }

    /// Stop, then wait for the background task to finish.
    ///
    /// In-flight fetches that have not completed are discarded.
    pub async fn shutdown(self) {
        self.stop();
        let Self { commands, task, .. } = self;
        drop(commands);
        if let Err(err) = task.await {
            log::warn!("collection sorter task ended abnormally: {err}");
        }
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            log::debug!("collection sorter task has exited; command dropped");
        }
    }

    /// The last fetched sequence, unfiltered.
    #[must_use]
    pub fn collections(&self) -> Arc<[CollectionPoint]> {
        Arc::clone(&self.snapshot.borrow())
    }

    /// First collection of the last fetched sequence.
    #[must_use]
    pub fn nearest_collection(&self) -> Option<CollectionPoint> {
        stats::nearest(&self.collections()).cloned()
    }

    /// Last collection of the last fetched sequence.
    #[must_use]
    pub fn farthest_collection(&self) -> Option<CollectionPoint> {
        stats::farthest(&self.collections()).cloned()
    }

    /// Collections in `zone_name`, in server order.
    #[must_use]
    pub fn collections_by_zone(&self, zone_name: &str) -> Vec<CollectionPoint> {
        stats::by_zone(&self.collections(), zone_name)
    }

    /// Distance along the sequence, in kilometres.
    #[must_use]
    pub fn total_distance_km(&self) -> f64 {
        stats::total_distance_km(&self.collections())
    }

    /// Rough time needed to visit every collection.
    #[must_use]
    pub fn estimate_total_time(&self) -> Duration {
        stats::estimate_total_time(&self.collections())
    }

    /// Every derived statistic at once.
    #[must_use]
    pub fn route_stats(&self) -> RouteStats {
        RouteStats::compute(&self.collections())
    }
}
