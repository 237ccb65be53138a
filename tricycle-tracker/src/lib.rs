//! Position tracking and the collection sorter event loop.
//!
//! Responsibilities:
//! - Debounce device positions against a significant-change threshold.
//! - Refetch ranked collections on movement and on a refresh cadence.
//! - Keep filtered views current and report them to an observer.
//!
//! Boundaries:
//! - Geolocation is an injected [`location::LocationProvider`].
//! - The ranking endpoint is any [`tricycle_core::CollectionSource`].
//!
//! Invariants:
//! - All mutable sorter state is owned by a single Tokio task.

#![forbid(unsafe_code)]

pub mod location;
pub mod sorter;
mod tracker;

#[doc(hidden)]
pub mod test_support;

pub use location::{
    FixedLocationProvider, LocationProvider, LocationReading, LocationSink, LocationUnavailable,
    WatchId, WatchOptions,
};
pub use sorter::{
    Callbacks, CollectionSorter, CollectionUpdate, DEFAULT_REFRESH_INTERVAL, FetchMetadata,
    SorterConfig, SorterObserver, UpdateOrigin,
};
pub use tracker::{PositionTracker, SIGNIFICANT_CHANGE_KM, TrackerEvent};
