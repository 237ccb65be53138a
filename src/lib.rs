//! Facade crate for the Tricycle collection engine.
//!
//! This crate re-exports the core domain types and exposes the HTTP ranking
//! source and the position-tracking sorter behind feature flags.

#![forbid(unsafe_code)]

pub use tricycle_core::{
    Address, CollectionPoint, CollectionSource, CollectionStatus, ErrorKind, FetchError,
    FetchPayload, FilterChange, FilterConfig, LocationErrorCode, Position, RankingQuery,
    RouteStats, SorterError, distance, filter, stats,
};

#[cfg(feature = "http")]
pub use tricycle_data::{
    DEFAULT_ENDPOINT, HttpCollectionSource, HttpCollectionSourceConfig, SourceBuildError,
};

#[cfg(feature = "tracker")]
pub use tricycle_tracker::{
    Callbacks, CollectionSorter, CollectionUpdate, FetchMetadata, FixedLocationProvider,
    LocationProvider, LocationReading, LocationSink, LocationUnavailable, SorterConfig,
    SorterObserver, UpdateOrigin, WatchId, WatchOptions,
};
