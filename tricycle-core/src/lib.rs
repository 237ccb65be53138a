//! Core domain types and pure logic for the Tricycle engine.
//!
//! This crate holds everything that does not need a runtime: great-circle
//! distance maths, the device [`Position`], the server-ranked
//! [`CollectionPoint`] sequence, the [`filter`] and [`stats`] engines, and the
//! [`CollectionSource`] contract implemented by fetch adapters.
//!
//! Coordinates handed to `geo` use WGS84 with `x = longitude` and
//! `y = latitude`.

#![forbid(unsafe_code)]

pub mod collection;
pub mod distance;
pub mod error;
pub mod filter;
pub mod position;
pub mod source;
pub mod stats;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use collection::{Address, CollectionPoint, CollectionStatus};
pub use distance::{EARTH_RADIUS_KM, distance_km, haversine_km, to_radians};
pub use error::{ErrorKind, SorterError};
pub use filter::{FilterChange, FilterConfig};
pub use position::{LocationErrorCode, Position};
pub use source::{CollectionSource, FetchError, FetchPayload, RankingQuery};
pub use stats::RouteStats;
