//! HTTP-based collection source for the distance-ranking endpoint.
//!
//! [`HttpCollectionSource`] issues `GET <endpoint>?lat=..&lon=..[&date=..]`
//! and turns the JSON envelope into a [`tricycle_core::FetchPayload`] or a
//! [`tricycle_core::FetchError`].
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use tricycle_core::{CollectionSource, RankingQuery};
//! use tricycle_data::ranking::{HttpCollectionSource, HttpCollectionSourceConfig};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HttpCollectionSourceConfig::new("https://collect.example/api/collections/by-distance/")
//!     .with_timeout(Duration::from_secs(10));
//! let source = HttpCollectionSource::with_config(config)?;
//!
//! let payload = source.fetch(&RankingQuery::new(5.3453, -4.0244)).await?;
//! println!("{} collections", payload.collections.len());
//! # Ok(())
//! # }
//! ```

mod provider;
mod response;

#[doc(hidden)]
pub mod test_support;

pub use provider::{
    DEFAULT_ENDPOINT, DEFAULT_USER_AGENT, HttpCollectionSource, HttpCollectionSourceConfig,
    SourceBuildError,
};
