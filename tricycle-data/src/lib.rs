//! HTTP adapters for the tricycle engine.
//!
//! Responsibilities:
//! - Implement [`tricycle_core::CollectionSource`] against the ranking
//!   endpoint.
//! - Decode the endpoint's JSON envelope and classify its failures.
//!
//! Boundaries:
//! - Do not encode filtering or statistics rules (live in `tricycle-core`).
//! - Make exactly one request per fetch; retry policy belongs to callers.

#![forbid(unsafe_code)]

pub mod ranking;

pub use ranking::{
    DEFAULT_ENDPOINT, DEFAULT_USER_AGENT, HttpCollectionSource, HttpCollectionSourceConfig,
    SourceBuildError,
};
