//! Fetch ranked collection points for a device position.
//!
//! The [`CollectionSource`] trait abstracts the remote ranking endpoint.
//! Callers supply a [`RankingQuery`] and receive the server's proximity-sorted
//! sequence together with its metadata as a [`FetchPayload`].
//!
//! A source makes exactly one attempt per call. Retrying is the caller's
//! business.

mod error;
mod provider;

pub use error::FetchError;
pub use provider::{CollectionSource, FetchPayload, RankingQuery};
