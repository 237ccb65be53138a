//! Test utilities for collection sources.
//!
//! This module provides [`StubCollectionSource`], a deterministic test double
//! for [`CollectionSource`] that replays scripted outcomes without making
//! HTTP requests and records every query it receives.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tricycle_core::{CollectionPoint, CollectionSource, FetchError, FetchPayload, RankingQuery};

/// One scripted fetch outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct StubResponse {
    outcome: Result<FetchPayload, FetchError>,
    delay: Duration,
}

impl StubResponse {
    /// Succeed with `collections` and null metadata.
    #[must_use]
    pub const fn collections(collections: Vec<CollectionPoint>) -> Self {
        Self::payload(FetchPayload::from_collections(collections))
    }

    /// Succeed with a complete payload.
    #[must_use]
    pub const fn payload(payload: FetchPayload) -> Self {
        Self {
            outcome: Ok(payload),
            delay: Duration::ZERO,
        }
    }

    /// Fail with `error`.
    #[must_use]
    pub const fn error(error: FetchError) -> Self {
        Self {
            outcome: Err(error),
            delay: Duration::ZERO,
        }
    }

    /// Resolve only after `delay` has elapsed on the Tokio clock.
    #[must_use]
    pub const fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Stub `CollectionSource` for testing.
///
/// Scripted responses are consumed in call order; once the script runs out,
/// every further call returns the fallback response.
///
/// # Example
///
/// ```
/// use tricycle_core::{CollectionSource, FetchError, RankingQuery};
/// use tricycle_data::ranking::test_support::{StubCollectionSource, StubResponse};
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build()?.block_on(async {
/// let source = StubCollectionSource::scripted([
///     StubResponse::error(FetchError::api(Some("no data".to_owned()))),
/// ]);
///
/// let first = source.fetch(&RankingQuery::new(5.3, -4.0)).await;
/// let second = source.fetch(&RankingQuery::new(5.3, -4.0)).await;
///
/// assert!(first.is_err());
/// assert!(second.is_ok_and(|payload| payload.collections.is_empty()));
/// assert_eq!(source.call_count(), 2);
/// # });
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct StubCollectionSource {
    script: Mutex<VecDeque<StubResponse>>,
    fallback: StubResponse,
    queries: Mutex<Vec<RankingQuery>>,
}

impl StubCollectionSource {
    /// Create a source that always returns `collections`.
    #[must_use]
    pub fn with_collections(collections: Vec<CollectionPoint>) -> Self {
        Self::with_fallback(StubResponse::collections(collections))
    }

    /// Create a source that always fails with `error`.
    #[must_use]
    pub fn with_error(error: FetchError) -> Self {
        Self::with_fallback(StubResponse::error(error))
    }

    /// Create a source replaying `responses`, then returning empty payloads.
    #[must_use]
    pub fn scripted(responses: impl IntoIterator<Item = StubResponse>) -> Self {
        Self {
            script: Mutex::new(responses.into_iter().collect()),
            ..Self::with_fallback(StubResponse::collections(Vec::new()))
        }
    }

    fn with_fallback(fallback: StubResponse) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Every query received so far, in call order.
    #[must_use]
    pub fn queries(&self) -> Vec<RankingQuery> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of fetches made so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn next_response(&self, query: &RankingQuery) -> StubResponse {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query.clone());
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[async_trait]
impl CollectionSource for StubCollectionSource {
    async fn fetch(&self, query: &RankingQuery) -> Result<FetchPayload, FetchError> {
        let response = self.next_response(query);
        if !response.delay.is_zero() {
            tokio::time::sleep(response.delay).await;
        }
        response.outcome
    }
}
