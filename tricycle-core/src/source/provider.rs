//! Collection-source trait and the query/payload types it exchanges.

use async_trait::async_trait;
use serde_json::Value;

use crate::{CollectionPoint, Position};

use super::error::FetchError;

/// Parameters of one ranking request.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingQuery {
    /// Device latitude in decimal degrees.
    pub latitude: f64,
    /// Device longitude in decimal degrees.
    pub longitude: f64,
    /// Optional date restriction, passed through verbatim.
    pub date: Option<String>,
}

impl RankingQuery {
    /// Query for the given coordinates with no date restriction.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            date: None,
        }
    }

    /// Query centred on `position`.
    #[must_use]
    pub const fn for_position(position: &Position) -> Self {
        Self::new(position.latitude, position.longitude)
    }

    /// Attach an optional date restriction.
    #[must_use]
    pub fn with_date(mut self, date: Option<String>) -> Self {
        self.date = date;
        self
    }
}

/// A successful ranking response.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchPayload {
    /// Collections in server proximity order.
    pub collections: Vec<CollectionPoint>,
    /// Server-computed statistics, passed through untouched.
    pub stats: Value,
    /// The position the server ranked against.
    pub user_position: Value,
    /// The complete decoded body.
    pub raw: Value,
}

impl FetchPayload {
    /// Payload carrying only `collections`; metadata fields are `null`.
    #[must_use]
    pub const fn from_collections(collections: Vec<CollectionPoint>) -> Self {
        Self {
            collections,
            stats: Value::Null,
            user_position: Value::Null,
            raw: Value::Null,
        }
    }
}

/// Fetch the server-ranked collection list for a position.
///
/// Implementations make a single attempt per call and must not retry. The
/// returned future only suspends its caller; other work keeps running.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use tricycle_core::{CollectionSource, FetchError, FetchPayload, RankingQuery};
///
/// struct EmptySource;
///
/// #[async_trait]
/// impl CollectionSource for EmptySource {
///     async fn fetch(&self, _query: &RankingQuery) -> Result<FetchPayload, FetchError> {
///         Ok(FetchPayload::from_collections(Vec::new()))
///     }
/// }
/// ```
#[async_trait]
pub trait CollectionSource: Send + Sync {
    /// Request collections ranked by distance from `query`'s coordinates.
    ///
    /// A transport-successful response reporting failure yields
    /// [`FetchError::Api`]; every other failure is a network-kind error.
    async fn fetch(&self, query: &RankingQuery) -> Result<FetchPayload, FetchError>;
}

#[async_trait]
impl<T> CollectionSource for std::sync::Arc<T>
where
    T: CollectionSource + ?Sized,
{
    async fn fetch(&self, query: &RankingQuery) -> Result<FetchPayload, FetchError> {
        (**self).fetch(query).await
    }
}
