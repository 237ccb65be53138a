//! `CollectionSource` backed by the distance-ranking HTTP endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tricycle_core::{CollectionSource, FetchError, FetchPayload, RankingQuery};
use url::Url;

use super::response::{RankingResponse, ResponseStatus};

/// Error type for [`HttpCollectionSource`] construction failures.
#[derive(Debug, Error)]
pub enum SourceBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// The configured endpoint is not an absolute URL.
    #[error("invalid ranking endpoint: {0}")]
    Endpoint(#[source] url::ParseError),
}

/// Default user agent for ranking requests.
pub const DEFAULT_USER_AGENT: &str = "tricycle-ranking/0.1";

/// Endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/api/collections/by-distance/";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const REQUESTED_WITH: &str = "X-Requested-With";
const XML_HTTP_REQUEST: &str = "XMLHttpRequest";

/// Configuration for [`HttpCollectionSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpCollectionSourceConfig {
    /// Absolute URL of the ranking endpoint, without query parameters.
    pub endpoint: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for HttpCollectionSourceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpCollectionSourceConfig {
    /// Create a new configuration for the given endpoint.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Ranking endpoint client.
///
/// Each call to [`CollectionSource::fetch`] makes exactly one request. The
/// client is cheap to share: wrap it in an `Arc` to hand it to several
/// owners.
#[derive(Debug, Clone)]
pub struct HttpCollectionSource {
    client: Client,
    endpoint: Url,
    config: HttpCollectionSourceConfig,
}

impl HttpCollectionSource {
    /// Create a new source with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint does not parse or the HTTP client
    /// fails to build.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, SourceBuildError> {
        Self::with_config(HttpCollectionSourceConfig::new(endpoint))
    }

    /// Create a new source with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint does not parse or the HTTP client
    /// fails to build.
    pub fn with_config(config: HttpCollectionSourceConfig) -> Result<Self, SourceBuildError> {
        let endpoint = Url::parse(&config.endpoint).map_err(SourceBuildError::Endpoint)?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(SourceBuildError::HttpClient)?;
        Ok(Self {
            client,
            endpoint,
            config,
        })
    }

    /// The configuration this source was built with.
    #[must_use]
    pub const fn config(&self) -> &HttpCollectionSourceConfig {
        &self.config
    }

    /// Build the request URL for `query`.
    ///
    /// Parameters are appended to any query string already present on the
    /// endpoint: `lat`, `lon`, then `date` when set.
    fn build_url(&self, query: &RankingQuery) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("lat", &query.latitude.to_string());
            pairs.append_pair("lon", &query.longitude.to_string());
            if let Some(date) = &query.date {
                pairs.append_pair("date", date);
            }
        }
        url
    }

    /// Convert a reqwest error to a `FetchError`.
    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> FetchError {
        if error.is_timeout() {
            return FetchError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return FetchError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        FetchError::Network {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

/// Classify a response body.
///
/// Any JSON body is interpreted through its `success` flag, whatever the
/// status code. Bodies that are not JSON are an HTTP failure on error
/// statuses and a parse failure otherwise.
fn decode_body(url: &str, status: StatusCode, body: &[u8]) -> Result<FetchPayload, FetchError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(raw) => convert_body(raw),
        Err(err) if status.is_success() => Err(FetchError::Parse {
            message: err.to_string(),
        }),
        Err(_) => Err(FetchError::Http {
            url: url.to_owned(),
            status: status.as_u16(),
            message: status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_owned(),
        }),
    }
}

/// Convert a decoded envelope into a payload or a logical failure.
fn convert_body(raw: Value) -> Result<FetchPayload, FetchError> {
    if !raw.is_object() {
        return Err(FetchError::Parse {
            message: "response body is not a JSON object".to_owned(),
        });
    }
    let status = ResponseStatus::deserialize(&raw).map_err(parse_error)?;
    if !status.is_ok() {
        return Err(FetchError::api(status.error));
    }

    let body = RankingResponse::deserialize(&raw).map_err(parse_error)?;
    Ok(FetchPayload {
        collections: body.collections,
        stats: body.stats,
        user_position: body.user_position,
        raw,
    })
}

fn parse_error(err: serde_json::Error) -> FetchError {
    FetchError::Parse {
        message: err.to_string(),
    }
}

#[async_trait]
impl CollectionSource for HttpCollectionSource {
    async fn fetch(&self, query: &RankingQuery) -> Result<FetchPayload, FetchError> {
        let url = self.build_url(query);
        log::debug!("requesting ranked collections from {url}");

        let response = self
            .client
            .get(url.clone())
            .header(REQUESTED_WITH, XML_HTTP_REQUEST)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url.as_str()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url.as_str()))?;

        decode_body(url.as_str(), status, &body)
    }
}
