use thiserror::Error;

use crate::ErrorKind;

/// Message used when the server reports failure without explaining why.
pub(crate) const DEFAULT_API_MESSAGE: &str = "failed to load collections";

/// Errors from [`crate::source::CollectionSource::fetch`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The endpoint answered with `success: false`.
    #[error("{message}")]
    Api {
        /// Server-supplied message, or a generic one when absent.
        message: String,
    },
    /// The server returned an error status with an unreadable body.
    #[error("request to {url} failed with status {status}: {message}")]
    Http {
        /// Fully qualified request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Short description of the status.
        message: String,
    },
    /// The request did not complete within the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Fully qualified request URL.
        url: String,
        /// Timeout that elapsed.
        timeout_secs: u64,
    },
    /// The endpoint could not be reached.
    #[error("network error contacting {url}: {message}")]
    Network {
        /// Fully qualified request URL.
        url: String,
        /// Transport error description.
        message: String,
    },
    /// The body was not a valid ranking response.
    #[error("failed to parse ranking response: {message}")]
    Parse {
        /// Decoder error description.
        message: String,
    },
}

impl FetchError {
    /// Logical failure with the server's message, falling back to a generic
    /// one when the server did not send any.
    #[must_use]
    pub fn api(message: Option<String>) -> Self {
        Self::Api {
            message: message
                .filter(|text| !text.is_empty())
                .unwrap_or_else(|| DEFAULT_API_MESSAGE.to_owned()),
        }
    }

    /// Whether this is an `api` or a `network` failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Api { .. } => ErrorKind::Api,
            Self::Http { .. } | Self::Timeout { .. } | Self::Network { .. } | Self::Parse { .. } => {
                ErrorKind::Network
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("no data".to_owned()), "no data")]
    #[case(Some(String::new()), DEFAULT_API_MESSAGE)]
    #[case(None, DEFAULT_API_MESSAGE)]
    fn api_errors_fall_back_to_generic_message(
        #[case] message: Option<String>,
        #[case] expected: &str,
    ) {
        let error = FetchError::api(message);
        assert_eq!(error.to_string(), expected);
        assert_eq!(error.kind(), ErrorKind::Api);
    }

    #[rstest]
    fn parse_errors_are_network_kind() {
        let error = FetchError::Parse {
            message: "expected value at line 1 column 1".to_owned(),
        };
        assert_eq!(error.kind(), ErrorKind::Network);
    }
}
