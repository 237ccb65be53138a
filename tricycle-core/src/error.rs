//! Errors reported to sorter observers.
//!
//! None of these are fatal: the sorter keeps running and retries on the next
//! position change or refresh tick.

use std::fmt;

use thiserror::Error;

use crate::{FetchError, LocationErrorCode};

/// Broad category of a reported error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The location capability is missing or reported a failure.
    Geolocation,
    /// The ranking endpoint answered but reported a logical failure.
    Api,
    /// The request failed in transport or the response was unreadable.
    Network,
}

impl ErrorKind {
    /// Stable lowercase name, e.g. `"geolocation"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Geolocation => "geolocation",
            Self::Api => "api",
            Self::Network => "network",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error delivered through `on_error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SorterError {
    /// Location capability unavailable or a subscription failure.
    #[error("{message}")]
    Geolocation {
        /// Provider code, absent when the capability itself is missing.
        code: Option<LocationErrorCode>,
        /// Human-readable reason.
        message: String,
    },
    /// The server reported a logical failure.
    #[error("{message}")]
    Api {
        /// Message supplied by the server.
        message: String,
    },
    /// Transport failure or malformed response.
    #[error("{message}")]
    Network {
        /// Description of the failure.
        message: String,
    },
}

impl SorterError {
    /// Error for a provider-reported subscription failure.
    #[must_use]
    pub fn location_failure(code: LocationErrorCode) -> Self {
        Self::Geolocation {
            code: Some(code),
            message: code.message().to_owned(),
        }
    }

    /// Error for a missing location capability.
    pub fn location_unavailable(reason: impl Into<String>) -> Self {
        Self::Geolocation {
            code: None,
            message: reason.into(),
        }
    }

    /// Category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Geolocation { .. } => ErrorKind::Geolocation,
            Self::Api { .. } => ErrorKind::Api,
            Self::Network { .. } => ErrorKind::Network,
        }
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Geolocation { message, .. }
            | Self::Api { message }
            | Self::Network { message } => message,
        }
    }

    /// Provider code for geolocation failures.
    #[must_use]
    pub const fn code(&self) -> Option<LocationErrorCode> {
        match self {
            Self::Geolocation { code, .. } => *code,
            Self::Api { .. } | Self::Network { .. } => None,
        }
    }
}

impl From<FetchError> for SorterError {
    fn from(error: FetchError) -> Self {
        match error {
            FetchError::Api { message } => Self::Api { message },
            other => Self::Network {
                message: other.to_string(),
            },
        }
    }
}
