//! Device positions reported by a location provider.

use geo::Point;
use serde::{Deserialize, Serialize};

use crate::distance::distance_km;

/// A single device fix.
///
/// Positions are immutable once captured; a newer fix replaces an older one
/// wholesale.
///
/// # Examples
/// ```
/// use tricycle_core::Position;
///
/// let here = Position::new(5.3453, -4.0244).with_accuracy(12.0);
/// assert_eq!(here.point().x(), -4.0244);
/// assert_eq!(here.accuracy, 12.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Horizontal accuracy radius in metres.
    pub accuracy: f64,
    /// Capture time in milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl Position {
    /// Construct a position with zero accuracy and timestamp.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy: 0.0,
            timestamp: 0,
        }
    }

    /// Set the accuracy radius in metres.
    #[must_use]
    pub const fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = accuracy;
        self
    }

    /// Set the capture time in milliseconds since the Unix epoch.
    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// The position as a `geo` point (`x = longitude`, `y = latitude`).
    #[must_use]
    pub fn point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }

    /// Great-circle distance to `other` in kilometres.
    #[must_use]
    pub fn distance_km_to(&self, other: &Self) -> f64 {
        distance_km(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

/// Failure codes reported by a location provider.
///
/// The first three mirror the codes every provider must be able to report;
/// anything else is carried through as [`LocationErrorCode::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocationErrorCode {
    /// The user or platform refused access to the device location.
    PermissionDenied,
    /// No fix could be obtained.
    PositionUnavailable,
    /// A fix was not obtained within the requested timeout.
    Timeout,
    /// A provider-specific code outside the standard set.
    Other(u16),
}

impl LocationErrorCode {
    /// Map a numeric provider code onto the standard set.
    ///
    /// # Examples
    /// ```
    /// use tricycle_core::LocationErrorCode;
    ///
    /// assert_eq!(LocationErrorCode::from_code(1), LocationErrorCode::PermissionDenied);
    /// assert_eq!(LocationErrorCode::from_code(9), LocationErrorCode::Other(9));
    /// ```
    #[must_use]
    pub const fn from_code(code: u16) -> Self {
        match code {
            1 => Self::PermissionDenied,
            2 => Self::PositionUnavailable,
            3 => Self::Timeout,
            other => Self::Other(other),
        }
    }

    /// Numeric form of the code.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::PermissionDenied => 1,
            Self::PositionUnavailable => 2,
            Self::Timeout => 3,
            Self::Other(code) => code,
        }
    }

    /// Human-readable description of the failure.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::PermissionDenied => "geolocation permission denied",
            Self::PositionUnavailable => "position unavailable",
            Self::Timeout => "geolocation request timed out",
            Self::Other(_) => "geolocation error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, LocationErrorCode::PermissionDenied)]
    #[case(2, LocationErrorCode::PositionUnavailable)]
    #[case(3, LocationErrorCode::Timeout)]
    #[case(0, LocationErrorCode::Other(0))]
    #[case(42, LocationErrorCode::Other(42))]
    fn codes_round_trip(#[case] raw: u16, #[case] expected: LocationErrorCode) {
        let code = LocationErrorCode::from_code(raw);
        assert_eq!(code, expected);
        assert_eq!(code.code(), raw);
    }

    #[rstest]
    fn unknown_codes_get_a_generic_message() {
        assert_eq!(LocationErrorCode::Other(7).message(), "geolocation error");
    }

    #[rstest]
    fn builder_sets_accuracy_and_timestamp() {
        let position = Position::new(1.0, 2.0)
            .with_accuracy(5.0)
            .with_timestamp(1_700_000_000_000);
        assert_eq!(position.accuracy, 5.0);
        assert_eq!(position.timestamp, 1_700_000_000_000);
        assert_eq!(position.point().y(), 1.0);
    }
}
