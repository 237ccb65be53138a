//! Collection points returned by the ranking endpoint.
//!
//! The server orders collection points by proximity to the device. Clients
//! keep that order intact: filters and statistics never re-sort.

use geo::Point;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Lifecycle state of a collection request.
///
/// Unrecognised server values deserialise as [`CollectionStatus::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionStatus {
    /// Awaiting scheduling.
    #[default]
    Pending,
    /// Assigned to a date and time slot.
    Scheduled,
    /// A collector is on the way or on site.
    InProgress,
    /// Collected.
    Completed,
    /// Cancelled by the subscriber or an operator.
    Cancelled,
    /// The slot passed without a collection.
    Missed,
    /// Any status this client does not recognise.
    #[serde(other)]
    Unknown,
}

/// Street address coordinates of a collection point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Address {
    /// Latitude in decimal degrees.
    #[serde(deserialize_with = "lenient_f64")]
    pub latitude: f64,
    /// Longitude in decimal degrees.
    #[serde(deserialize_with = "lenient_f64")]
    pub longitude: f64,
}

impl Address {
    /// The address as a `geo` point (`x = longitude`, `y = latitude`).
    #[must_use]
    pub fn point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

/// A pickup location ranked by the server.
///
/// Fields the client does not interpret are kept in [`CollectionPoint::extra`]
/// so they survive a round trip to the UI untouched.
///
/// # Examples
/// ```
/// use tricycle_core::{CollectionPoint, CollectionStatus};
///
/// let json = r#"{
///     "id": "a1",
///     "address": {"latitude": "5.345300", "longitude": "-4.024400"},
///     "distance_km": 1.2,
///     "status": "scheduled",
///     "zone_name": "Cocody",
///     "subscriber": "K. Yao"
/// }"#;
/// let point: CollectionPoint = serde_json::from_str(json)?;
/// assert_eq!(point.status, CollectionStatus::Scheduled);
/// assert_eq!(point.address.latitude, 5.3453);
/// assert!(point.extra.contains_key("subscriber"));
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionPoint {
    /// Server identifier; numeric identifiers are kept in their decimal form.
    #[serde(deserialize_with = "lenient_id")]
    pub id: String,
    /// Where the pickup happens.
    pub address: Address,
    /// Distance from the device as computed by the server.
    #[serde(deserialize_with = "lenient_f64")]
    pub distance_km: f64,
    /// Current lifecycle state.
    #[serde(default)]
    pub status: CollectionStatus,
    /// Name of the collection zone, if the address has one.
    #[serde(default)]
    pub zone_name: Option<String>,
    /// Remaining server fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CollectionPoint {
    /// Construct a point with no zone and no extra fields.
    pub fn new(
        id: impl Into<String>,
        address: Address,
        distance_km: f64,
        status: CollectionStatus,
    ) -> Self {
        Self {
            id: id.into(),
            address,
            distance_km,
            status,
            zone_name: None,
            extra: Map::new(),
        }
    }

    /// Attach a zone name.
    #[must_use]
    pub fn with_zone(mut self, zone_name: impl Into<String>) -> Self {
        self.zone_name = Some(zone_name.into());
        self
    }

    /// Whether the collection has already been completed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == CollectionStatus::Completed
    }

    /// Whether the collection belongs to the named zone.
    #[must_use]
    pub fn in_zone(&self, zone_name: &str) -> bool {
        self.zone_name.as_deref() == Some(zone_name)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

/// Accept both JSON numbers and numeric strings.
///
/// Decimal columns are often serialised as strings to preserve precision.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(value) => Ok(value),
        NumberOrText::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn lenient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number identifier, found {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("\"pending\"", CollectionStatus::Pending)]
    #[case("\"in_progress\"", CollectionStatus::InProgress)]
    #[case("\"completed\"", CollectionStatus::Completed)]
    #[case("\"missed\"", CollectionStatus::Missed)]
    #[case("\"on_hold\"", CollectionStatus::Unknown)]
    fn status_parses_server_values(#[case] json: &str, #[case] expected: CollectionStatus) {
        let status: CollectionStatus = serde_json::from_str(json).expect("status should parse");
        assert_eq!(status, expected);
    }

    #[rstest]
    fn numeric_fields_accept_numbers_and_strings() {
        let json = r#"{
            "id": "7",
            "address": {"latitude": 5.5, "longitude": "-4.25"},
            "distance_km": "3.75"
        }"#;
        let point: CollectionPoint = serde_json::from_str(json).expect("point should parse");
        assert_eq!(point.address.latitude, 5.5);
        assert_eq!(point.address.longitude, -4.25);
        assert_eq!(point.distance_km, 3.75);
        assert_eq!(point.status, CollectionStatus::Pending);
        assert!(point.zone_name.is_none());
        assert!(point.extra.is_empty());
    }

    #[rstest]
    fn numeric_identifiers_become_strings() {
        let json = r#"{
            "id": 42,
            "address": {"latitude": 0.0, "longitude": 0.0},
            "distance_km": 0.5
        }"#;
        let point: CollectionPoint = serde_json::from_str(json).expect("point should parse");
        assert_eq!(point.id, "42");
    }

    #[rstest]
    fn malformed_numeric_string_is_rejected() {
        let json = r#"{
            "id": "7",
            "address": {"latitude": "north", "longitude": 1.0},
            "distance_km": 1.0
        }"#;
        let result = serde_json::from_str::<CollectionPoint>(json);
        assert!(result.is_err());
    }

    #[rstest]
    fn zone_membership_requires_exact_name() {
        let point = CollectionPoint::new(
            "1",
            Address {
                latitude: 0.0,
                longitude: 0.0,
            },
            1.0,
            CollectionStatus::Scheduled,
        )
        .with_zone("Plateau");
        assert!(point.in_zone("Plateau"));
        assert!(!point.in_zone("plateau"));
        assert!(!point.is_completed());
    }
}
