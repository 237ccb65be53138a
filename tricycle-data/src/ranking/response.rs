//! Wire types for the ranking endpoint's JSON envelope.
//!
//! Every response carries a `success` flag. Failed responses add an `error`
//! string; successful ones carry the ranked `collections` together with
//! server-computed `stats` and the `user_position` the server ranked against.

use serde::Deserialize;
use serde_json::Value;
use tricycle_core::CollectionPoint;

/// Outcome fields present on every response.
///
/// A missing `success` flag reads as failure.
#[derive(Debug, Default, Deserialize)]
pub struct ResponseStatus {
    /// Whether the server produced a ranking.
    #[serde(default)]
    pub success: bool,
    /// Server explanation when `success` is false.
    #[serde(default)]
    pub error: Option<String>,
}

impl ResponseStatus {
    /// Check if the response reports success.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.success
    }
}

/// Body of a successful ranking response.
#[derive(Debug, Deserialize)]
pub struct RankingResponse {
    /// Collections in proximity order.
    pub collections: Vec<CollectionPoint>,
    /// Opaque statistics block.
    #[serde(default)]
    pub stats: Value,
    /// Echo of the queried position.
    #[serde(default)]
    pub user_position: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tricycle_core::CollectionStatus;

    #[test]
    fn deserialise_success_response() {
        let json = r#"{
            "success": true,
            "collections": [
                {"id": "a", "address": {"latitude": 5.3, "longitude": -4.0},
                 "distance_km": 0.4, "status": "scheduled"}
            ],
            "stats": {"total": 1},
            "user_position": {"lat": 5.3, "lon": -4.0}
        }"#;

        let status: ResponseStatus = serde_json::from_str(json).expect("should deserialise");
        let body: RankingResponse = serde_json::from_str(json).expect("should deserialise");

        assert!(status.is_ok());
        assert_eq!(body.collections.len(), 1);
        assert_eq!(body.collections[0].status, CollectionStatus::Scheduled);
        assert_eq!(body.stats["total"], 1);
    }

    #[test]
    fn deserialise_error_response() {
        let json = r#"{"success": false, "error": "no data"}"#;

        let status: ResponseStatus = serde_json::from_str(json).expect("should deserialise");

        assert!(!status.is_ok());
        assert_eq!(status.error.as_deref(), Some("no data"));
    }

    #[test]
    fn missing_success_flag_reads_as_failure() {
        let status: ResponseStatus = serde_json::from_str("{}").expect("should deserialise");

        assert!(!status.is_ok());
        assert!(status.error.is_none());
    }

    #[test]
    fn metadata_defaults_to_null() {
        let body: RankingResponse =
            serde_json::from_str(r#"{"collections": []}"#).expect("should deserialise");

        assert!(body.collections.is_empty());
        assert!(body.stats.is_null());
        assert!(body.user_position.is_null());
    }
}
