//! Builders for collection fixtures shared by unit and behaviour tests.

use crate::{Address, CollectionPoint, CollectionStatus};

/// Build a collection at the origin with the given server distance.
#[must_use]
pub fn collection_at_distance(id: &str, distance_km: f64, status: CollectionStatus) -> CollectionPoint {
    CollectionPoint::new(
        id,
        Address {
            latitude: 0.0,
            longitude: 0.0,
        },
        distance_km,
        status,
    )
}

/// Build a scheduled collection at the given address.
#[must_use]
pub fn collection_at(id: &str, latitude: f64, longitude: f64, distance_km: f64) -> CollectionPoint {
    CollectionPoint::new(
        id,
        Address {
            latitude,
            longitude,
        },
        distance_km,
        CollectionStatus::Scheduled,
    )
}

/// Build one scheduled collection per distance, numbered from zero.
#[must_use]
pub fn sample_collections(distances: &[f64]) -> Vec<CollectionPoint> {
    distances
        .iter()
        .enumerate()
        .map(|(i, &distance)| {
            collection_at_distance(&format!("c{i}"), distance, CollectionStatus::Scheduled)
        })
        .collect()
}
