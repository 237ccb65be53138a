//! Great-circle distance between WGS84 coordinates.
//!
//! Distances use the haversine formula on a spherical Earth. The result is an
//! approximation good to roughly 0.5%, which is plenty for ranking nearby
//! collection points and for debouncing GPS jitter.

use geo::Point;

/// Mean Earth radius in kilometres used by [`distance_km`].
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Convert an angle in degrees to radians.
///
/// # Examples
/// ```
/// use tricycle_core::to_radians;
///
/// assert!((to_radians(180.0) - std::f64::consts::PI).abs() < 1e-12);
/// ```
#[must_use]
pub fn to_radians(degrees: f64) -> f64 {
    degrees * std::f64::consts::PI / 180.0
}

/// Haversine distance in kilometres between two latitude/longitude pairs.
///
/// NaN inputs propagate to a NaN result.
///
/// # Examples
/// ```
/// use tricycle_core::distance_km;
///
/// let paris_to_london = distance_km(48.8566, 2.3522, 51.5074, -0.1278);
/// assert!((paris_to_london - 343.5).abs() < 1.0);
/// assert_eq!(distance_km(10.0, 20.0, 10.0, 20.0), 0.0);
/// ```
#[must_use]
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = to_radians(lat2 - lat1);
    let d_lon = to_radians(lon2 - lon1);
    let a = (d_lat / 2.0).sin().powi(2)
        + to_radians(lat1).cos() * to_radians(lat2).cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Haversine distance in kilometres between two `geo` points.
///
/// Points follow the `x = longitude`, `y = latitude` convention.
#[must_use]
pub fn haversine_km(from: Point<f64>, to: Point<f64>) -> f64 {
    distance_km(from.y(), from.x(), to.y(), to.x())
}
