//! Straight-line distance estimation between WGS84 points.

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers between two points given in degrees.
///
/// NaN coordinates propagate as NaN.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let r_lat1 = lat1.to_radians();
    let r_lat2 = lat2.to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + r_lat1.cos() * r_lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Haversine distance scaled by `adjustment_factor` to approximate the
/// routed distance, which is always longer than the great circle.
pub fn estimate_distance_km(
    lat1: f64,
    lon1: f64,
    lat2: f64,
    lon2: f64,
    adjustment_factor: f64,
) -> f64 {
    haversine_km(lat1, lon1, lat2, lon2) * adjustment_factor
}
