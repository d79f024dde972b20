//! Coordinate validation and straight-line distance.

use h3o::LatLng;

/// Validate a latitude/longitude pair, returning its `LatLng` form.
///
/// Returns `None` when either component is outside its valid range or not a
/// finite number.
pub fn coordinate(latitude: f64, longitude: f64) -> Option<LatLng> {
    LatLng::new(latitude, longitude).ok()
}

/// Haversine great-circle distance between two coordinates, in kilometers.
pub fn distance_km_between(a: LatLng, b: LatLng) -> f64 {
    let (lat1, lon1) = (a.lat().to_radians(), a.lng().to_radians());
    let (lat2, lon2) = (b.lat().to_radians(), b.lng().to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlon = (dlon * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    6371.0 * c
}
