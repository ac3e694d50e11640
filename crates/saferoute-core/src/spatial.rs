//! Spatial math for distance and travel-time calculations.

/// Mean Earth radius used by every great-circle calculation, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = EARTH_RADIUS_M / 1000.0;

pub fn deg_to_rad(deg: f64) -> f64 {
    deg.to_radians()
}

pub fn rad_to_deg(rad: f64) -> f64 {
    rad.to_degrees()
}

fn central_angle(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = deg_to_rad(lat1);
    let phi2 = deg_to_rad(lat2);
    let dphi = deg_to_rad(lat2 - lat1);
    let dlambda = deg_to_rad(lon2 - lon1);
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Calculate distance between two points in meters using Haversine formula.
///
/// # Arguments
/// * `lat1`, `lon1` - First point coordinates in decimal degrees
/// * `lat2`, `lon2` - Second point coordinates in decimal degrees
///
/// # Returns
/// Distance in meters
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    EARTH_RADIUS_M * central_angle(lat1, lon1, lat2, lon2)
}

/// Great-circle distance in kilometers.
pub fn haversine_distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    EARTH_RADIUS_KM * central_angle(lat1, lon1, lat2, lon2)
}

/// Minutes needed to cover `distance_km` at `speed_kmh`.
///
/// A non-positive speed yields infinity rather than a negative or NaN time.
pub fn travel_minutes(distance_km: f64, speed_kmh: f64) -> f64 {
    if speed_kmh <= 0.0 {
        return f64::INFINITY;
    }
    distance_km / speed_kmh * 60.0
}

// ==== Local degree/meter scaling ====

/// Meters per degree of latitude at a given latitude (WGS84 approximation).
pub fn meters_per_deg_lat(lat_deg: f64) -> f64 {
    let lat_rad = deg_to_rad(lat_deg);
    111_132.954 - 559.822 * (2.0 * lat_rad).cos() + 1.175 * (4.0 * lat_rad).cos()
        - 0.0023 * (6.0 * lat_rad).cos()
}

/// Meters per degree of longitude at a given latitude (WGS84 approximation).
pub fn meters_per_deg_lon(lat_deg: f64) -> f64 {
    let lat_rad = deg_to_rad(lat_deg);
    111_412.84 * lat_rad.cos() - 93.5 * (3.0 * lat_rad).cos() + 0.118 * (5.0 * lat_rad).cos()
}

/// Convert a north/south offset in meters to degrees latitude.
pub fn meters_to_lat(meters: f64, ref_lat_deg: f64) -> f64 {
    meters / meters_per_deg_lat(ref_lat_deg).max(1e-9)
}

/// Convert an east/west offset in meters to degrees longitude.
/// Requires the reference latitude for proper scaling.
pub fn meters_to_lon(meters: f64, ref_lat_deg: f64) -> f64 {
    meters / meters_per_deg_lon(ref_lat_deg).max(1e-9)
}
