//! Spatial math for distance, bearing, and tick-wise position updates.

use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A point on the sphere in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Calculate great-circle distance between two points in kilometers
/// using the Haversine formula.
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let dphi = (b.lat - a.lat).to_radians();
    let dlambda = (b.lon - a.lon).to_radians();
    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Initial compass bearing from `a` to `b` in degrees, normalized to [0, 360).
pub fn bearing_deg(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let delta_lambda = (b.lon - a.lon).to_radians();

    let x = delta_lambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    (x.atan2(y).to_degrees() + 360.0) % 360.0
}

/// Advance one simulation tick from `current` toward `target`.
///
/// Distance coverable in the tick is `speed_kmh / 3600 * interval_secs`.
/// When the coverable distance reaches the remaining distance the target is
/// returned exactly, so a moving drone snaps onto its waypoint instead of
/// overshooting and oscillating. Otherwise latitude and longitude are
/// interpolated linearly by the covered fraction, which is a good enough
/// approximation for the short per-tick hops this engine deals in.
pub fn next_position(
    current: GeoPoint,
    target: GeoPoint,
    speed_kmh: f64,
    interval_secs: f64,
) -> GeoPoint {
    let remaining_km = distance_km(current, target);
    let coverable_km = speed_kmh / 3600.0 * interval_secs;

    if coverable_km >= remaining_km {
        return target;
    }

    let fraction = coverable_km / remaining_km;
    GeoPoint {
        lat: current.lat + (target.lat - current.lat) * fraction,
        lon: current.lon + (target.lon - current.lon) * fraction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAIGON_CENTER: GeoPoint = GeoPoint {
        lat: 10.7769,
        lon: 106.7009,
    };
    const SAIGON_NORTH: GeoPoint = GeoPoint {
        lat: 10.8231,
        lon: 106.6297,
    };

    #[test]
    fn distance_same_point_is_zero() {
        assert!(distance_km(SAIGON_CENTER, SAIGON_CENTER) < 1e-9);
    }

    #[test]
    fn distance_is_symmetric() {
        let ab = distance_km(SAIGON_CENTER, SAIGON_NORTH);
        let ba = distance_km(SAIGON_NORTH, SAIGON_CENTER);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn distance_known_city_span() {
        // Ho Chi Minh City span, roughly 9.1 km
        let dist = distance_km(SAIGON_CENTER, SAIGON_NORTH);
        assert!((dist - 9.1).abs() < 0.5, "expected ~9.1 km, got {dist}");
    }

    #[test]
    fn bearing_cardinal_directions() {
        let origin = GeoPoint::new(0.0, 0.0);
        let north = bearing_deg(origin, GeoPoint::new(1.0, 0.0));
        let east = bearing_deg(origin, GeoPoint::new(0.0, 1.0));
        let south = bearing_deg(origin, GeoPoint::new(-1.0, 0.0));
        assert!(north.abs() < 0.01);
        assert!((east - 90.0).abs() < 0.01);
        assert!((south - 180.0).abs() < 0.01);
    }

    #[test]
    fn next_position_snaps_onto_target() {
        let current = GeoPoint::new(10.0, 106.0);
        let target = GeoPoint::new(10.0001, 106.0001);
        // 60 km/h over 60 s covers 1 km, far more than the ~15 m remaining
        let next = next_position(current, target, 60.0, 60.0);
        assert_eq!(next, target);
    }

    #[test]
    fn next_position_interpolates_strictly_between() {
        let current = GeoPoint::new(10.0, 106.0);
        let target = GeoPoint::new(10.05, 106.05);
        let next = next_position(current, target, 60.0, 2.0);

        assert_ne!(next, current);
        assert_ne!(next, target);
        assert!(next.lat > current.lat && next.lat < target.lat);
        assert!(next.lon > current.lon && next.lon < target.lon);
    }

    #[test]
    fn repeated_steps_converge_monotonically() {
        let target = GeoPoint::new(10.05, 106.05);
        let mut pos = GeoPoint::new(10.0, 106.0);
        let mut remaining = distance_km(pos, target);
        let mut ticks = 0;

        while pos != target {
            pos = next_position(pos, target, 60.0, 2.0);
            let now_remaining = distance_km(pos, target);
            assert!(now_remaining < remaining, "remaining distance must shrink");
            remaining = now_remaining;
            ticks += 1;
            assert!(ticks < 10_000, "drone never arrived");
        }
    }
}
