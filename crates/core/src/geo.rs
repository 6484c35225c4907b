//! Geographic primitives: coordinate parsing and great-circle distance.
//!
//! Distances are only ever compared against a site threshold, so the
//! haversine formula with a spherical Earth is sufficient.

use once_cell::sync::Lazy;
use regex::Regex;

/// Earth radius in meters used by the haversine formula.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A parsed GPS position.
///
/// Only constructed from a successfully parsed coordinate string; derived
/// transiently and never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

static COORD_PAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^,]+?)\s*,\s*([^,]+)$").unwrap());

/// Parse a free-form `"lat, lon"` string into a validated point.
///
/// Returns `None` for empty input, the literal tokens `undefined`/`null`,
/// and anything that does not split into exactly two finite numbers. No
/// geographic bounds check is applied at this layer.
pub fn parse_coordinate(raw: &str) -> Option<GeoPoint> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("undefined")
        || trimmed.eq_ignore_ascii_case("null")
    {
        return None;
    }

    let caps = COORD_PAIR.captures(trimmed)?;
    let latitude: f64 = caps[1].trim().parse().ok()?;
    let longitude: f64 = caps[2].trim().parse().ok()?;
    if !latitude.is_finite() || !longitude.is_finite() {
        return None;
    }

    Some(GeoPoint {
        latitude,
        longitude,
    })
}

/// Great-circle distance in meters between two points.
///
/// Symmetric, zero for identical points, monotonic with angular
/// separation.
pub fn haversine_distance(p1: GeoPoint, p2: GeoPoint) -> f64 {
    let lat1 = p1.latitude.to_radians();
    let lat2 = p2.latitude.to_radians();
    let dlat = (p2.latitude - p1.latitude).to_radians();
    let dlon = (p2.longitude - p1.longitude).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_pair() {
        let p = parse_coordinate("24.7136, 46.6753").unwrap();
        assert_eq!(p.latitude, 24.7136);
        assert_eq!(p.longitude, 46.6753);
    }

    #[test]
    fn parse_tolerates_whitespace() {
        let p = parse_coordinate("  -1.5 ,  30.25  ").unwrap();
        assert_eq!(p.latitude, -1.5);
        assert_eq!(p.longitude, 30.25);
    }

    #[test]
    fn parse_rejects_empty_and_sentinel_tokens() {
        assert!(parse_coordinate("").is_none());
        assert!(parse_coordinate("   ").is_none());
        assert!(parse_coordinate("undefined").is_none());
        assert!(parse_coordinate("null").is_none());
    }

    #[test]
    fn parse_rejects_malformed_input() {
        assert!(parse_coordinate("abc").is_none());
        assert!(parse_coordinate("24.7").is_none());
        assert!(parse_coordinate("24.7, abc").is_none());
        assert!(parse_coordinate("24.7, 46.6, 12.0").is_none());
        assert!(parse_coordinate("nan, 46.6").is_none());
        assert!(parse_coordinate("inf, 46.6").is_none());
    }

    #[test]
    fn distance_zero_for_identical_points() {
        let p = GeoPoint {
            latitude: 24.7136,
            longitude: 46.6753,
        };
        assert_eq!(haversine_distance(p, p), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = GeoPoint {
            latitude: 24.7136,
            longitude: 46.6753,
        };
        let b = GeoPoint {
            latitude: 24.75,
            longitude: 46.7,
        };
        assert_eq!(haversine_distance(a, b), haversine_distance(b, a));
    }

    #[test]
    fn distance_one_degree_of_latitude() {
        // One degree along a meridian is R * pi / 180.
        let a = GeoPoint {
            latitude: 0.0,
            longitude: 0.0,
        };
        let b = GeoPoint {
            latitude: 1.0,
            longitude: 0.0,
        };
        let expected = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;
        assert!((haversine_distance(a, b) - expected).abs() < 1e-6);
    }
}
