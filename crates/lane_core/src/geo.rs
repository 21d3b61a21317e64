//! Distance utilities: great-circle distance in miles and radius bounding boxes.
//!
//! Everything here is pure. Coordinates are degrees; distances are statute miles.

use serde::{Deserialize, Serialize};

use crate::error::{LaneError, Result};

/// Mean Earth radius in statute miles.
pub const EARTH_RADIUS_MILES: f64 = 3958.761;

/// Miles per degree of latitude used for bounding-box approximation.
pub const MILES_PER_DEGREE_LAT: f64 = 69.0;

/// Floor applied to `cos(latitude)` so longitude deltas stay finite near the poles.
const MIN_COS_LAT: f64 = 1e-6;

/// Axis-aligned lat/lon box used as a coarse pre-filter before exact haversine checks.
///
/// Latitudes stay within `[-90, 90]`. Longitudes may run past `±180` when the box
/// crosses the antimeridian; [`BoundingBox::contains`] wraps them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Inclusive containment check, wrapping longitude across the antimeridian.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        if lat < self.min_lat || lat > self.max_lat {
            return false;
        }
        if self.max_lon - self.min_lon >= 360.0 {
            return true;
        }
        [lon, lon - 360.0, lon + 360.0]
            .iter()
            .any(|&l| l >= self.min_lon && l <= self.max_lon)
    }
}

fn ensure_finite(value: f64, what: &str) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(LaneError::invalid_input(format!("{what} must be a finite number, got {value}")))
    }
}

/// Great-circle distance between two points in miles.
///
/// Fails with [`LaneError::InvalidInput`] if any coordinate is NaN or infinite.
pub fn haversine_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Result<f64> {
    ensure_finite(lat1, "lat1")?;
    ensure_finite(lon1, "lon1")?;
    ensure_finite(lat2, "lat2")?;
    ensure_finite(lon2, "lon2")?;

    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlon = (dlon * 0.5).sin();
    let h = sin_dlat * sin_dlat + phi1.cos() * phi2.cos() * sin_dlon * sin_dlon;
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    Ok(EARTH_RADIUS_MILES * c)
}

/// Approximate box enclosing every point within `miles` of `(lat, lon)`.
///
/// One degree of latitude is taken as 69 miles; the longitude delta is divided by
/// `cos(lat)`, floored at `1e-6`. Latitudes are clamped to `[-90, 90]` and a box
/// reaching a pole spans every longitude.
pub fn bounding_box_from_radius(lat: f64, lon: f64, miles: f64) -> Result<BoundingBox> {
    ensure_finite(lat, "lat")?;
    ensure_finite(lon, "lon")?;
    ensure_finite(miles, "miles")?;
    if miles < 0.0 {
        return Err(LaneError::invalid_input(format!(
            "radius must be non-negative, got {miles}"
        )));
    }

    let lat_delta = miles / MILES_PER_DEGREE_LAT;
    let cos_lat = lat.to_radians().cos().abs().max(MIN_COS_LAT);
    let lon_delta = miles / (MILES_PER_DEGREE_LAT * cos_lat);
    let (min_lat, max_lat) = (lat - lat_delta, lat + lat_delta);

    // A radius reaching a pole covers every longitude.
    let (min_lon, max_lon) = if min_lat <= -90.0 || max_lat >= 90.0 || lon_delta >= 180.0 {
        (-180.0, 180.0)
    } else {
        (lon - lon_delta, lon + lon_delta)
    };

    Ok(BoundingBox {
        min_lat: min_lat.max(-90.0),
        max_lat: max_lat.min(90.0),
        min_lon,
        max_lon,
    })
}

/// Point reached by travelling `miles` from `(lat, lon)` along `bearing_deg`.
///
/// Inverse of [`haversine_miles`] on the same sphere; used to lay out fixtures
/// at exact distances.
pub fn offset_point(lat: f64, lon: f64, bearing_deg: f64, miles: f64) -> (f64, f64) {
    let delta = miles / EARTH_RADIUS_MILES;
    let theta = bearing_deg.to_radians();
    let phi1 = lat.to_radians();
    let lambda1 = lon.to_radians();

    let sin_phi2 = phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos();
    let phi2 = sin_phi2.clamp(-1.0, 1.0).asin();
    let lambda2 = lambda1
        + (theta.sin() * delta.sin() * phi1.cos()).atan2(delta.cos() - phi1.sin() * phi2.sin());

    (phi2.to_degrees(), lambda2.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHICAGO: (f64, f64) = (41.8781, -87.6298);
    const ATLANTA: (f64, f64) = (33.7488, -84.3877);

    #[test]
    fn chicago_to_atlanta_is_about_588_miles() {
        let d = haversine_miles(CHICAGO.0, CHICAGO.1, ATLANTA.0, ATLANTA.1).unwrap();
        assert!((d - 588.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn distance_is_symmetric_and_zero_on_self() {
        let ab = haversine_miles(CHICAGO.0, CHICAGO.1, ATLANTA.0, ATLANTA.1).unwrap();
        let ba = haversine_miles(ATLANTA.0, ATLANTA.1, CHICAGO.0, CHICAGO.1).unwrap();
        assert_eq!(ab, ba);
        let zero = haversine_miles(CHICAGO.0, CHICAGO.1, CHICAGO.0, CHICAGO.1).unwrap();
        assert_eq!(zero, 0.0);
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = haversine_miles(bad, 0.0, 0.0, 0.0).unwrap_err();
            assert!(matches!(err, LaneError::InvalidInput(_)));
            assert!(haversine_miles(0.0, 0.0, 0.0, bad).is_err());
        }
    }

    #[test]
    fn bounding_box_spans_radius_in_latitude() {
        let bbox = bounding_box_from_radius(CHICAGO.0, CHICAGO.1, 69.0).unwrap();
        assert!((bbox.max_lat - bbox.min_lat - 2.0).abs() < 1e-9);
        assert!(bbox.max_lon - bbox.min_lon > 2.0);
        assert!(bbox.contains(CHICAGO.0, CHICAGO.1));
    }

    #[test]
    fn bounding_box_stays_finite_at_the_pole() {
        let bbox = bounding_box_from_radius(90.0, 0.0, 10.0).unwrap();
        assert!(bbox.min_lon.is_finite());
        assert!(bbox.max_lon.is_finite());
    }

    #[test]
    fn bounding_box_wraps_the_antimeridian() {
        let bbox = bounding_box_from_radius(-17.0, 179.9, 50.0).unwrap();
        assert!(bbox.max_lon > 180.0);
        assert!(bbox.contains(-17.0, -179.9));
        assert!(bbox.contains(-17.0, 179.5));
        assert!(!bbox.contains(-17.0, -170.0));
    }

    #[test]
    fn bounding_box_around_a_pole_spans_every_longitude() {
        let bbox = bounding_box_from_radius(89.5, 10.0, 100.0).unwrap();
        assert_eq!(bbox.max_lat, 90.0);
        assert!(bbox.contains(89.5, -170.0));
        assert!(!bbox.contains(85.0, 10.0));
    }

    #[test]
    fn bounding_box_rejects_negative_radius() {
        assert!(bounding_box_from_radius(0.0, 0.0, -1.0).is_err());
    }

    #[test]
    fn offset_point_lands_at_requested_distance() {
        for bearing in [0.0, 45.0, 90.0, 200.0, 315.0] {
            let (lat, lon) = offset_point(CHICAGO.0, CHICAGO.1, bearing, 90.0);
            let d = haversine_miles(CHICAGO.0, CHICAGO.1, lat, lon).unwrap();
            assert!((d - 90.0).abs() < 1e-6, "bearing {bearing}: {d}");
        }
    }

    #[test]
    fn bounding_box_contains_every_point_on_the_radius() {
        let bbox = bounding_box_from_radius(CHICAGO.0, CHICAGO.1, 125.0).unwrap();
        for step in 0..36 {
            let (lat, lon) = offset_point(CHICAGO.0, CHICAGO.1, step as f64 * 10.0, 124.0);
            assert!(bbox.contains(lat, lon), "bearing {}", step * 10);
        }
    }
}
