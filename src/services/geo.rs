//! Great-circle geometry used by proximity search.

use serde::{Deserialize, Serialize};

use super::error::{ServiceError, ServiceResult};

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A validated WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Build a point, rejecting non-finite or out-of-range coordinates.
    pub fn new(lat: f64, lng: f64) -> ServiceResult<Self> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(ServiceError::invalid(
                "lat",
                format!("{lat} is outside [-90, 90]"),
            ));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(ServiceError::invalid(
                "lng",
                format!("{lng} is outside [-180, 180]"),
            ));
        }
        Ok(Self { lat, lng })
    }
}

/// Spherical law of cosines distance in kilometres:
/// `R * acos(cos φ1 cos φ2 cos Δλ + sin φ1 sin φ2)`.
///
/// The acos argument is clamped so rounding never produces NaN near
/// antipodal points.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    // cos² + sin² can round just below 1.0; coincident points must be exact.
    if a == b {
        return 0.0;
    }

    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let delta_lambda = (b.lng - a.lng).to_radians();

    let cosine = phi1.cos() * phi2.cos() * delta_lambda.cos() + phi1.sin() * phi2.sin();
    EARTH_RADIUS_KM * cosine.clamp(-1.0, 1.0).acos()
}

/// Pad added to every latitude band, in degrees (about 111 m).
///
/// Near zero the acos in [`haversine_km`] loses precision and reports 0 km
/// for points up to a few metres apart. The pad must exceed that error so
/// the band never drops a point the formula places inside the radius.
pub const BAND_PAD_DEG: f64 = 1e-3;

/// Latitude half-width (degrees) of a band guaranteed to contain every point
/// within `radius_km` of any origin. Great-circle distance is never shorter
/// than the meridional separation, so the band is a strict superset.
pub fn latitude_band_deg(radius_km: f64) -> f64 {
    (radius_km / EARTH_RADIUS_KM).to_degrees() + BAND_PAD_DEG
}
