//! Great-circle geometry: haversine distances and route metrics.
//!
//! This module provides:
//!
//! - **GeoPoint**: A (latitude, longitude) pair in decimal degrees
//! - **Distance calculations**: Haversine distance on a sphere of radius [`EARTH_RADIUS_KM`]
//! - **Bearings**: Initial great-circle bearing between two points
//! - **Route metrics**: Cross-track and along-track distances of a point against a route
//!
//! Every inverse trigonometric call clamps its argument to `[-1, 1]` so that rounding
//! drift near coincident or antipodal points never produces `NaN`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mean Earth radius used by every distance calculation (km).
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distances below this are rounding noise (1 mm): cross-track snaps to zero and
/// along-track snaps onto either end of the route.
const ROUTE_SNAP_KM: f64 = 1e-6;

/// Errors raised by the validating [`GeoPoint::try_new`] constructor.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeoError {
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

/// A geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Build a point without range checks. Callers that accept user input
    /// should go through [`GeoPoint::try_new`].
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Build a point, rejecting non-finite or out-of-range coordinates.
    pub fn try_new(lat: f64, lng: f64) -> Result<Self, GeoError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(GeoError::LatitudeOutOfRange(lat));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(GeoError::LongitudeOutOfRange(lng));
        }
        Ok(Self { lat, lng })
    }

    fn to_radians(self) -> (f64, f64) {
        (self.lat.to_radians(), self.lng.to_radians())
    }
}

/// Convert a surface distance into the central angle it subtends (radians).
pub fn km_to_angle(distance_km: f64) -> f64 {
    distance_km / EARTH_RADIUS_KM
}

/// Convert a central angle (radians) into a surface distance.
pub fn angle_to_km(angle: f64) -> f64 {
    angle * EARTH_RADIUS_KM
}

fn clamp_unit(x: f64) -> f64 {
    x.clamp(-1.0, 1.0)
}

/// Haversine distance between two points in kilometers.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat1, lon1) = a.to_radians();
    let (lat2, lon2) = b.to_radians();
    let sin_dlat = ((lat2 - lat1) * 0.5).sin();
    let sin_dlon = ((lon2 - lon1) * 0.5).sin();
    let h = (sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon)
        .clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    angle_to_km(c)
}

/// Initial great-circle bearing from `from` towards `to`, in radians (-π..=π, 0 = north).
///
/// Undefined when the points coincide; `atan2(0, 0)` then yields 0.
pub fn initial_bearing(from: GeoPoint, to: GeoPoint) -> f64 {
    let (lat1, lon1) = from.to_radians();
    let (lat2, lon2) = to.to_radians();
    let dlon = lon2 - lon1;
    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    y.atan2(x)
}

/// Distances describing where a point sits relative to a route A→B.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteMetrics {
    /// Great-circle distance A→B.
    pub route_distance_km: f64,
    /// Unsigned perpendicular distance from C to the great circle through A and B.
    pub cross_track_km: f64,
    /// Distance from A to the projection of C on the route. Negative when the
    /// projection falls behind A.
    pub along_track_km: f64,
}

impl RouteMetrics {
    /// True when the projection of C lies between A and B inclusive.
    pub fn projects_onto_route(&self) -> bool {
        self.along_track_km >= 0.0 && self.along_track_km <= self.route_distance_km
    }
}

/// Compute route distance, cross-track and along-track distances of `c`
/// against the route `a` → `b`.
///
/// A zero-length route has no bearing; C is then reported at its full distance
/// from A as cross-track with zero along-track, so only C = A lies on it.
pub fn compute_route_metrics(a: GeoPoint, b: GeoPoint, c: GeoPoint) -> RouteMetrics {
    let route_distance_km = haversine_km(a, b);
    let distance_ac_km = haversine_km(a, c);

    if route_distance_km <= 0.0 {
        return RouteMetrics {
            route_distance_km: 0.0,
            cross_track_km: distance_ac_km,
            along_track_km: 0.0,
        };
    }

    let delta_bearing = initial_bearing(a, c) - initial_bearing(a, b);
    let angle_ac = km_to_angle(distance_ac_km);

    let cross_angle = clamp_unit(angle_ac.sin() * delta_bearing.sin()).asin();
    let along_angle = clamp_unit(angle_ac.cos() / cross_angle.cos()).acos();

    let mut along_track_km = if delta_bearing.cos() < 0.0 && along_angle > 0.0 {
        -angle_to_km(along_angle)
    } else {
        angle_to_km(along_angle)
    };
    if along_track_km.abs() < ROUTE_SNAP_KM {
        along_track_km = 0.0;
    } else if (along_track_km - route_distance_km).abs() < ROUTE_SNAP_KM {
        along_track_km = route_distance_km;
    }

    let mut cross_track_km = angle_to_km(cross_angle).abs();
    if cross_track_km < ROUTE_SNAP_KM {
        cross_track_km = 0.0;
    }

    RouteMetrics {
        route_distance_km,
        cross_track_km,
        along_track_km,
    }
}
