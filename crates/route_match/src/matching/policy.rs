use serde::{Deserialize, Serialize};

use crate::geometry::{compute_route_metrics, GeoPoint, RouteMetrics};

/// Fraction used by the fixed, route-length-agnostic fallback.
pub const FIXED_DEVIATION_FRACTION: f64 = 0.30;

/// How far a point may stray from a route, as a fraction of the route length.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DeviationPolicy {
    /// Longer routes tolerate a smaller share of detour. See [`tiered_deviation_fraction`].
    #[default]
    Tiered,
    /// Same fraction for every route length.
    Fixed { fraction: f64 },
}

impl DeviationPolicy {
    pub fn fixed() -> Self {
        DeviationPolicy::Fixed {
            fraction: FIXED_DEVIATION_FRACTION,
        }
    }

    pub fn max_deviation_fraction(&self, route_distance_km: f64) -> f64 {
        match *self {
            DeviationPolicy::Tiered => tiered_deviation_fraction(route_distance_km),
            DeviationPolicy::Fixed { fraction } => fraction,
        }
    }

    /// Largest cross-track distance accepted for a route of this length.
    pub fn max_deviation_km(&self, route_distance_km: f64) -> f64 {
        route_distance_km * self.max_deviation_fraction(route_distance_km)
    }
}

/// Step function of route length:
///
/// | route (km)     | fraction |
/// |----------------|----------|
/// | > 100          | 0.12     |
/// | 50 < d ≤ 100   | 0.20     |
/// | 30 < d ≤ 50    | 0.25     |
/// | ≤ 30           | 0.30     |
pub fn tiered_deviation_fraction(route_distance_km: f64) -> f64 {
    if route_distance_km > 100.0 {
        0.12
    } else if route_distance_km > 50.0 {
        0.20
    } else if route_distance_km > 30.0 {
        0.25
    } else {
        0.30
    }
}

/// A directed route used as the reference for acceptability checks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Route {
    pub origin: GeoPoint,
    pub destination: GeoPoint,
}

impl Route {
    pub fn new(origin: GeoPoint, destination: GeoPoint) -> Self {
        Self {
            origin,
            destination,
        }
    }

    pub fn metrics_for(&self, point: GeoPoint) -> RouteMetrics {
        compute_route_metrics(self.origin, self.destination, point)
    }
}

/// Why a point falls outside a route's envelope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    TooFarFromRoute { cross_track_km: f64, max_km: f64 },
    OutsideRouteSpan { along_track_km: f64, route_km: f64 },
}

/// Check a point against the deviation envelope of `route`, reporting the failing bound.
pub fn check_point(
    route: &Route,
    point: GeoPoint,
    policy: &DeviationPolicy,
) -> Result<RouteMetrics, Rejection> {
    let metrics = route.metrics_for(point);
    let max_km = policy.max_deviation_km(metrics.route_distance_km);
    if metrics.cross_track_km > max_km {
        return Err(Rejection::TooFarFromRoute {
            cross_track_km: metrics.cross_track_km,
            max_km,
        });
    }
    if !metrics.projects_onto_route() {
        return Err(Rejection::OutsideRouteSpan {
            along_track_km: metrics.along_track_km,
            route_km: metrics.route_distance_km,
        });
    }
    Ok(metrics)
}

/// True when `point` lies within the allowed detour of `route` and projects between its ends.
pub fn is_point_acceptable(route: &Route, point: GeoPoint, policy: &DeviationPolicy) -> bool {
    check_point(route, point, policy).is_ok()
}
