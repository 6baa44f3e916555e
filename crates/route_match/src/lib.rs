//! Route matching for shared rides.
//!
//! Given a subject trip and a snapshot of candidate trips, pick the candidate whose
//! route best accommodates it: passenger stops must lie close to the driver's
//! great-circle route, and acceptable candidates are ranked by cross-track deviation.

pub mod clock;
pub mod config;
pub mod geometry;
pub mod matching;
pub mod service;
pub mod store;
pub mod trip;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use config::{ConfigError, ExpiryPolicy, MatcherConfig};
pub use geometry::{compute_route_metrics, haversine_km, GeoError, GeoPoint, RouteMetrics};
pub use matching::{
    is_point_acceptable, DeviationPolicy, MatchResult, MatchingAlgorithm, Route, RouteMatching,
};
pub use trip::{OwnerId, Trip, TripId, TripKind, Waypoint};

/// Best candidate for `subject` under the default tiered deviation policy.
pub fn find_best_match<'a>(
    subject: &Trip,
    candidates: &'a [Trip],
    now_ms: u64,
) -> Option<&'a Trip> {
    RouteMatching::default()
        .find_match(subject, candidates, now_ms)
        .map(|result| result.candidate)
}
