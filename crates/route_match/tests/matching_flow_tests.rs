use route_match::geometry::{compute_route_metrics, GeoPoint};
use route_match::matching::{
    is_point_acceptable, DeviationPolicy, MatchingAlgorithm, Route, RouteMatching,
};
use route_match::test_helpers::{offer, parcel, random_pool, request};
use route_match::{find_best_match, TripId};

#[test_log::test]
fn offer_selects_request_lying_along_its_route() {
    let subject = offer(1, 10, (0.0, 0.0), (0.0, 1.0));
    let pool = vec![request(2, 20, (0.0, 0.01), (0.0, 0.99))];

    let best = find_best_match(&subject, &pool, 0).expect("request should match");
    assert_eq!(best.id, TripId(2));
}

#[test_log::test]
fn candidate_far_from_route_is_rejected() {
    let subject = offer(1, 10, (0.0, 0.0), (0.0, 1.0));
    let pool = vec![request(2, 20, (10.0, 10.0), (0.0, 0.99))];

    assert!(find_best_match(&subject, &pool, 0).is_none());
}

#[test_log::test]
fn smaller_deviation_wins_over_earlier_position() {
    let subject = request(1, 10, (0.01, 0.7), (0.01, 0.8));
    let near_line_late = offer(2, 20, (0.0, 0.0), (0.0, 1.0));
    let off_line_early = offer(3, 30, (0.03, 0.6), (0.03, 1.0));
    let pool = vec![off_line_early, near_line_late];

    let ranked = RouteMatching::default().rank_candidates(&subject, &pool, 0);
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].candidate.id, TripId(2));
    assert_eq!(ranked[1].candidate.id, TripId(3));
    assert!(ranked[0].deviation_km < ranked[1].deviation_km);
    assert!(ranked[0].position_km > ranked[1].position_km);
}

#[test]
fn equal_deviation_breaks_ties_by_position() {
    let subject = request(1, 10, (0.0, 0.5), (0.0, 0.6));
    let long_before = offer(2, 20, (0.0, 0.0), (0.0, 1.0));
    let just_before = offer(3, 30, (0.0, 0.4), (0.0, 0.7));
    let pool = vec![long_before, just_before];

    let best = RouteMatching::default()
        .find_match(&subject, &pool, 0)
        .expect("match");
    assert_eq!(best.candidate.id, TripId(3));
}

#[test]
fn offers_also_match_parcels() {
    let subject = offer(1, 10, (0.0, 0.0), (0.0, 1.0));
    let pool = vec![parcel(2, 20, (0.0, 0.3), (0.0, 0.6))];
    assert_eq!(find_best_match(&subject, &pool, 0).map(|t| t.id), Some(TripId(2)));
}

#[test]
fn expired_and_inactive_candidates_are_skipped() {
    let subject = offer(1, 10, (0.0, 0.0), (0.0, 1.0));
    let mut inactive = request(2, 20, (0.0, 0.01), (0.0, 0.99));
    inactive.active = false;
    let expired = request(3, 30, (0.0, 0.01), (0.0, 0.99));
    let now = expired.expires_at_ms;
    let pool = vec![inactive, expired];

    assert!(find_best_match(&subject, &pool, now).is_none());
    assert_eq!(find_best_match(&subject, &pool, now - 1).map(|t| t.id), Some(TripId(3)));
}

#[test]
fn same_owner_is_never_matched() {
    let subject = offer(1, 10, (0.0, 0.0), (0.0, 1.0));
    let pool = vec![request(2, 10, (0.0, 0.01), (0.0, 0.99))];
    assert!(find_best_match(&subject, &pool, 0).is_none());
}

#[test]
fn both_stops_must_pass() {
    let subject = offer(1, 10, (0.0, 0.0), (0.0, 1.0));
    let pickup_ok_dropoff_past_end = request(2, 20, (0.0, 0.1), (0.0, 1.2));
    let pickup_behind_dropoff_ok = request(3, 30, (0.0, -0.2), (0.0, 0.5));
    let pool = vec![pickup_ok_dropoff_past_end, pickup_behind_dropoff_ok];
    assert!(find_best_match(&subject, &pool, 0).is_none());
}

#[test]
fn fixed_policy_accepts_wider_detours_on_long_routes() {
    let subject = offer(1, 10, (0.0, 0.0), (0.0, 1.0));
    let pool = vec![request(2, 20, (0.2, 0.3), (0.2, 0.7))];

    assert!(RouteMatching::default().find_match(&subject, &pool, 0).is_none());
    assert!(RouteMatching::new(DeviationPolicy::fixed())
        .find_match(&subject, &pool, 0)
        .is_some());
}

#[test]
fn accepted_points_always_project_onto_route() {
    let route = Route::new(GeoPoint::new(52.40, 13.10), GeoPoint::new(52.60, 13.70));
    for i in -20..=20 {
        for j in -20..=20 {
            let point = GeoPoint::new(52.50 + i as f64 * 0.02, 13.40 + j as f64 * 0.03);
            let metrics = compute_route_metrics(route.origin, route.destination, point);
            if is_point_acceptable(&route, point, &DeviationPolicy::Tiered) {
                assert!(metrics.along_track_km >= 0.0, "{point:?} {metrics:?}");
                assert!(
                    metrics.along_track_km <= metrics.route_distance_km,
                    "{point:?} {metrics:?}"
                );
            }
        }
    }
}

#[test]
fn route_distance_is_direction_independent() {
    let a = GeoPoint::new(40.7128, -74.0060);
    let b = GeoPoint::new(34.0522, -118.2437);
    let forward = compute_route_metrics(a, b, a).route_distance_km;
    let backward = compute_route_metrics(b, a, b).route_distance_km;
    assert!((forward - backward).abs() < 1e-9);
}

#[test]
fn best_match_in_random_pool_has_minimal_deviation() {
    let subject = offer(1, 10, (52.40, 13.10), (52.60, 13.70));
    let pool = random_pool(42, 500, 100, (52.5, 13.4), 0.3);

    let ranked = RouteMatching::default().rank_candidates(&subject, &pool, 0);
    assert!(!ranked.is_empty());
    let best = RouteMatching::default()
        .find_match(&subject, &pool, 0)
        .expect("pool has acceptable candidates");
    assert_eq!(best.candidate.id, ranked[0].candidate.id);
    assert!(ranked.iter().all(|r| r.deviation_km >= best.deviation_km));
    assert!(ranked.iter().all(|r| r.position_km >= 0.0));
}
