//! Test helpers for building trips and candidate pools.
//!
//! Trips built here are created and depart at t = 0 under the default expiry policy.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::ExpiryPolicy;
use crate::trip::{OwnerId, Trip, TripId, TripKind, Waypoint};

/// Build an active trip from `(lat, lng)` pairs.
pub fn trip_at(
    id: u64,
    owner: u64,
    kind: TripKind,
    pickup: (f64, f64),
    dropoff: (f64, f64),
) -> Trip {
    Trip::new(
        TripId(id),
        OwnerId(owner),
        kind,
        Waypoint::new(format!("pickup-{id}"), pickup.0, pickup.1),
        Waypoint::new(format!("dropoff-{id}"), dropoff.0, dropoff.1),
        0,
        0,
        &ExpiryPolicy::default(),
    )
}

pub fn offer(id: u64, owner: u64, pickup: (f64, f64), dropoff: (f64, f64)) -> Trip {
    trip_at(id, owner, TripKind::Offer, pickup, dropoff)
}

pub fn request(id: u64, owner: u64, pickup: (f64, f64), dropoff: (f64, f64)) -> Trip {
    trip_at(id, owner, TripKind::Request, pickup, dropoff)
}

pub fn parcel(id: u64, owner: u64, pickup: (f64, f64), dropoff: (f64, f64)) -> Trip {
    trip_at(id, owner, TripKind::Parcel, pickup, dropoff)
}

/// Seeded pool of trips with both stops inside a box around `center`.
///
/// Ids start at `first_id`; every trip has its own owner. Kinds cycle through
/// requests and parcels so the pool suits an offer subject.
pub fn random_pool(
    seed: u64,
    size: usize,
    first_id: u64,
    center: (f64, f64),
    half_span_deg: f64,
) -> Vec<Trip> {
    let mut rng = StdRng::seed_from_u64(seed);
    let point = |rng: &mut StdRng| {
        (
            center.0 + rng.gen_range(-half_span_deg..=half_span_deg),
            center.1 + rng.gen_range(-half_span_deg..=half_span_deg),
        )
    };
    (0..size as u64)
        .map(|i| {
            let kind = if i % 3 == 2 {
                TripKind::Parcel
            } else {
                TripKind::Request
            };
            let pickup = point(&mut rng);
            let dropoff = point(&mut rng);
            let id = first_id + i;
            trip_at(id, 1_000_000 + id, kind, pickup, dropoff)
        })
        .collect()
}
