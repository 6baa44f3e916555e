//! Trip records: the plain value types the matcher works on.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ExpiryPolicy;
use crate::geometry::{haversine_km, GeoPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TripId(pub u64);

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trip#{}", self.0)
    }
}

/// Opaque identity of the user who created a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OwnerId(pub u64);

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "owner#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripKind {
    /// A driver offering seats along a route.
    Offer,
    /// A passenger asking for a ride.
    Request,
    /// A parcel that needs carrying.
    Parcel,
}

impl TripKind {
    /// Kinds a trip of this kind may be matched against.
    pub fn compatible_kinds(self) -> &'static [TripKind] {
        match self {
            TripKind::Offer => &[TripKind::Request, TripKind::Parcel],
            TripKind::Request | TripKind::Parcel => &[TripKind::Offer],
        }
    }

    pub fn is_compatible_with(self, other: TripKind) -> bool {
        self.compatible_kinds().contains(&other)
    }

    /// True for the driving side of a pairing.
    pub fn is_driver(self) -> bool {
        matches!(self, TripKind::Offer)
    }
}

/// A named stop on a trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub name: String,
    pub point: GeoPoint,
}

impl Waypoint {
    pub fn new(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            name: name.into(),
            point: GeoPoint::new(lat, lng),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: TripId,
    pub owner: OwnerId,
    pub kind: TripKind,
    pub pickup: Waypoint,
    pub dropoff: Waypoint,
    pub active: bool,
    pub created_at_ms: u64,
    pub departure_ms: u64,
    /// Fixed when the trip is created; see [`Trip::new`].
    pub expires_at_ms: u64,
    #[serde(default)]
    pub matched_trip: Option<TripId>,
}

impl Trip {
    /// Create an active trip created at `created_at_ms` and departing at `departure_ms`.
    ///
    /// The expiry is derived once from the pickup→dropoff distance under `expiry`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: TripId,
        owner: OwnerId,
        kind: TripKind,
        pickup: Waypoint,
        dropoff: Waypoint,
        created_at_ms: u64,
        departure_ms: u64,
        expiry: &ExpiryPolicy,
    ) -> Self {
        let distance_km = haversine_km(pickup.point, dropoff.point);
        let expires_at_ms = expiry.expires_at_ms(departure_ms, distance_km);
        Self {
            id,
            owner,
            kind,
            pickup,
            dropoff,
            active: true,
            created_at_ms,
            departure_ms,
            expires_at_ms,
            matched_trip: None,
        }
    }

    /// Great-circle length of the trip (km).
    pub fn route_distance_km(&self) -> f64 {
        haversine_km(self.pickup.point, self.dropoff.point)
    }

    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at_ms
    }

    /// A trip takes part in matching only while active and not yet expired.
    pub fn is_usable(&self, now_ms: u64) -> bool {
        self.active && !self.is_expired(now_ms)
    }
}
