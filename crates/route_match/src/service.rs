//! Match-and-link flow on top of a [`TripRepository`].

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::{ExpiryPolicy, MatcherConfig};
use crate::matching::{MatchingAlgorithmHandle, RouteMatching};
use crate::store::{CandidateQuery, StoreError, TripRepository};
use crate::trip::{OwnerId, Trip, TripId, TripKind, Waypoint};

/// Which side of the marketplace a user is browsing from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserMode {
    Driver,
    Passenger,
}

impl UserMode {
    /// Drivers browse ride requests; passengers browse offers.
    pub fn listed_kind(self) -> TripKind {
        match self {
            UserMode::Driver => TripKind::Request,
            UserMode::Passenger => TripKind::Offer,
        }
    }
}

/// A persisted pairing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub subject: TripId,
    pub matched: TripId,
    pub deviation_km: f64,
    pub position_km: f64,
}

pub struct MatchService<R, C> {
    repository: R,
    clock: C,
    algorithm: MatchingAlgorithmHandle,
    expiry: ExpiryPolicy,
}

impl<R: TripRepository, C: Clock> MatchService<R, C> {
    pub fn new(repository: R, clock: C, config: MatcherConfig) -> Self {
        Self {
            repository,
            clock,
            algorithm: MatchingAlgorithmHandle::new(Box::new(RouteMatching::from_config(&config))),
            expiry: config.expiry,
        }
    }

    pub fn with_algorithm(mut self, algorithm: MatchingAlgorithmHandle) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Build a trip created now, with its expiry fixed by this service's policy.
    pub fn new_trip(
        &self,
        id: TripId,
        owner: OwnerId,
        kind: TripKind,
        pickup: Waypoint,
        dropoff: Waypoint,
        departure_ms: u64,
    ) -> Trip {
        let now = self.clock.now_ms();
        Trip::new(
            id,
            owner,
            kind,
            pickup,
            dropoff,
            now,
            departure_ms.max(now),
            &self.expiry,
        )
    }

    /// Find the best partner for `owner`'s trip `subject_id` and link the two trips.
    ///
    /// Returns `Ok(None)` when nothing in the pool is acceptable.
    pub fn match_trip(
        &self,
        subject_id: TripId,
        owner: OwnerId,
    ) -> Result<Option<MatchOutcome>, StoreError> {
        let now = self.clock.now_ms();
        let subject = self.repository.trip(subject_id)?;
        if subject.owner != owner {
            return Err(StoreError::Forbidden {
                trip: subject_id,
                owner,
            });
        }
        let candidates = self
            .repository
            .fetch_candidates(&CandidateQuery::for_subject(&subject, now))?;

        let Some(best) = self.algorithm.find_match(&subject, &candidates, now) else {
            debug!(subject = %subject_id, pool = candidates.len(), "no acceptable match");
            return Ok(None);
        };

        let outcome = MatchOutcome {
            subject: subject.id,
            matched: best.candidate.id,
            deviation_km: best.deviation_km,
            position_km: best.position_km,
        };

        if let Err(err) = self.repository.persist_match(outcome.subject, outcome.matched) {
            warn!(
                subject = %outcome.subject,
                matched = %outcome.matched,
                %err,
                "failed to persist match"
            );
            return Err(err);
        }
        info!(
            subject = %outcome.subject,
            matched = %outcome.matched,
            deviation_km = outcome.deviation_km,
            position_km = outcome.position_km,
            "trips matched"
        );
        Ok(Some(outcome))
    }

    /// Open trips visible to a user browsing in `mode`.
    pub fn open_trips(&self, mode: UserMode) -> Result<Vec<Trip>, StoreError> {
        self.repository.open_trips(mode.listed_kind(), self.clock.now_ms())
    }
}
