//! Trip storage seam and an in-memory implementation.
//!
//! The matcher never talks to storage itself: callers pull one candidate snapshot
//! through [`TripRepository::fetch_candidates`], match against it, then record the
//! outcome with [`TripRepository::persist_match`].

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use crate::trip::{OwnerId, Trip, TripId, TripKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(TripId),
    #[error("{0} already exists")]
    DuplicateId(TripId),
    #[error("{0} cannot be matched with itself")]
    SelfMatch(TripId),
    #[error("{owner} does not own {trip}")]
    Forbidden { trip: TripId, owner: OwnerId },
}

/// Filter describing the candidate snapshot for one matching request.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateQuery {
    pub kinds: Vec<TripKind>,
    pub excluding_owner: OwnerId,
    pub active_only: bool,
    pub not_expired_as_of: u64,
}

impl CandidateQuery {
    /// Candidates a subject trip may be paired with at `now_ms`.
    pub fn for_subject(subject: &Trip, now_ms: u64) -> Self {
        Self {
            kinds: subject.kind.compatible_kinds().to_vec(),
            excluding_owner: subject.owner,
            active_only: true,
            not_expired_as_of: now_ms,
        }
    }

    pub fn admits(&self, trip: &Trip) -> bool {
        self.kinds.contains(&trip.kind)
            && trip.owner != self.excluding_owner
            && (!self.active_only || trip.active)
            && !trip.is_expired(self.not_expired_as_of)
    }
}

/// Storage operations the matching flow depends on.
pub trait TripRepository: Send + Sync {
    fn trip(&self, id: TripId) -> Result<Trip, StoreError>;

    fn fetch_candidates(&self, query: &CandidateQuery) -> Result<Vec<Trip>, StoreError>;

    /// Link two trips to each other. Must be atomic for the pair.
    fn persist_match(&self, a: TripId, b: TripId) -> Result<(), StoreError>;

    /// Usable trips of one kind, for listing.
    fn open_trips(&self, kind: TripKind, now_ms: u64) -> Result<Vec<Trip>, StoreError>;
}

impl<T: TripRepository + ?Sized> TripRepository for Arc<T> {
    fn trip(&self, id: TripId) -> Result<Trip, StoreError> {
        (**self).trip(id)
    }

    fn fetch_candidates(&self, query: &CandidateQuery) -> Result<Vec<Trip>, StoreError> {
        (**self).fetch_candidates(query)
    }

    fn persist_match(&self, a: TripId, b: TripId) -> Result<(), StoreError> {
        (**self).persist_match(a, b)
    }

    fn open_trips(&self, kind: TripKind, now_ms: u64) -> Result<Vec<Trip>, StoreError> {
        (**self).open_trips(kind, now_ms)
    }
}

/// Mutex-guarded trip map.
///
/// Every operation takes the single lock once, so a mutual link is written as one
/// unit and concurrent matches on a shared trip serialize.
#[derive(Debug, Default)]
pub struct InMemoryTripStore {
    trips: Mutex<BTreeMap<TripId, Trip>>,
}

impl InMemoryTripStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<TripId, Trip>> {
        // Writes leave the map consistent at every step, so a poisoned lock is still usable.
        self.trips.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, trip: Trip) -> Result<(), StoreError> {
        let mut trips = self.lock();
        if trips.contains_key(&trip.id) {
            return Err(StoreError::DuplicateId(trip.id));
        }
        trips.insert(trip.id, trip);
        Ok(())
    }

    /// Mark a trip inactive. Only its owner may do so.
    pub fn deactivate(&self, id: TripId, owner: OwnerId) -> Result<(), StoreError> {
        let mut trips = self.lock();
        let trip = trips.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if trip.owner != owner {
            return Err(StoreError::Forbidden { trip: id, owner });
        }
        trip.active = false;
        Ok(())
    }

    /// Delete a trip. Only its owner may do so; a partner linked to it is unlinked.
    pub fn remove(&self, id: TripId, owner: OwnerId) -> Result<Trip, StoreError> {
        let mut trips = self.lock();
        let trip = trips.get(&id).ok_or(StoreError::NotFound(id))?;
        if trip.owner != owner {
            return Err(StoreError::Forbidden { trip: id, owner });
        }
        let removed = trips.remove(&id).ok_or(StoreError::NotFound(id))?;
        for other in trips.values_mut() {
            if other.matched_trip == Some(id) {
                other.matched_trip = None;
            }
        }
        Ok(removed)
    }
}

impl TripRepository for InMemoryTripStore {
    fn trip(&self, id: TripId) -> Result<Trip, StoreError> {
        self.lock().get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    fn fetch_candidates(&self, query: &CandidateQuery) -> Result<Vec<Trip>, StoreError> {
        Ok(self
            .lock()
            .values()
            .filter(|trip| query.admits(trip))
            .cloned()
            .collect())
    }

    fn persist_match(&self, a: TripId, b: TripId) -> Result<(), StoreError> {
        if a == b {
            return Err(StoreError::SelfMatch(a));
        }
        let mut trips = self.lock();
        for id in [a, b] {
            if !trips.contains_key(&id) {
                return Err(StoreError::NotFound(id));
            }
        }

        // Drop stale back-references so every link stays mutual.
        for (id, partner) in [(a, b), (b, a)] {
            let previous = trips.get(&id).and_then(|trip| trip.matched_trip);
            if let Some(previous) = previous.filter(|p| *p != partner) {
                if let Some(stale) = trips.get_mut(&previous) {
                    if stale.matched_trip == Some(id) {
                        stale.matched_trip = None;
                    }
                }
            }
        }

        for (id, partner) in [(a, b), (b, a)] {
            if let Some(trip) = trips.get_mut(&id) {
                trip.matched_trip = Some(partner);
            }
        }
        Ok(())
    }

    fn open_trips(&self, kind: TripKind, now_ms: u64) -> Result<Vec<Trip>, StoreError> {
        Ok(self
            .lock()
            .values()
            .filter(|trip| trip.kind == kind && trip.is_usable(now_ms))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{offer, request};

    fn store_with(trips: Vec<Trip>) -> InMemoryTripStore {
        let store = InMemoryTripStore::new();
        for trip in trips {
            store.insert(trip).expect("insert");
        }
        store
    }

    #[test]
    fn rejects_duplicate_ids() {
        let store = store_with(vec![offer(1, 10, (0.0, 0.0), (0.0, 1.0))]);
        let err = store.insert(offer(1, 11, (0.0, 0.0), (0.0, 1.0))).unwrap_err();
        assert_eq!(err, StoreError::DuplicateId(TripId(1)));
    }

    #[test]
    fn fetch_candidates_applies_every_filter() {
        let subject = offer(1, 10, (0.0, 0.0), (0.0, 1.0));
        let mut inactive = request(3, 30, (0.0, 0.1), (0.0, 0.9));
        inactive.active = false;
        let mut expired = request(4, 40, (0.0, 0.1), (0.0, 0.9));
        expired.expires_at_ms = 5;
        let store = store_with(vec![
            subject.clone(),
            request(2, 20, (0.0, 0.1), (0.0, 0.9)),
            inactive,
            expired,
            request(5, 10, (0.0, 0.1), (0.0, 0.9)),
            offer(6, 60, (0.0, 0.1), (0.0, 0.9)),
        ]);

        let found = store
            .fetch_candidates(&CandidateQuery::for_subject(&subject, 10))
            .expect("fetch");
        let ids: Vec<TripId> = found.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![TripId(2)]);
    }

    #[test]
    fn persist_match_links_both_trips() {
        let store = store_with(vec![
            offer(1, 10, (0.0, 0.0), (0.0, 1.0)),
            request(2, 20, (0.0, 0.1), (0.0, 0.9)),
        ]);
        store.persist_match(TripId(1), TripId(2)).expect("link");
        store.persist_match(TripId(1), TripId(2)).expect("idempotent");

        assert_eq!(store.trip(TripId(1)).unwrap().matched_trip, Some(TripId(2)));
        assert_eq!(store.trip(TripId(2)).unwrap().matched_trip, Some(TripId(1)));
    }

    #[test]
    fn rematch_clears_previous_partner() {
        let store = store_with(vec![
            offer(1, 10, (0.0, 0.0), (0.0, 1.0)),
            request(2, 20, (0.0, 0.1), (0.0, 0.9)),
            request(3, 30, (0.0, 0.2), (0.0, 0.8)),
        ]);
        store.persist_match(TripId(1), TripId(2)).expect("first link");
        store.persist_match(TripId(3), TripId(1)).expect("second link");

        assert_eq!(store.trip(TripId(1)).unwrap().matched_trip, Some(TripId(3)));
        assert_eq!(store.trip(TripId(3)).unwrap().matched_trip, Some(TripId(1)));
        assert_eq!(store.trip(TripId(2)).unwrap().matched_trip, None);
    }

    #[test]
    fn persist_match_rejects_self_and_unknown_trips() {
        let store = store_with(vec![offer(1, 10, (0.0, 0.0), (0.0, 1.0))]);
        assert_eq!(
            store.persist_match(TripId(1), TripId(1)),
            Err(StoreError::SelfMatch(TripId(1)))
        );
        assert_eq!(
            store.persist_match(TripId(1), TripId(9)),
            Err(StoreError::NotFound(TripId(9)))
        );
        assert_eq!(store.trip(TripId(1)).unwrap().matched_trip, None);
    }

    #[test]
    fn only_owner_may_deactivate() {
        let store = store_with(vec![offer(1, 10, (0.0, 0.0), (0.0, 1.0))]);
        assert_eq!(
            store.deactivate(TripId(1), OwnerId(11)),
            Err(StoreError::Forbidden {
                trip: TripId(1),
                owner: OwnerId(11)
            })
        );
        store.deactivate(TripId(1), OwnerId(10)).expect("owner deactivates");
        assert!(store.open_trips(TripKind::Offer, 0).unwrap().is_empty());
    }

    #[test]
    fn only_owner_may_remove_and_partner_is_unlinked() {
        let store = store_with(vec![
            offer(1, 10, (0.0, 0.0), (0.0, 1.0)),
            request(2, 20, (0.0, 0.1), (0.0, 0.9)),
        ]);
        store.persist_match(TripId(1), TripId(2)).expect("link");

        assert_eq!(
            store.remove(TripId(1), OwnerId(20)),
            Err(StoreError::Forbidden {
                trip: TripId(1),
                owner: OwnerId(20)
            })
        );
        let removed = store.remove(TripId(1), OwnerId(10)).expect("owner removes");
        assert_eq!(removed.id, TripId(1));
        assert_eq!(store.trip(TripId(1)), Err(StoreError::NotFound(TripId(1))));
        assert_eq!(store.trip(TripId(2)).unwrap().matched_trip, None);
        assert_eq!(
            store.remove(TripId(1), OwnerId(10)),
            Err(StoreError::NotFound(TripId(1)))
        );
    }
}
