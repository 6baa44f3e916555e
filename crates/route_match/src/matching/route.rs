use tracing::{debug, trace};

use crate::config::MatcherConfig;
use crate::trip::Trip;

use super::algorithm::MatchingAlgorithm;
use super::policy::{check_point, DeviationPolicy, Rejection, Route};
use super::types::MatchResult;

/// Route-deviation matching.
///
/// A candidate is kept when both passenger-side stops lie inside the detour
/// envelope of the driver-side route, then ranked by how far the subject's
/// pickup sits from the candidate's route.
///
/// # Algorithm Behavior
///
/// 1. Keep candidates of a compatible kind that are active, unexpired and owned by someone else
/// 2. Test the passenger trip's pickup and dropoff against the offer trip's route
/// 3. Score the subject's pickup against the candidate's route (cross-track, along-track)
/// 4. Sort ascending by cross-track, then along-track
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteMatching {
    pub policy: DeviationPolicy,
}

impl RouteMatching {
    pub fn new(policy: DeviationPolicy) -> Self {
        Self { policy }
    }

    pub fn from_config(config: &MatcherConfig) -> Self {
        Self::new(config.deviation)
    }

    fn is_eligible(subject: &Trip, candidate: &Trip, now_ms: u64) -> bool {
        subject.kind.is_compatible_with(candidate.kind)
            && candidate.is_usable(now_ms)
            && candidate.owner != subject.owner
            && candidate.id != subject.id
    }

    /// Check the passenger-side stops against the offer-side route.
    fn check_pairing(&self, subject: &Trip, candidate: &Trip) -> Result<(), Rejection> {
        let (driver, passenger) = if subject.kind.is_driver() {
            (subject, candidate)
        } else {
            (candidate, subject)
        };
        let route = Route::new(driver.pickup.point, driver.dropoff.point);
        check_point(&route, passenger.pickup.point, &self.policy)?;
        check_point(&route, passenger.dropoff.point, &self.policy)?;
        Ok(())
    }

    /// Position is the along-track magnitude; its sign only matters for acceptability.
    fn score<'a>(subject: &Trip, candidate: &'a Trip) -> MatchResult<'a> {
        let route = Route::new(candidate.pickup.point, candidate.dropoff.point);
        let metrics = route.metrics_for(subject.pickup.point);
        trace!(candidate = %candidate.id, ?metrics, "scored candidate");
        MatchResult {
            candidate,
            deviation_km: metrics.cross_track_km,
            position_km: metrics.along_track_km.abs(),
        }
    }
}

impl MatchingAlgorithm for RouteMatching {
    #[tracing::instrument(skip_all, fields(subject = %subject.id, pool = candidates.len()))]
    fn rank_candidates<'a>(
        &self,
        subject: &Trip,
        candidates: &'a [Trip],
        now_ms: u64,
    ) -> Vec<MatchResult<'a>> {
        let mut accepted: Vec<MatchResult<'a>> = candidates
            .iter()
            .filter(|candidate| Self::is_eligible(subject, candidate, now_ms))
            .filter(|candidate| match self.check_pairing(subject, candidate) {
                Ok(()) => true,
                Err(reason) => {
                    debug!(candidate = %candidate.id, ?reason, "candidate rejected");
                    false
                }
            })
            .map(|candidate| Self::score(subject, candidate))
            .collect();

        accepted.sort_by(|a, b| {
            a.deviation_km
                .total_cmp(&b.deviation_km)
                .then_with(|| a.position_km.total_cmp(&b.position_km))
        });
        debug!(accepted = accepted.len(), "ranked candidates");
        accepted
    }
}
