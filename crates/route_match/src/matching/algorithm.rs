use crate::trip::Trip;

use super::types::MatchResult;

/// Trait for algorithms that pair a subject trip with one trip from a candidate pool.
pub trait MatchingAlgorithm: Send + Sync {
    /// Every acceptable candidate, best first.
    ///
    /// `candidates` is a snapshot taken by the caller; `now_ms` decides expiry.
    fn rank_candidates<'a>(
        &self,
        subject: &Trip,
        candidates: &'a [Trip],
        now_ms: u64,
    ) -> Vec<MatchResult<'a>>;

    /// The single best candidate, or `None` when nothing is acceptable.
    fn find_match<'a>(
        &self,
        subject: &Trip,
        candidates: &'a [Trip],
        now_ms: u64,
    ) -> Option<MatchResult<'a>> {
        self.rank_candidates(subject, candidates, now_ms)
            .into_iter()
            .next()
    }
}
