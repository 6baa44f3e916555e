use crate::trip::Trip;

/// A candidate that passed the acceptability checks, with its ranking scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchResult<'a> {
    pub candidate: &'a Trip,
    /// Cross-track distance of the subject's pickup from the candidate's route (km).
    pub deviation_km: f64,
    /// Along-track distance of that pickup from the candidate's origin (km).
    pub position_km: f64,
}
