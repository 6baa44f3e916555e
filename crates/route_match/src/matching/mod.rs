pub mod algorithm;
pub mod policy;
pub mod route;
pub mod types;

pub use algorithm::MatchingAlgorithm;
pub use policy::{
    check_point, is_point_acceptable, tiered_deviation_fraction, DeviationPolicy, Rejection,
    Route, FIXED_DEVIATION_FRACTION,
};
pub use route::RouteMatching;
pub use types::MatchResult;

/// Boxed matching algorithm shared by services.
pub struct MatchingAlgorithmHandle(pub Box<dyn MatchingAlgorithm>);

impl MatchingAlgorithmHandle {
    pub fn new(algorithm: Box<dyn MatchingAlgorithm>) -> Self {
        Self(algorithm)
    }
}

impl std::ops::Deref for MatchingAlgorithmHandle {
    type Target = dyn MatchingAlgorithm;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}
