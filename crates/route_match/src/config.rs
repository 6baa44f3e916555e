use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::matching::DeviationPolicy;

/// Default average driving speed used to estimate trip duration (km/h).
const DEFAULT_AVG_SPEED_KMH: f64 = 40.0;

/// Default slack after the estimated arrival before a trip expires: 30 minutes.
const DEFAULT_GRACE_MS: u64 = 30 * 60 * 1000;

/// Minimum estimated travel time: 1 second.
const MIN_TRAVEL_MS: f64 = 1_000.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse matcher config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("deviation fraction must be in (0, 1], got {0}")]
    InvalidDeviationFraction(f64),
    #[error("average speed must be positive, got {0} km/h")]
    InvalidAverageSpeed(f64),
}

/// How long a trip stays open after it is created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpiryPolicy {
    /// Speed used to turn the pickup→dropoff distance into a travel time.
    pub avg_speed_kmh: f64,
    /// Extra time after the estimated arrival.
    pub grace_ms: u64,
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        Self {
            avg_speed_kmh: DEFAULT_AVG_SPEED_KMH,
            grace_ms: DEFAULT_GRACE_MS,
        }
    }
}

impl ExpiryPolicy {
    /// Estimated time to drive `distance_km` at the configured speed.
    pub fn travel_ms(&self, distance_km: f64) -> u64 {
        if distance_km <= 0.0 {
            return MIN_TRAVEL_MS as u64;
        }
        ((distance_km / self.avg_speed_kmh) * 3_600_000.0).max(MIN_TRAVEL_MS) as u64
    }

    /// Expiry timestamp for a trip departing at `departure_ms` over `distance_km`.
    pub fn expires_at_ms(&self, departure_ms: u64, distance_km: f64) -> u64 {
        departure_ms
            .saturating_add(self.travel_ms(distance_km))
            .saturating_add(self.grace_ms)
    }
}

/// Matcher configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    pub deviation: DeviationPolicy,
    pub expiry: ExpiryPolicy,
}

impl MatcherConfig {
    pub fn with_deviation(mut self, deviation: DeviationPolicy) -> Self {
        self.deviation = deviation;
        self
    }

    pub fn with_expiry(mut self, expiry: ExpiryPolicy) -> Self {
        self.expiry = expiry;
        self
    }

    /// Parse a JSON document; missing fields fall back to their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let DeviationPolicy::Fixed { fraction } = self.deviation {
            if !(fraction > 0.0 && fraction <= 1.0) {
                return Err(ConfigError::InvalidDeviationFraction(fraction));
            }
        }
        let speed = self.expiry.avg_speed_kmh;
        if !(speed.is_finite() && speed > 0.0) {
            return Err(ConfigError::InvalidAverageSpeed(speed));
        }
        Ok(())
    }
}
