use std::time::Duration;

use rand::Rng;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

use crate::probe::ProbeOptions;

/// Bounds of the random pause inserted between two addresses of a batch.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingRange {
    pub min: Duration,
    pub max: Duration,
}

impl Default for PacingRange {
    fn default() -> Self {
        Self {
            min: Duration::from_secs(1),
            max: Duration::from_secs(5),
        }
    }
}

impl PacingRange {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    /// No pause at all; handy for tests and one-off runs.
    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// Draws a delay uniformly in `[min, max]`. An inverted range collapses
    /// to `min`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }
}

/// Settings shared by every stage of a verification run. Built once, then
/// borrowed by the [`Verifier`](crate::verify::Verifier).
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyConfig {
    pub dns_timeout: Duration,
    pub probe: ProbeOptions,
    pub pacing: PacingRange,
}

impl VerifyConfig {
    pub fn new(dns_timeout: Duration, probe: ProbeOptions, pacing: PacingRange) -> Self {
        Self {
            dns_timeout,
            probe,
            pacing,
        }
    }

    /// Default settings: 10 s DNS timeout, port 25 probes with 10 s
    /// timeouts, 1 to 5 s between addresses.
    pub fn standard() -> Self {
        Self::new(
            Duration::from_secs(10),
            ProbeOptions::default(),
            PacingRange::default(),
        )
    }
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self::standard()
    }
}
