use serde::{Deserialize, Serialize};

use crate::mrl::sampling::SamplingPolicy;
use crate::{MrlError, MrlResult};

/// Exact (deterministic) or sampled summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SummaryMode {
    #[default]
    Exact,
    Sampled(SamplingPolicy),
}

impl SummaryMode {
    /// Level assigned to buffers filled while two or more slots are Empty.
    #[inline]
    pub fn base_level(&self) -> u32 {
        match self {
            SummaryMode::Exact => 0,
            SummaryMode::Sampled(_) => 1,
        }
    }

    #[inline]
    pub fn is_sampled(&self) -> bool {
        matches!(self, SummaryMode::Sampled(_))
    }
}

/// Geometry and mode of a summary. Loadable from JSON; missing fields fall
/// back to [`Default`].
///
/// ```json
/// { "capacity": 217, "buffers": 7, "mode": { "kind": "sampled", "initial_rate": 2 }, "seed": 1 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryOptions {
    /// Elements per buffer (`k`).
    pub capacity: usize,
    /// Buffer count (`b`).
    pub buffers: usize,
    pub mode: SummaryMode,
    /// RNG seed for the sampled fill.
    pub seed: u64,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            capacity: 1000,
            buffers: 5,
            mode: SummaryMode::Exact,
            seed: 0,
        }
    }
}

impl SummaryOptions {
    pub fn validate(&self) -> MrlResult<()> {
        if self.capacity == 0 {
            return Err(MrlError::InvalidParameter {
                what: "capacity must be >= 1",
            });
        }
        if self.buffers < 2 {
            return Err(MrlError::InvalidParameter {
                what: "buffer count must be >= 2",
            });
        }
        if let SummaryMode::Sampled(policy) = self.mode {
            policy.validate()?;
        }
        Ok(())
    }
}
