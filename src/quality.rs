pub mod quality_base;
pub mod quantile_quality;
pub mod trials;

use crate::mrl::{Geometry, SummaryMode};
use crate::MrlResult;
pub use quality_base::{DistKind, QualityReport};

/// One-shot quality harness: a seeded dataset, a summary over it and the rank
/// error of every probe on the `1/100` grid.
#[derive(Debug, Clone, Copy)]
pub struct Quality {
    pub n: usize,
    pub geometry: Geometry,
    pub mode: SummaryMode,
    pub dist: DistKind,
    pub seed: u64,
}

impl Quality {
    pub fn new(n: usize, geometry: Geometry, seed: u64) -> Self {
        Self {
            n,
            geometry,
            mode: SummaryMode::Exact,
            dist: DistKind::Uniform,
            seed,
        }
    }

    pub fn with_mode(mut self, mode: SummaryMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_dist(mut self, dist: DistKind) -> Self {
        self.dist = dist;
        self
    }

    pub fn run(&self) -> MrlResult<QualityReport> {
        quantile_quality::assess_quantiles_with(self.dist, self.n, self.geometry, self.mode, self.seed)
    }
}

impl QualityReport {
    pub fn strictly_better_than(&self, other: &QualityReport) -> bool {
        let eps = 1e-12;
        (self.max_rank_err <= other.max_rank_err + eps)
            && (self.mean_rank_err <= other.mean_rank_err + eps)
    }

    pub fn log(&self) {
        eprintln!("{}", self.to_line());
    }
}
