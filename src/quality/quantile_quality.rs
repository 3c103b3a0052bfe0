//! Quality checks for `Summary::estimate_quantile(phi)`.
//!
//! Two styles:
//! 1) **Bound** tests: preset geometries must stay inside their advertised
//!    rank error on every distribution, in exact mode.
//! 2) A **story** printer comparing geometries and modes across all
//!    distributions so you can *see* what moved.

use super::quality_base::{build_summary, gen_dataset, rank_error, DistKind, QualityReport};
use crate::mrl::{Geometry, Summary, SummaryMode};
use crate::MrlResult;

/// Probe grid `1/100 .. 99/100`.
pub fn probe_grid() -> Vec<f64> {
    (1..100).map(|i| i as f64 / 100.0).collect()
}

/// Rank errors over the probe grid. Returns (max, mean).
fn quantile_grid_errors(summary: &Summary, sorted: &[f64]) -> MrlResult<(f64, f64)> {
    let phis = probe_grid();
    let estimates = summary.quantiles(&phis)?;
    let mut max_err = 0.0f64;
    let mut sum = 0.0f64;
    for (&phi, &x) in phis.iter().zip(estimates.iter()) {
        let err = rank_error(sorted, x, phi);
        sum += err;
        max_err = max_err.max(err);
    }
    Ok((max_err, sum / phis.len() as f64))
}

pub fn assess_quantiles_with(
    kind: DistKind,
    n: usize,
    geometry: Geometry,
    mode: SummaryMode,
    seed: u64,
) -> MrlResult<QualityReport> {
    let data = gen_dataset(kind, n, seed);
    let mut sorted = data.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let summary = build_summary(data, geometry, mode, seed)?;
    let (max_err, mean_err) = quantile_grid_errors(&summary, &sorted)?;
    Ok(QualityReport::from_metrics(n, max_err, mean_err))
}
