//! Repeated-trial experiments: summaries built over fresh synthetic datasets,
//! compared against the exact quantile of each dataset.
//!
//! Trials are independent (own dataset, own summary, own seed), so they run
//! in parallel on the rayon pool.

use rayon::prelude::*;
use statrs::distribution::{ContinuousCDF, StudentsT};

use super::quality_base::{build_summary, expected_quantile, gen_dataset, rank_error, DistKind};
use crate::mrl::output::validate_phi;
use crate::mrl::{Geometry, SummaryMode};
use crate::{MrlError, MrlResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialConfig {
    pub dist: DistKind,
    pub n: usize,
    pub geometry: Geometry,
    pub mode: SummaryMode,
    pub phi: f64,
    pub runs: usize,
    /// Trial `i` uses `seed + i` for both its dataset and its summary.
    pub seed: u64,
}

/// Outcome of one trial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trial {
    pub estimate: f64,
    pub exact: f64,
    pub rank_err: f64,
}

/// Welch's unequal-variance two-sample t-test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WelchTest {
    pub t: f64,
    pub df: f64,
    /// Two-sided.
    pub p_value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrialSummary {
    pub trials: Vec<Trial>,
    pub mean_estimate: f64,
    pub mean_exact: f64,
    pub max_rank_err: f64,
    pub mean_rank_err: f64,
    /// `None` with fewer than two runs or when both samples are constant.
    pub welch: Option<WelchTest>,
}

pub fn run_trial(cfg: &TrialConfig, index: usize) -> MrlResult<Trial> {
    let seed = cfg.seed.wrapping_add(index as u64);
    let data = gen_dataset(cfg.dist, cfg.n, seed);
    let mut sorted = data.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let summary = build_summary(data, cfg.geometry, cfg.mode, seed)?;
    let estimate = summary.estimate_quantile(cfg.phi)?;
    Ok(Trial {
        estimate,
        exact: expected_quantile(&sorted, cfg.phi),
        rank_err: rank_error(&sorted, estimate, cfg.phi),
    })
}

pub fn run_trials(cfg: &TrialConfig) -> MrlResult<TrialSummary> {
    validate_phi(cfg.phi)?;
    if cfg.runs == 0 {
        return Err(MrlError::InvalidParameter {
            what: "runs must be >= 1",
        });
    }
    let trials = (0..cfg.runs)
        .into_par_iter()
        .map(|i| run_trial(cfg, i))
        .collect::<MrlResult<Vec<Trial>>>()?;

    let estimates: Vec<f64> = trials.iter().map(|t| t.estimate).collect();
    let exact: Vec<f64> = trials.iter().map(|t| t.exact).collect();
    let errs: Vec<f64> = trials.iter().map(|t| t.rank_err).collect();
    log::debug!(
        "{} trials of {} ({} values, b={}, k={})",
        cfg.runs,
        cfg.dist.name(),
        cfg.n,
        cfg.geometry.buffers,
        cfg.geometry.capacity
    );

    Ok(TrialSummary {
        mean_estimate: mean(&estimates),
        mean_exact: mean(&exact),
        max_rank_err: errs.iter().copied().fold(0.0, f64::max),
        mean_rank_err: mean(&errs),
        welch: welch_t_test(&estimates, &exact),
        trials,
    })
}

/* ----------------------- statistics ----------------------- */

pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return f64::NAN;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Unbiased sample variance (`n - 1` denominator).
pub fn sample_variance(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return f64::NAN;
    }
    let m = mean(xs);
    xs.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / (xs.len() - 1) as f64
}

pub fn welch_t_test(a: &[f64], b: &[f64]) -> Option<WelchTest> {
    if a.len() < 2 || b.len() < 2 {
        return None;
    }
    let (na, nb) = (a.len() as f64, b.len() as f64);
    let (sa, sb) = (sample_variance(a) / na, sample_variance(b) / nb);
    let se2 = sa + sb;
    if se2 <= 0.0 || !se2.is_finite() {
        return None;
    }
    let t = (mean(a) - mean(b)) / se2.sqrt();
    let df = se2 * se2 / (sa * sa / (na - 1.0) + sb * sb / (nb - 1.0));
    Some(WelchTest {
        t,
        df,
        p_value: student_t_two_sided(t, df)?,
    })
}

/// `P(|T| >= |t|)` for Student's t with `df` degrees of freedom.
fn student_t_two_sided(t: f64, df: f64) -> Option<f64> {
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    Some((2.0 * dist.sf(t.abs())).min(1.0))
}
