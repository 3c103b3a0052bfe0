use crate::mrl::{Geometry, Summary, SummaryMode};
use crate::MrlResult;

pub use testdata::{gen_dataset, DistKind};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityReport {
    pub n: usize,
    /// Worst rank error over the probe grid.
    pub max_rank_err: f64,
    /// Mean rank error over the probe grid.
    pub mean_rank_err: f64,
    /// A single scalar for rough comparison (higher is better).
    pub score: f64,
}

impl QualityReport {
    #[inline]
    pub fn from_metrics(n: usize, max_rank_err: f64, mean_rank_err: f64) -> Self {
        // Same heuristic everywhere so numbers are comparable.
        let score = (-((100.0 * mean_rank_err) + (20.0 * max_rank_err))).exp();
        QualityReport {
            n,
            max_rank_err,
            mean_rank_err,
            score,
        }
    }

    pub fn to_line(&self) -> String {
        format!(
            "QualityReport(n={}, max_rank_err={:.6e}, mean_rank_err={:.6e}, score={:.3})",
            self.n, self.max_rank_err, self.mean_rank_err, self.score
        )
    }
}

/// Pretty banner for section headings in story-style tests.
pub fn print_banner(title: &str) {
    println!();
    println!("═══════════════════════════════════════════════════════════════════════════");
    println!("{title}");
    println!("═══════════════════════════════════════════════════════════════════════════");
    println!();
}

/// Subsection header (indented a touch) for size/mode groups.
pub fn print_section(title: &str) {
    println!("  ── {title} ────────────────────────────────────────────");
}

/// Small, shared print helper used in tests/benches.
pub fn print_report(tag: &str, r: QualityReport) {
    println!("{} -> {}", tag, r.to_line());
}

/// Interpolate between order statistics to get the exact value at quantile `q`
/// (the "linear" rule: position `q * (n - 1)`).
pub fn expected_quantile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if q <= 0.0 {
        return sorted[0];
    }
    if q >= 1.0 {
        return sorted[n - 1];
    }
    let t = q * (n as f64 - 1.0);
    let lo = t.floor() as usize;
    let hi = t.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let alpha = t - lo as f64;
        (1.0 - alpha) * sorted[lo] + alpha * sorted[hi]
    }
}

/// Fractional rank interval `[#(< x), #(<= x)] / n` of `x` in ascending `sorted`.
pub fn rank_bounds(sorted: &[f64], x: f64) -> (f64, f64) {
    let n = sorted.len() as f64;
    if sorted.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let below = sorted.partition_point(|v| *v < x) as f64;
    let at_or_below = sorted.partition_point(|v| *v <= x) as f64;
    (below / n, at_or_below / n)
}

/// Distance from `phi` to the rank interval of `x` (0 when `phi` falls inside).
pub fn rank_error(sorted: &[f64], x: f64, phi: f64) -> f64 {
    let (lo, hi) = rank_bounds(sorted, x);
    if phi < lo {
        lo - phi
    } else if phi > hi {
        phi - hi
    } else {
        0.0
    }
}

/// Summary over `data` with the given geometry and mode.
pub fn build_summary(
    data: Vec<f64>,
    geometry: Geometry,
    mode: SummaryMode,
    seed: u64,
) -> MrlResult<Summary> {
    Summary::builder()
        .capacity(geometry.capacity)
        .buffers(geometry.buffers)
        .mode(mode)
        .seed(seed)
        .build()?
        .consume(data)
}
