//! mrl-testdata
//! Seeded synthetic input sequences shared by tests, benches and the experiment runner.
//! Shapes follow the experiment datasets: a wide normal, a two-hump normal mixture,
//! Poisson counts (heavy ties) and a shuffled, unevenly re-sampled linspace.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal, Poisson};

/// Available synthetic distributions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DistKind {
    /// Uniform in \[0,1)
    Uniform,
    /// N(100, 50²)
    Normal,
    /// Half N(50, 10²), half N(10, 20²), concatenated (not interleaved)
    Bimodal,
    /// Poisson counts with rate `lambda`
    Poisson { lambda: f64 },
    /// `linspace(start, end, n)` shuffled, then re-drawn with replacement using
    /// shuffled linear weights, so some values repeat and some vanish
    Shuffled { start: f64, end: f64 },
}

impl DistKind {
    /// Short lowercase name, matching the CLI spelling.
    pub fn name(&self) -> &'static str {
        match self {
            DistKind::Uniform => "uniform",
            DistKind::Normal => "normal",
            DistKind::Bimodal => "bimodal",
            DistKind::Poisson { .. } => "poisson",
            DistKind::Shuffled { .. } => "random",
        }
    }
}

/// `true` when `lambda` is a usable Poisson rate (positive, finite, within
/// the sampler's range).
pub fn poisson_lambda_ok(lambda: f64) -> bool {
    lambda > 0.0 && Poisson::new(lambda).is_ok()
}

/// Generate `n` samples for the chosen distribution.
///
/// Panics on a Poisson rate that [`poisson_lambda_ok`] rejects.
pub fn gen_dataset(kind: DistKind, n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = Vec::with_capacity(n);

    match kind {
        DistKind::Uniform => {
            for _ in 0..n {
                out.push(rng.random::<f64>());
            }
        }
        DistKind::Normal => {
            let normal = Normal::new(100.0, 50.0).unwrap();
            for _ in 0..n {
                out.push(normal.sample(&mut rng));
            }
        }
        DistKind::Bimodal => {
            let first = Normal::new(50.0, 10.0).unwrap();
            let second = Normal::new(10.0, 20.0).unwrap();
            let half = n / 2;
            for _ in 0..half {
                out.push(first.sample(&mut rng));
            }
            for _ in half..n {
                out.push(second.sample(&mut rng));
            }
        }
        DistKind::Poisson { lambda } => {
            let poisson = Poisson::new(lambda.max(f64::MIN_POSITIVE)).unwrap();
            for _ in 0..n {
                out.push(poisson.sample(&mut rng));
            }
        }
        DistKind::Shuffled { start, end } => {
            if n == 0 {
                return out;
            }
            let step = if n > 1 {
                (end - start) / (n - 1) as f64
            } else {
                0.0
            };
            let mut grid: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            grid.shuffle(&mut rng);

            // Linear weights 0..n-1, shuffled, as a running CDF for inverse sampling.
            let mut weights: Vec<f64> = (0..n).map(|i| i as f64).collect();
            weights.shuffle(&mut rng);
            let mut cdf = Vec::with_capacity(n);
            let mut acc = 0.0;
            for w in &weights {
                acc += w;
                cdf.push(acc);
            }
            let total = acc;
            for _ in 0..n {
                let idx = if total > 0.0 {
                    let u = rng.random::<f64>() * total;
                    cdf.partition_point(|&c| c <= u).min(n - 1)
                } else {
                    rng.random_range(0..n)
                };
                out.push(grid[idx]);
            }
        }
    }
    out
}
