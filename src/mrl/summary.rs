// src/mrl/summary.rs
use crate::mrl::buffer::Buffer;
use crate::mrl::engine::{Engine, EngineStats};
use crate::mrl::options::{SummaryMode, SummaryOptions};
use crate::mrl::output::{finite_near, merge_final, output_position, phi_tick, validate_phi};
use crate::mrl::scheduler::Scheduler;
use crate::{MrlError, MrlResult};

/// One-pass approximate quantile summary over a finite input sequence.
///
/// Build it with a geometry (`capacity` elements per buffer, `buffers` slots)
/// and a mode, feed it once with [`Summary::consume`], then query any number
/// of quantiles. Queries never change the summary.
///
/// ```
/// use mrl_quantiles::{Summary, SummaryMode};
///
/// let data: Vec<f64> = (1..=10_000).map(|x| x as f64).collect();
/// let s = Summary::new(100, 5, SummaryMode::Exact)?.consume(data)?;
/// let median = s.median()?;
/// assert!((median - 5_000.0).abs() < 500.0);
/// # Ok::<(), mrl_quantiles::MrlError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Summary {
    options: SummaryOptions,
    scheduler: Scheduler,
    stats: Option<EngineStats>,
}

/// Same as [`Summary::new`].
#[inline]
pub fn new_summary(capacity: usize, buffer_count: usize, mode: SummaryMode) -> MrlResult<Summary> {
    Summary::new(capacity, buffer_count, mode)
}

impl Summary {
    pub fn new(capacity: usize, buffer_count: usize, mode: SummaryMode) -> MrlResult<Self> {
        Self::with_options(SummaryOptions {
            capacity,
            buffers: buffer_count,
            mode,
            ..SummaryOptions::default()
        })
    }

    pub fn with_options(options: SummaryOptions) -> MrlResult<Self> {
        options.validate()?;
        Ok(Self {
            scheduler: Scheduler::new(options.capacity, options.buffers, options.mode)?,
            options,
            stats: None,
        })
    }

    #[inline]
    pub fn builder() -> SummaryBuilder {
        SummaryBuilder::default()
    }

    /* =============================================================================
     * Consume
     * ============================================================================= */

    /// Run the scheduler over `input` until it is exhausted.
    ///
    /// A summary consumes exactly one sequence: a second call is a
    /// `PreconditionViolation`, an empty input is `ExhaustedInput`, and any
    /// NaN or infinite value is `NonFiniteInput`.
    pub fn consume<T>(mut self, input: T) -> MrlResult<Self>
    where
        T: IntoIterator<Item = f64>,
    {
        if self.stats.is_some() {
            return Err(MrlError::PreconditionViolation {
                what: "summary already consumed its input",
            });
        }
        let mut engine = Engine::new(self.options.capacity, input.into_iter(), self.options.seed)?;
        if engine.is_exhausted()? {
            return Err(MrlError::ExhaustedInput);
        }
        self.scheduler.run(&mut engine)?;
        let stats = engine.stats();
        log::debug!(
            "consumed {} values (k={}, b={}, {:?}): {} sentinels, beta {:.6}",
            stats.input_len,
            self.options.capacity,
            self.options.buffers,
            self.options.mode,
            stats.infs_added,
            stats.beta()
        );
        self.stats = Some(stats);
        Ok(self)
    }

    /* =============================================================================
     * Queries
     * ============================================================================= */

    /// Approximate φ-quantile of the consumed input. Never a sentinel.
    pub fn estimate_quantile(&self, phi: f64) -> MrlResult<f64> {
        validate_phi(phi)?;
        let merged = self.merged()?;
        self.pick(&merged, phi)
    }

    /// Several quantiles off a single merge.
    pub fn quantiles(&self, phis: &[f64]) -> MrlResult<Vec<f64>> {
        for &phi in phis {
            validate_phi(phi)?;
        }
        let merged = self.merged()?;
        phis.iter().map(|&phi| self.pick(&merged, phi)).collect()
    }

    #[inline]
    pub fn median(&self) -> MrlResult<f64> {
        self.estimate_quantile(0.5)
    }

    /// The final merged buffer `Y` (sorted, sentinels included) built from a
    /// copy of the pool's Full buffers.
    pub fn merged(&self) -> MrlResult<Buffer> {
        if self.stats.is_none() {
            return Err(MrlError::PreconditionViolation {
                what: "estimate before consume",
            });
        }
        let mut full: Vec<Buffer> = self
            .scheduler
            .buffers()
            .iter()
            .filter(|b| b.is_full())
            .cloned()
            .collect();
        {
            let mut refs: Vec<&mut Buffer> = full.iter_mut().collect();
            merge_final(self.options.capacity, &mut refs)?;
        }
        full.into_iter().next().ok_or(MrlError::PreconditionViolation {
            what: "no Full buffer to merge",
        })
    }

    fn pick(&self, merged: &Buffer, phi: f64) -> MrlResult<f64> {
        let pos = output_position(phi_tick(phi, self.beta()), self.options.capacity);
        finite_near(merged.elements(), pos).ok_or(MrlError::PreconditionViolation {
            what: "merged buffer holds no finite element",
        })
    }

    /* =============================================================================
     * Introspection
     * ============================================================================= */

    #[inline]
    pub fn beta(&self) -> f64 {
        self.stats.map_or(1.0, |s| s.beta())
    }
    #[inline]
    pub fn infs_added(&self) -> u64 {
        self.stats.map_or(0, |s| s.infs_added)
    }
    #[inline]
    pub fn input_len(&self) -> u64 {
        self.stats.map_or(0, |s| s.input_len)
    }
    #[inline]
    pub fn stats(&self) -> Option<EngineStats> {
        self.stats
    }
    #[inline]
    pub fn is_consumed(&self) -> bool {
        self.stats.is_some()
    }
    #[inline]
    pub fn buffers(&self) -> &[Buffer] {
        self.scheduler.buffers()
    }
    #[inline]
    pub fn levels(&self) -> Vec<Option<u32>> {
        self.scheduler.levels()
    }
    #[inline]
    pub fn collapses(&self) -> u64 {
        self.scheduler.collapses()
    }
    #[inline]
    pub fn options(&self) -> &SummaryOptions {
        &self.options
    }
}

/* =============================================================================
 * Builder
 * ============================================================================= */

/// Builder for [`Summary`]; starts from [`SummaryOptions::default`].
#[derive(Debug, Clone, Default)]
pub struct SummaryBuilder {
    options: SummaryOptions,
}

impl SummaryBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Elements per buffer (`k`).
    #[inline]
    pub fn capacity(mut self, k: usize) -> Self {
        self.options.capacity = k;
        self
    }

    /// Number of buffers (`b`).
    #[inline]
    pub fn buffers(mut self, b: usize) -> Self {
        self.options.buffers = b;
        self
    }

    #[inline]
    pub fn mode(mut self, mode: SummaryMode) -> Self {
        self.options.mode = mode;
        self
    }

    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.options.seed = seed;
        self
    }

    /// Replace everything set so far.
    #[inline]
    pub fn options(mut self, options: SummaryOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> MrlResult<Summary> {
        Summary::with_options(self.options)
    }
}
