// src/mrl/engine.rs
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::mrl::buffer::{Buffer, Fullness};
use crate::mrl::collapse::collapse;
use crate::mrl::output::output;
use crate::mrl::sampling::draw_chunk;
use crate::mrl::stream::InputStream;
use crate::{MrlError, MrlResult};

/// Which NEW to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillMode {
    /// Next `capacity` inputs in order, weight 1, sentinel padding at the end.
    Exact,
    /// One uniform draw out of every window of `rate` inputs, weight `rate`.
    Sampled { rate: u64 },
}

/// Counters the engine keeps while consuming input.
///
/// Weighted counts (`real_weight`, `sentinel_weight`) are what beta is made
/// of; for exact fills they equal `input_len` and `infs_added`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineStats {
    pub input_len: u64,
    pub infs_added: u64,
    pub real_weight: u64,
    pub sentinel_weight: u64,
}

impl EngineStats {
    /// `(real + sentinel weight) / real weight`; 1 before anything was consumed.
    #[inline]
    pub fn beta(&self) -> f64 {
        if self.real_weight == 0 {
            return 1.0;
        }
        (self.real_weight + self.sentinel_weight) as f64 / self.real_weight as f64
    }
}

/// NEW / COLLAPSE / OUTPUT bound to one input sequence.
///
/// The engine owns the unconsumed input, the sampling RNG and the running
/// counters. Buffers are passed in by the caller (normally the scheduler's
/// pool), so the same engine can drive any slot.
#[derive(Debug)]
pub struct Engine<I: Iterator<Item = f64>> {
    capacity: usize,
    input: InputStream<I>,
    rng: StdRng,
    stats: EngineStats,
}

impl Engine<std::vec::IntoIter<f64>> {
    /// Engine over an in-memory sequence.
    pub fn from_vec(capacity: usize, values: Vec<f64>, seed: u64) -> MrlResult<Self> {
        Self::new(capacity, values.into_iter(), seed)
    }
}

impl<I: Iterator<Item = f64>> Engine<I> {
    pub fn new(capacity: usize, input: I, seed: u64) -> MrlResult<Self> {
        if capacity == 0 {
            return Err(MrlError::InvalidParameter {
                what: "capacity must be >= 1",
            });
        }
        Ok(Self {
            capacity,
            input: InputStream::new(input),
            rng: StdRng::seed_from_u64(seed),
            stats: EngineStats::default(),
        })
    }

    /* =============================================================================
     * NEW
     * ============================================================================= */

    /// Run the requested NEW on an Empty buffer.
    pub fn fill(&mut self, buffer: &mut Buffer, mode: FillMode) -> MrlResult<()> {
        match mode {
            FillMode::Exact => self.new_exact(buffer),
            FillMode::Sampled { rate } => self.new_sampled(buffer, rate),
        }
    }

    /// Exact NEW: the next `capacity` inputs, weight 1, always Full.
    ///
    /// A short final chunk is padded with equal numbers of `+inf` and `-inf`
    /// (deficit rounded up to even), so the buffer may end up one element
    /// over capacity.
    pub fn new_exact(&mut self, buffer: &mut Buffer) -> MrlResult<()> {
        self.check_fillable(buffer)?;
        let mut elements = self.input.take_up_to(self.capacity)?;
        self.stats.input_len += elements.len() as u64;
        self.stats.real_weight += elements.len() as u64;
        self.pad_with_sentinels(&mut elements, 1);
        buffer.populate(elements, 1, Fullness::Full);
        Ok(())
    }

    /// Sampled NEW at rate `rate`. Full when `capacity` draws were made,
    /// Partial when the input ran out first.
    pub fn new_sampled(&mut self, buffer: &mut Buffer, rate: u64) -> MrlResult<()> {
        if rate == 0 {
            return Err(MrlError::InvalidParameter {
                what: "sampling rate must be >= 1",
            });
        }
        self.check_fillable(buffer)?;
        let (elements, fullness) =
            draw_chunk(&mut self.input, &mut self.rng, self.capacity, rate)?;
        let n = elements.len() as u64;
        self.stats.input_len += n;
        self.stats.real_weight = self.stats.real_weight.saturating_add(n.saturating_mul(rate));
        buffer.populate(elements, rate, fullness);
        Ok(())
    }

    /// Turn a Partial buffer into a Full one with balanced sentinel padding
    /// at the buffer's weight. Full buffers are left alone.
    pub fn seal(&mut self, buffer: &mut Buffer) -> MrlResult<()> {
        match buffer.fullness() {
            Fullness::Full => Ok(()),
            Fullness::Empty => Err(MrlError::PreconditionViolation {
                what: "cannot seal an Empty buffer",
            }),
            Fullness::Partial => {
                let weight = buffer.weight();
                let mut elements = buffer.elements().to_vec();
                self.pad_with_sentinels(&mut elements, weight);
                buffer.populate(elements, weight, Fullness::Full);
                Ok(())
            }
        }
    }

    fn check_fillable(&mut self, buffer: &Buffer) -> MrlResult<()> {
        if !buffer.is_empty() {
            return Err(MrlError::PreconditionViolation {
                what: "NEW needs an Empty buffer",
            });
        }
        if self.input.is_exhausted()? {
            return Err(MrlError::ExhaustedInput);
        }
        Ok(())
    }

    fn pad_with_sentinels(&mut self, elements: &mut Vec<f64>, weight: u64) {
        let deficit = self.capacity.saturating_sub(elements.len());
        if deficit == 0 {
            return;
        }
        let half = deficit.div_ceil(2);
        elements.extend(std::iter::repeat(f64::INFINITY).take(half));
        elements.extend(std::iter::repeat(f64::NEG_INFINITY).take(half));

        let added = 2 * half as u64;
        self.stats.infs_added += added;
        self.stats.sentinel_weight = self
            .stats
            .sentinel_weight
            .saturating_add(added.saturating_mul(weight));
        log::debug!(
            "padding: {} sentinels (deficit {}), beta now {:.6}",
            added,
            deficit,
            self.stats.beta()
        );
    }

    /* =============================================================================
     * COLLAPSE / OUTPUT
     * ============================================================================= */

    /// COLLAPSE at this engine's capacity; the result lands in `buffers[0]`.
    #[inline]
    pub fn collapse(&self, buffers: &mut [&mut Buffer]) -> MrlResult<()> {
        collapse(self.capacity, buffers)
    }

    /// OUTPUT with the current beta. Merges `buffers` in place.
    #[inline]
    pub fn output(&self, phi: f64, buffers: &mut [&mut Buffer]) -> MrlResult<f64> {
        output(phi, self.stats.beta(), self.capacity, buffers)
    }

    /* =============================================================================
     * Accessors
     * ============================================================================= */

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
    #[inline]
    pub fn beta(&self) -> f64 {
        self.stats.beta()
    }
    #[inline]
    pub fn infs_added(&self) -> u64 {
        self.stats.infs_added
    }
    #[inline]
    pub fn stats(&self) -> EngineStats {
        self.stats
    }
    #[inline]
    pub fn is_exhausted(&mut self) -> MrlResult<bool> {
        self.input.is_exhausted()
    }

    /// The unconsumed suffix of the input.
    pub fn into_remaining(self) -> Vec<f64> {
        self.input.into_remaining()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mrl::test_helpers::assert_exact;

    const INF: f64 = f64::INFINITY;

    #[test]
    fn new_takes_a_prefix() {
        let mut engine = Engine::from_vec(3, vec![1.0, 2.0, 3.0, 4.0, 5.0], 0).unwrap();
        let mut b = Buffer::new(3);
        engine.new_exact(&mut b).unwrap();

        assert_eq!(b.elements(), &[1.0, 2.0, 3.0]);
        assert!(b.is_full());
        assert_eq!(b.weight(), 1);
        assert_eq!(engine.infs_added(), 0);
        assert_exact("beta", 1.0, engine.beta());
        assert_eq!(engine.into_remaining(), vec![4.0, 5.0]);
    }

    #[test]
    fn odd_deficit_pads_one_over_capacity() {
        let mut engine = Engine::from_vec(4, vec![1.0, 2.0, 3.0], 0).unwrap();
        let mut b = Buffer::new(4);
        engine.new_exact(&mut b).unwrap();

        assert_eq!(b.elements(), &[1.0, 2.0, 3.0, INF, -INF]);
        assert!(b.is_full());
        assert_eq!(engine.infs_added(), 2);
        assert_eq!(b.sentinel_counts(), (1, 1));
        assert_exact("beta", 5.0 / 3.0, engine.beta());
    }

    #[test]
    fn even_deficit_pads_to_capacity() {
        let mut engine = Engine::from_vec(5, vec![7.0, 8.0, 9.0], 0).unwrap();
        let mut b = Buffer::new(5);
        engine.new_exact(&mut b).unwrap();
        assert_eq!(b.elements(), &[7.0, 8.0, 9.0, INF, -INF]);
        assert_eq!(engine.infs_added(), 2);
    }

    #[test]
    fn new_preconditions() {
        let mut engine = Engine::from_vec(2, vec![1.0, 2.0], 0).unwrap();
        let mut b = Buffer::new(2);
        engine.new_exact(&mut b).unwrap();
        assert!(matches!(
            engine.new_exact(&mut b),
            Err(MrlError::PreconditionViolation { .. })
        ));
        let mut fresh = Buffer::new(2);
        assert_eq!(engine.new_exact(&mut fresh), Err(MrlError::ExhaustedInput));
        assert!(fresh.is_empty());

        let mut bad = Engine::from_vec(2, vec![1.0, f64::NAN], 0).unwrap();
        assert!(matches!(
            bad.new_exact(&mut fresh),
            Err(MrlError::NonFiniteInput { .. })
        ));
        assert!(Engine::from_vec(0, vec![1.0], 0).is_err());
    }

    #[test]
    fn sampled_fill_weights_by_rate() {
        let values: Vec<f64> = (0..20).map(|x| x as f64).collect();
        let mut engine = Engine::from_vec(4, values, 3).unwrap();
        let mut b = Buffer::new(4);
        engine.fill(&mut b, FillMode::Sampled { rate: 3 }).unwrap();

        assert!(b.is_full());
        assert_eq!(b.weight(), 3);
        assert_eq!(b.len(), 4);
        let stats = engine.stats();
        assert_eq!(stats.input_len, 4);
        assert_eq!(stats.real_weight, 12);
        assert_exact("beta", 1.0, stats.beta());
        assert_eq!(engine.into_remaining().len(), 16);

        let mut engine = Engine::from_vec(4, vec![1.0], 0).unwrap();
        let mut b = Buffer::new(4);
        assert!(matches!(
            engine.new_sampled(&mut b, 0),
            Err(MrlError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn seal_pads_partial_at_its_weight() {
        let mut engine = Engine::from_vec(4, vec![1.0, 2.0, 3.0], 5).unwrap();
        let mut b = Buffer::new(4);
        engine.new_sampled(&mut b, 2).unwrap();
        assert_eq!(b.fullness(), Fullness::Partial);
        assert_eq!(b.len(), 3);

        engine.seal(&mut b).unwrap();
        assert!(b.is_full());
        assert_eq!(b.len(), 5);
        assert_eq!(b.sentinel_counts(), (1, 1));
        let stats = engine.stats();
        assert_eq!(stats.real_weight, 6);
        assert_eq!(stats.sentinel_weight, 4);
        assert_exact("beta", 10.0 / 6.0, stats.beta());
    }

    #[test]
    fn engine_collapse_and_output() {
        let values: Vec<f64> = (1..=6).map(|x| x as f64).collect();
        let mut engine = Engine::from_vec(3, values, 0).unwrap();
        let mut pool = vec![Buffer::new(3), Buffer::new(3)];
        for b in pool.iter_mut() {
            engine.new_exact(b).unwrap();
        }
        let mut refs: Vec<&mut Buffer> = pool.iter_mut().collect();
        // Y = [1, 3, 5, +inf]
        assert_exact("median", 3.0, engine.output(0.5, &mut refs).unwrap());
        assert_eq!(pool[0].weight(), 2);
        assert!(pool[1].is_empty());
    }
}
