//! Sampled NEW: each stored element is one uniform draw from the next `r`
//! unconsumed inputs. Only the drawn element is consumed; the buffer carries
//! weight `r`. The rate grows on every collapse according to [`SamplingPolicy`],
//! up to its `max_rate`.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::mrl::buffer::Fullness;
use crate::mrl::stream::InputStream;
use crate::{MrlError, MrlResult};

/// Default ceiling for the sampling rate.
pub const DEFAULT_MAX_RATE: u64 = 1 << 16;

/// How the sampling rate starts and grows.
///
/// The default starts at 2 and doubles after every collapse, stopping at
/// [`DEFAULT_MAX_RATE`]. Without a ceiling the rate doubles once per collapse
/// and buffer weights leave `u64` after a few dozen collapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingPolicy {
    pub initial_rate: u64,
    pub growth: u64,
    pub max_rate: u64,
}

impl Default for SamplingPolicy {
    fn default() -> Self {
        Self {
            initial_rate: 2,
            growth: 2,
            max_rate: DEFAULT_MAX_RATE,
        }
    }
}

impl SamplingPolicy {
    #[inline]
    pub fn new(initial_rate: u64, growth: u64) -> Self {
        Self {
            initial_rate,
            growth,
            max_rate: DEFAULT_MAX_RATE.max(initial_rate),
        }
    }

    #[inline]
    pub fn with_max_rate(mut self, max_rate: u64) -> Self {
        self.max_rate = max_rate;
        self
    }

    /// A fixed rate that never grows.
    #[inline]
    pub fn constant(rate: u64) -> Self {
        Self::new(rate, 1)
    }

    pub fn validate(&self) -> MrlResult<()> {
        if self.initial_rate == 0 {
            return Err(MrlError::InvalidParameter {
                what: "sampling rate must be >= 1",
            });
        }
        if self.growth == 0 {
            return Err(MrlError::InvalidParameter {
                what: "sampling growth factor must be >= 1",
            });
        }
        if self.max_rate < self.initial_rate {
            return Err(MrlError::InvalidParameter {
                what: "max sampling rate must be >= the initial rate",
            });
        }
        Ok(())
    }

    /// Rate after one more collapse, capped at `max_rate`.
    #[inline]
    pub fn next_rate(&self, rate: u64) -> u64 {
        rate.saturating_mul(self.growth).min(self.max_rate)
    }
}

/// Draw up to `capacity` elements at rate `rate`.
///
/// Stops early if the input runs out; the buffer is then `Partial`.
pub(crate) fn draw_chunk<I, R>(
    input: &mut InputStream<I>,
    rng: &mut R,
    capacity: usize,
    rate: u64,
) -> MrlResult<(Vec<f64>, Fullness)>
where
    I: Iterator<Item = f64>,
    R: Rng,
{
    let window = usize::try_from(rate).unwrap_or(usize::MAX);
    let mut drawn = Vec::with_capacity(capacity);
    while drawn.len() < capacity {
        match input.draw(window, rng)? {
            Some(v) => drawn.push(v),
            None => break,
        }
    }
    let fullness = if drawn.len() == capacity {
        Fullness::Full
    } else {
        Fullness::Partial
    };
    Ok((drawn, fullness))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn default_policy_doubles() {
        let p = SamplingPolicy::default();
        assert_eq!(p.initial_rate, 2);
        assert_eq!(p.next_rate(2), 4);
        assert_eq!(p.next_rate(DEFAULT_MAX_RATE / 2), DEFAULT_MAX_RATE);
        assert_eq!(p.next_rate(DEFAULT_MAX_RATE), DEFAULT_MAX_RATE);
        assert_eq!(SamplingPolicy::constant(3).next_rate(3), 3);

        let capped = SamplingPolicy::new(2, 10).with_max_rate(50);
        assert_eq!(capped.next_rate(2), 20);
        assert_eq!(capped.next_rate(20), 50);
        assert_eq!(SamplingPolicy::new(1, 2).with_max_rate(u64::MAX).next_rate(u64::MAX), u64::MAX);
    }

    #[test]
    fn zero_rate_or_growth_is_invalid() {
        assert!(SamplingPolicy::new(0, 2).validate().is_err());
        assert!(SamplingPolicy::new(2, 0).validate().is_err());
        assert!(SamplingPolicy::new(1, 1).validate().is_ok());
        assert!(SamplingPolicy::new(8, 2).with_max_rate(4).validate().is_err());
    }

    #[test]
    fn serde_defaults_missing_fields() {
        let p: SamplingPolicy = serde_json::from_str(r#"{"initial_rate": 5}"#).unwrap();
        assert_eq!(p, SamplingPolicy::new(5, 2));
        let p: SamplingPolicy = serde_json::from_str(r#"{"max_rate": 64}"#).unwrap();
        assert_eq!(p, SamplingPolicy::default().with_max_rate(64));
    }

    #[test]
    fn full_chunk_then_partial_tail() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut input = InputStream::from_vec((0..10).map(|x| x as f64).collect());

        let (a, fa) = draw_chunk(&mut input, &mut rng, 3, 2).unwrap();
        assert_eq!(a.len(), 3);
        assert_eq!(fa, Fullness::Full);
        // every pick came from a window of 2 over what was left
        assert!(a.iter().all(|x| (0.0..10.0).contains(x)));

        let (b, fb) = draw_chunk(&mut input, &mut rng, 10, 2).unwrap();
        assert_eq!(b.len(), 7);
        assert_eq!(fb, Fullness::Partial);
        assert!(input.is_exhausted().unwrap());
    }

    #[test]
    fn rate_one_is_exact_order() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut input = InputStream::from_vec(vec![4.0, 3.0, 2.0]);
        let (v, f) = draw_chunk(&mut input, &mut rng, 3, 1).unwrap();
        assert_eq!(v, vec![4.0, 3.0, 2.0]);
        assert_eq!(f, Fullness::Full);
    }
}
