//! The unconsumed input suffix.
//!
//! Backed by any iterator of `f64` plus a small lookahead window, so the
//! summary never needs the whole sequence in memory. The window only grows to
//! the current sampling rate `r` (one element for exact fills).

use std::collections::VecDeque;

use rand::Rng;

use crate::{MrlError, MrlResult};

#[inline]
fn ensure_finite(v: f64) -> MrlResult<f64> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(MrlError::NonFiniteInput {
            context: "input value",
        })
    }
}

#[derive(Debug)]
pub struct InputStream<I: Iterator<Item = f64>> {
    source: I,
    lookahead: VecDeque<f64>,
    consumed: u64,
}

impl InputStream<std::vec::IntoIter<f64>> {
    /// Convenience for an already materialised sequence.
    pub fn from_vec(values: Vec<f64>) -> Self {
        Self::new(values.into_iter())
    }
}

impl<I: Iterator<Item = f64>> InputStream<I> {
    pub fn new(source: I) -> Self {
        Self {
            source,
            lookahead: VecDeque::new(),
            consumed: 0,
        }
    }

    /// Pull from the source until the window holds `n` elements or the source
    /// runs dry. Returns how many elements the window holds afterwards.
    fn fill_window(&mut self, n: usize) -> MrlResult<usize> {
        while self.lookahead.len() < n {
            match self.source.next() {
                Some(v) => self.lookahead.push_back(ensure_finite(v)?),
                None => break,
            }
        }
        Ok(self.lookahead.len())
    }

    /// `true` once every element has been consumed.
    pub fn is_exhausted(&mut self) -> MrlResult<bool> {
        Ok(self.fill_window(1)? == 0)
    }

    /// Consume the next `n` elements in order (fewer if the input runs out).
    pub fn take_up_to(&mut self, n: usize) -> MrlResult<Vec<f64>> {
        let mut out = Vec::with_capacity(n);
        while out.len() < n {
            if let Some(v) = self.lookahead.pop_front() {
                out.push(v);
                continue;
            }
            match self.source.next() {
                Some(v) => out.push(ensure_finite(v)?),
                None => break,
            }
        }
        self.consumed += out.len() as u64;
        Ok(out)
    }

    /// Consume one element chosen uniformly from the next `min(r, remaining)`
    /// elements. The others stay available for later draws, though their
    /// order inside the window may change.
    ///
    /// `None` when the input is exhausted.
    pub fn draw<R: Rng>(&mut self, r: usize, rng: &mut R) -> MrlResult<Option<f64>> {
        let window = self.fill_window(r.max(1))?.min(r.max(1));
        if window == 0 {
            return Ok(None);
        }
        let idx = if window == 1 {
            0
        } else {
            rng.random_range(0..window)
        };
        // the window is a set; order inside it never matters to a uniform draw
        let v = if self.lookahead.len() == window {
            self.lookahead.swap_remove_back(idx)
        } else {
            self.lookahead.remove(idx)
        };
        if v.is_some() {
            self.consumed += 1;
        }
        Ok(v)
    }

    /// Number of real elements consumed so far.
    #[inline]
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Everything not yet consumed (not validated). Source order is kept
    /// except inside the current draw window.
    pub fn into_remaining(self) -> Vec<f64> {
        let mut rest: Vec<f64> = self.lookahead.into_iter().collect();
        rest.extend(self.source);
        rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn take_in_order_and_count() {
        let mut s = InputStream::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(s.take_up_to(3).unwrap(), vec![1.0, 2.0, 3.0]);
        assert_eq!(s.consumed(), 3);
        assert_eq!(s.take_up_to(3).unwrap(), vec![4.0, 5.0]);
        assert!(s.is_exhausted().unwrap());
        assert_eq!(s.consumed(), 5);
    }

    #[test]
    fn draws_keep_unchosen_elements() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut s = InputStream::from_vec((0..10).map(|x| x as f64).collect());
        let first = s.draw(4, &mut rng).unwrap().unwrap();
        assert!((0.0..4.0).contains(&first));

        let mut rest = s.into_remaining();
        assert_eq!(rest.len(), 9);
        rest.push(first);
        rest.sort_by(|a, b| a.total_cmp(b));
        assert_eq!(rest, (0..10).map(|x| x as f64).collect::<Vec<_>>());
    }

    #[test]
    fn draw_on_empty_is_none() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut s = InputStream::from_vec(vec![]);
        assert_eq!(s.draw(3, &mut rng).unwrap(), None);
    }

    #[test]
    fn rejects_non_finite() {
        let mut s = InputStream::from_vec(vec![1.0, f64::NAN]);
        assert_eq!(
            s.take_up_to(2),
            Err(MrlError::NonFiniteInput {
                context: "input value"
            })
        );
        let mut s = InputStream::from_vec(vec![f64::INFINITY]);
        assert!(s.is_exhausted().is_err());
    }
}
