//! Fixed-capacity weighted buffers, the unit NEW / COLLAPSE / OUTPUT operate on.
//!
//! A buffer owns its element storage. [`Buffer::populate`] moves a vector in,
//! so two slots never share elements after a collapse reuses one of them.

use serde::{Deserialize, Serialize};

/// Fill state of a [`Buffer`].
///
/// `Partial` only ever appears after the sampling fill ran out of input on
/// the last chunk; exact fills pad with sentinels instead.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Fullness {
    #[default]
    Empty,
    Partial,
    Full,
}

/// One slot of the summary's buffer pool.
#[derive(Debug, Clone, PartialEq)]
pub struct Buffer {
    capacity: usize,
    elements: Vec<f64>,
    weight: u64,
    fullness: Fullness,
    /// Scheduler tag; `None` while the slot is empty (treated as +infinity).
    level: Option<u32>,
    /// Merge cursor; `None` means "exhausted" once a merge has started.
    cursor: Option<usize>,
}

impl Buffer {
    /// An empty slot able to hold `capacity` elements.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            elements: Vec::with_capacity(capacity),
            weight: 0,
            fullness: Fullness::Empty,
            level: None,
            cursor: None,
        }
    }

    /// Replace contents, weight and fullness in one step and rewind the cursor.
    #[inline]
    pub fn populate(&mut self, elements: Vec<f64>, weight: u64, fullness: Fullness) {
        debug_assert!(
            fullness != Fullness::Full || elements.len() >= self.capacity,
            "a Full buffer needs at least `capacity` elements"
        );
        self.elements = elements;
        self.weight = weight;
        self.fullness = fullness;
        self.cursor = Some(0);
    }

    /// Back to Empty: no elements, weight 0, no cursor, no level.
    #[inline]
    pub fn reset(&mut self) {
        self.elements.clear();
        self.weight = 0;
        self.fullness = Fullness::Empty;
        self.cursor = None;
        self.level = None;
    }

    /// Sort ascending in place (total order, so sentinels land at the ends).
    #[inline]
    pub fn sort(&mut self) {
        self.elements.sort_by(|a, b| a.total_cmp(b));
    }

    /// Element at `index`:
    /// - `None` index (an exhausted cursor) reads as `+inf`;
    /// - out of bounds is "not found" (`None`).
    #[inline]
    pub fn element_at(&self, index: Option<usize>) -> Option<f64> {
        match index {
            None => Some(f64::INFINITY),
            Some(i) => self.elements.get(i).copied(),
        }
    }

    /// Current merge head: the element under the cursor, `+inf` once exhausted.
    #[inline]
    pub fn head(&self) -> f64 {
        self.element_at(self.cursor).unwrap_or(f64::INFINITY)
    }

    /// Step the cursor; stepping past the last element marks it exhausted.
    #[inline]
    pub fn advance_cursor(&mut self) {
        self.cursor = match self.cursor {
            Some(c) if c + 1 < self.elements.len() => Some(c + 1),
            _ => None,
        };
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }
    #[inline]
    pub fn elements(&self) -> &[f64] {
        &self.elements
    }
    #[inline]
    pub fn weight(&self) -> u64 {
        self.weight
    }
    #[inline]
    pub fn fullness(&self) -> Fullness {
        self.fullness
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fullness == Fullness::Empty
    }
    #[inline]
    pub fn is_full(&self) -> bool {
        self.fullness == Fullness::Full
    }
    #[inline]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }
    #[inline]
    pub fn level(&self) -> Option<u32> {
        self.level
    }
    #[inline]
    pub fn set_level(&mut self, level: u32) {
        self.level = Some(level);
    }

    /// Number of `+inf` / `-inf` padding sentinels currently held.
    pub fn sentinel_counts(&self) -> (usize, usize) {
        let pos = self.elements.iter().filter(|x| **x == f64::INFINITY).count();
        let neg = self
            .elements
            .iter()
            .filter(|x| **x == f64::NEG_INFINITY)
            .count();
        (pos, neg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn populate_replaces_and_rewinds() {
        let mut b = Buffer::new(3);
        assert!(b.is_empty());
        assert_eq!(b.cursor(), None);

        b.populate(vec![3.0, 1.0, 2.0], 1, Fullness::Full);
        assert!(b.is_full());
        assert_eq!(b.weight(), 1);
        assert_eq!(b.cursor(), Some(0));

        b.populate(vec![9.0, 8.0, 7.0], 4, Fullness::Full);
        assert_eq!(b.elements(), &[9.0, 8.0, 7.0]);
        assert_eq!(b.weight(), 4);
    }

    #[test]
    fn reset_clears_everything() {
        let mut b = Buffer::new(2);
        b.populate(vec![1.0, 2.0], 3, Fullness::Full);
        b.set_level(2);
        b.reset();
        assert_eq!(b.fullness(), Fullness::Empty);
        assert_eq!(b.weight(), 0);
        assert_eq!(b.cursor(), None);
        assert_eq!(b.level(), None);
        assert_eq!(b.len(), 0);
        assert_eq!(b.capacity(), 2);
    }

    #[test]
    fn element_at_semantics() {
        let mut b = Buffer::new(3);
        b.populate(vec![5.0, 6.0, 7.0], 1, Fullness::Full);
        assert_eq!(b.element_at(Some(1)), Some(6.0));
        assert_eq!(b.element_at(None), Some(f64::INFINITY));
        assert_eq!(b.element_at(Some(3)), None);
    }

    #[test]
    fn sort_puts_sentinels_at_the_ends() {
        let mut b = Buffer::new(4);
        b.populate(
            vec![2.0, f64::INFINITY, f64::NEG_INFINITY, 1.0, 0.5],
            1,
            Fullness::Full,
        );
        b.sort();
        assert_eq!(
            b.elements(),
            &[f64::NEG_INFINITY, 0.5, 1.0, 2.0, f64::INFINITY]
        );
        assert_eq!(b.sentinel_counts(), (1, 1));
    }

    #[test]
    fn cursor_walks_then_exhausts() {
        let mut b = Buffer::new(2);
        b.populate(vec![1.0, 2.0], 1, Fullness::Full);
        assert_eq!(b.head(), 1.0);
        b.advance_cursor();
        assert_eq!(b.head(), 2.0);
        b.advance_cursor();
        assert_eq!(b.cursor(), None);
        assert_eq!(b.head(), f64::INFINITY);
        b.advance_cursor();
        assert_eq!(b.cursor(), None);
    }
}
