//! Assertion helpers shared by unit tests, integration tests and benches.

use crate::mrl::buffer::{Buffer, Fullness};
pub use crate::quality::quality_base::{rank_bounds, rank_error};

/// A Full buffer holding `elements` (unsorted is fine) at `weight`.
pub fn full_buffer(capacity: usize, elements: &[f64], weight: u64) -> Buffer {
    let mut b = Buffer::new(capacity);
    b.populate(elements.to_vec(), weight, Fullness::Full);
    b
}

pub fn assert_exact(label: &str, expected: f64, got: f64) {
    assert!(
        expected == got,
        "{}: expected exactly {:.9}, got {:.9}",
        label,
        expected,
        got
    );
}

pub fn assert_monotone_chain(label: &str, values: &[f64]) {
    for i in 1..values.len() {
        assert!(
            values[i] >= values[i - 1],
            "{}: non-monotone at i={}: {} < {}",
            label,
            i,
            values[i],
            values[i - 1]
        );
    }
}

pub fn assert_rank_within(label: &str, sorted: &[f64], x: f64, phi: f64, eps: f64) {
    let err = rank_error(sorted, x, phi);
    let (lo, hi) = rank_bounds(sorted, x);
    assert!(
        err <= eps,
        "{}: estimate {} sits at ranks [{:.5}, {:.5}], phi={} (err {:.5} > {:.5})",
        label,
        x,
        lo,
        hi,
        phi,
        err,
        eps
    );
}
