//! COLLAPSE: merge several Full buffers into one.
//!
//! The inputs are read as one weighted sorted sequence (each element of a
//! weight-`w` buffer stands for `w` copies). Positions `offset + j*k` of that
//! sequence (for `j = 0, 1, ...`) are kept, where `k` is the total weight and
//! `offset = ceil(k/2)`. `+inf` elements are always kept, and the scan ends on
//! the first pick past `k * capacity`, so the result holds the `capacity`
//! stride picks followed by at least one `+inf`. It lands in the first slot
//! with weight `k`; every other slot is reset to Empty.

use crate::mrl::buffer::{Buffer, Fullness};
use crate::mrl::merges::KWayBufferMerge;
use crate::{MrlError, MrlResult};

/// `true` when some multiple of `stride` lies in `[lo, hi]`.
///
/// Requires `lo <= hi` and `stride > 0`.
#[inline]
pub(crate) fn hits_stride(lo: u64, hi: u64, stride: u64) -> bool {
    (hi / stride) * stride >= lo
}

fn check_inputs(capacity: usize, buffers: &[&mut Buffer]) -> MrlResult<()> {
    if buffers.len() < 2 {
        return Err(MrlError::PreconditionViolation {
            what: "COLLAPSE needs at least 2 buffers",
        });
    }
    for b in buffers.iter() {
        if !b.is_full() {
            return Err(MrlError::PreconditionViolation {
                what: "COLLAPSE inputs must all be Full",
            });
        }
        if b.len() < capacity {
            return Err(MrlError::PreconditionViolation {
                what: "COLLAPSE input holds fewer than `capacity` elements",
            });
        }
        if b.weight() == 0 {
            return Err(MrlError::PreconditionViolation {
                what: "COLLAPSE input has weight 0",
            });
        }
    }
    Ok(())
}

/// Collapse `buffers` (all Full, at least two) into `buffers[0]`.
///
/// On success `buffers[0]` is Full with weight `Σ w` and at least `capacity`
/// sorted elements (normally `capacity + 1`, the last one `+inf`); the rest
/// are Empty. Levels are left to the caller.
pub fn collapse(capacity: usize, buffers: &mut [&mut Buffer]) -> MrlResult<()> {
    if capacity == 0 {
        return Err(MrlError::InvalidParameter {
            what: "capacity must be >= 1",
        });
    }
    check_inputs(capacity, buffers)?;

    const OVERFLOW: MrlError = MrlError::PreconditionViolation {
        what: "total buffer weight overflows u64",
    };
    let mut k: u64 = 0;
    for b in buffers.iter() {
        k = k.checked_add(b.weight()).ok_or(OVERFLOW)?;
    }
    let offset = k.div_ceil(2);
    // positions run up to `limit + k`
    let span = k.checked_mul(capacity as u64 + 1).ok_or(OVERFLOW)?;
    let limit = span - k;
    for b in buffers.iter_mut() {
        b.sort();
    }

    let mut kept: Vec<f64> = Vec::with_capacity(capacity + 1);
    let mut position: u64 = 0;

    for pick in KWayBufferMerge::new(buffers) {
        if position > limit {
            break;
        }
        let lo = position;
        position += pick.weight;
        let stride = k.saturating_mul(kept.len() as u64).saturating_add(offset);
        if pick.value == f64::INFINITY || (position >= offset && hits_stride(lo, position, stride))
        {
            log::trace!(
                "collapse: keep {} from buffer {} at position {}",
                pick.value,
                pick.buffer,
                position
            );
            kept.push(pick.value);
        }
    }

    log::trace!(
        "collapse: {} buffers, k={}, offset={}, kept={}",
        buffers.len(),
        k,
        offset,
        kept.len()
    );

    if kept.len() < capacity {
        return Err(MrlError::PreconditionViolation {
            what: "COLLAPSE selected fewer than `capacity` elements",
        });
    }

    for b in buffers.iter_mut() {
        b.reset();
    }
    buffers[0].populate(kept, k, Fullness::Full);
    Ok(())
}
