//! OUTPUT: read a φ-quantile off the final merged buffer.
//!
//! With `β = (real + padding) / real` (weighted counts), the target rank is
//! shifted to `φ' = (2φ + β − 1) / (2β)` so the ±inf padding pairs cancel out.
//! The answer is the element at `ceil(φ'·capacity) − 1` of the merged buffer.

use crate::mrl::buffer::Buffer;
use crate::mrl::collapse::collapse;
use crate::{MrlError, MrlResult};

#[inline]
pub fn validate_phi(phi: f64) -> MrlResult<()> {
    if phi.is_finite() && (0.0..=1.0).contains(&phi) {
        Ok(())
    } else {
        Err(MrlError::InvalidParameter {
            what: "phi must be in [0, 1]",
        })
    }
}

/// Sentinel-corrected quantile: `(2φ + β − 1) / (2β)`.
#[inline]
pub fn phi_tick(phi: f64, beta: f64) -> f64 {
    (2.0 * phi + beta - 1.0) / (2.0 * beta)
}

/// 0-based index into the merged buffer for a corrected quantile.
#[inline]
pub fn output_position(phi_tick: f64, capacity: usize) -> usize {
    let p = (phi_tick * capacity as f64).ceil() - 1.0;
    if p <= 0.0 {
        0
    } else {
        (p as usize).min(capacity.saturating_sub(1))
    }
}

/// Reduce the Full buffers to a single sorted one in `buffers[0]`.
///
/// One buffer is just sorted in place; two or more go through COLLAPSE.
pub fn merge_final(capacity: usize, buffers: &mut [&mut Buffer]) -> MrlResult<()> {
    match buffers.len() {
        0 => Err(MrlError::PreconditionViolation {
            what: "OUTPUT needs at least one Full buffer",
        }),
        1 => {
            if !buffers[0].is_full() {
                return Err(MrlError::PreconditionViolation {
                    what: "OUTPUT inputs must all be Full",
                });
            }
            buffers[0].sort();
            Ok(())
        }
        _ => collapse(capacity, buffers),
    }
}

/// OUTPUT over the given Full buffers. Consumes them: afterwards `buffers[0]`
/// holds the merged result and the others are Empty.
///
/// May return a `±inf` sentinel; [`finite_near`] steps off those.
pub fn output(
    phi: f64,
    beta: f64,
    capacity: usize,
    buffers: &mut [&mut Buffer],
) -> MrlResult<f64> {
    validate_phi(phi)?;
    if !beta.is_finite() || beta < 1.0 {
        return Err(MrlError::InvalidParameter {
            what: "beta must be a finite value >= 1",
        });
    }
    merge_final(capacity, buffers)?;
    let pos = output_position(phi_tick(phi, beta), capacity);
    buffers[0]
        .element_at(Some(pos))
        .ok_or(MrlError::PreconditionViolation {
            what: "merged buffer is shorter than `capacity`",
        })
}

/// The element at `pos` when finite; otherwise the nearest finite element
/// inward (`+inf` looks left, `-inf` looks right). `None` when `sorted` holds
/// no finite element at all.
pub fn finite_near(sorted: &[f64], pos: usize) -> Option<f64> {
    let v = *sorted.get(pos)?;
    if v.is_finite() {
        return Some(v);
    }
    let inward = if v == f64::INFINITY {
        sorted[..pos].iter().rev().find(|x| x.is_finite())
    } else {
        sorted[pos + 1..].iter().find(|x| x.is_finite())
    };
    inward
        .or_else(|| sorted.iter().find(|x| x.is_finite()))
        .copied()
}
