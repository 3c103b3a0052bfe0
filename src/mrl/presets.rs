//! Tabulated summary geometries: for an error target `epsilon` and an input
//! length `N`, the buffer count `b` and capacity `k` that keep the rank error
//! of the exact summary within `epsilon`.

use serde::{Deserialize, Serialize};

use crate::{MrlError, MrlResult};

/// `b` buffers of `k` elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geometry {
    pub buffers: usize,
    pub capacity: usize,
}

impl Geometry {
    #[inline]
    pub const fn new(buffers: usize, capacity: usize) -> Self {
        Self { buffers, capacity }
    }

    /// Elements resident at most: `b * k`.
    #[inline]
    pub fn memory(&self) -> usize {
        self.buffers * self.capacity
    }
}

pub const SUPPORTED_EPSILONS: [f64; 5] = [0.001, 0.005, 0.01, 0.05, 0.1];
pub const SUPPORTED_LENGTHS: [u64; 3] = [100_000, 10_000_000, 1_000_000_000];

// rows follow SUPPORTED_EPSILONS, columns SUPPORTED_LENGTHS
const TABLE: [[Geometry; 3]; 5] = [
    [Geometry::new(3, 2778), Geometry::new(5, 5495), Geometry::new(10, 5954)],
    [Geometry::new(3, 953), Geometry::new(8, 875), Geometry::new(7, 2106)],
    [Geometry::new(7, 217), Geometry::new(9, 412), Geometry::new(10, 765)],
    [Geometry::new(6, 78), Geometry::new(8, 129), Geometry::new(8, 235)],
    [Geometry::new(5, 55), Geometry::new(10, 60), Geometry::new(12, 77)],
];

fn epsilon_row(epsilon: f64) -> MrlResult<usize> {
    SUPPORTED_EPSILONS
        .iter()
        .position(|e| (e - epsilon).abs() <= 1e-12)
        .ok_or(MrlError::InvalidParameter {
            what: "epsilon must be one of 0.001, 0.005, 0.01, 0.05, 0.1",
        })
}

/// Geometry for exactly tabulated `(epsilon, n)`.
pub fn geometry_for(epsilon: f64, n: u64) -> MrlResult<Geometry> {
    let row = epsilon_row(epsilon)?;
    let col = SUPPORTED_LENGTHS
        .iter()
        .position(|&len| len == n)
        .ok_or(MrlError::InvalidParameter {
            what: "n must be one of 1e5, 1e7, 1e9",
        })?;
    Ok(TABLE[row][col])
}

/// Geometry of the smallest tabulated length that is `>= n`.
pub fn geometry_covering(epsilon: f64, n: u64) -> MrlResult<Geometry> {
    let row = epsilon_row(epsilon)?;
    let col = SUPPORTED_LENGTHS
        .iter()
        .position(|&len| len >= n)
        .ok_or(MrlError::InvalidParameter {
            what: "n is larger than the largest tabulated length (1e9)",
        })?;
    Ok(TABLE[row][col])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_lookups() {
        assert_eq!(geometry_for(0.01, 100_000).unwrap(), Geometry::new(7, 217));
        assert_eq!(geometry_for(0.001, 1_000_000_000).unwrap(), Geometry::new(10, 5954));
        assert_eq!(geometry_for(0.1, 10_000_000).unwrap(), Geometry::new(10, 60));
        assert_eq!(geometry_for(0.05, 100_000).unwrap().memory(), 468);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            geometry_for(0.02, 100_000),
            Err(MrlError::InvalidParameter { .. })
        ));
        assert!(matches!(
            geometry_for(0.01, 12_345),
            Err(MrlError::InvalidParameter { .. })
        ));
        assert!(geometry_covering(0.01, 2_000_000_000).is_err());
    }

    #[test]
    fn covering_rounds_length_up() {
        assert_eq!(geometry_covering(0.05, 20_000).unwrap(), Geometry::new(6, 78));
        assert_eq!(geometry_covering(0.05, 100_001).unwrap(), Geometry::new(8, 129));
        assert_eq!(geometry_covering(0.05, 100_000).unwrap(), geometry_for(0.05, 100_000).unwrap());
    }
}
