//! Fixed-point probabilities.
//!
//! Leaf class distributions and forest votes are micro-precision (1e-6)
//! integers, so averaging over trees is exact integer arithmetic.
//! Intermediate products promote to `i128`.

use serde::{Deserialize, Serialize};

/// Scaling factor: 1 unit = 1e-6.
pub const SCALE: i64 = 1_000_000;

/// Fixed-point 64-bit number with six decimal places of precision.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fixed(pub i64);

impl Fixed {
    /// Construct from a raw scaled integer.
    #[inline]
    pub const fn from_scaled(raw: i64) -> Self {
        Self(raw)
    }

    /// Return the raw scaled integer value.
    #[inline]
    pub const fn into_inner(self) -> i64 {
        self.0
    }

    /// Convert back to `f64`.
    #[inline]
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }

    /// `numerator / denominator` as a fixed-point fraction, truncated toward zero.
    ///
    /// A zero denominator yields zero.
    pub fn from_ratio(numerator: u64, denominator: u64) -> Self {
        if denominator == 0 {
            return Self(0);
        }
        let scaled = (numerator as i128 * SCALE as i128) / denominator as i128;
        Self(scaled.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }
}
