//! Deterministic utilities for reproducible training
//!
//! A seeded LCG drives bootstrap sampling and feature subsampling, a small
//! integer hash orders rows for shuffling and derives per-tree seeds, and a
//! total order on split candidates breaks gain ties.

use std::num::Wrapping;

/// 64-bit linear congruential generator (Knuth MMIX constants).
///
/// Output is taken from the high bits, which have the longest period.
#[derive(Clone, Debug)]
pub struct LcgRng {
    state: Wrapping<u64>,
}

impl LcgRng {
    const MULTIPLIER: u64 = 6_364_136_223_846_793_005;
    const INCREMENT: u64 = 1_442_695_040_888_963_407;

    pub fn new(seed: u64) -> Self {
        let mut rng = Self {
            state: Wrapping(seed),
        };
        // first output of a raw seed is weakly mixed
        rng.step();
        rng
    }

    fn step(&mut self) -> u64 {
        self.state = self.state * Wrapping(Self::MULTIPLIER) + Wrapping(Self::INCREMENT);
        self.state.0
    }

    /// Next 32 random bits
    pub fn next_u32(&mut self) -> u32 {
        (self.step() >> 32) as u32
    }

    /// Next 64 random bits
    pub fn next_u64(&mut self) -> u64 {
        (u64::from(self.next_u32()) << 32) | u64::from(self.next_u32())
    }

    /// Uniform value in `[0, max)`; returns 0 when `max == 0`
    pub fn next_range(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        ((u128::from(self.next_u64()) * max as u128) >> 64) as usize
    }

    /// In-place Fisher-Yates shuffle
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_range(i + 1);
            items.swap(i, j);
        }
    }
}

/// Deterministic xxhash64-style mix over integers
pub fn xxhash64_i64(data: &[i64], seed: i64) -> i64 {
    const PRIME1: i64 = 0x9E3779B185EBCA87_u64 as i64;
    const PRIME2: i64 = 0xC2B2AE3D27D4EB4F_u64 as i64;
    const PRIME3: i64 = 0x165667B19E3779F9_u64 as i64;
    const PRIME5: i64 = 0x85EBCA77C2B2AE63_u64 as i64;

    let mut h = seed.wrapping_add(PRIME5);

    for &val in data {
        h = h.wrapping_add(val.wrapping_mul(PRIME3));
        h = h.rotate_left(17).wrapping_mul(PRIME2);
    }

    h ^= ((h as u64) >> 33) as i64;
    h = h.wrapping_mul(PRIME1);
    h ^= ((h as u64) >> 29) as i64;
    h = h.wrapping_mul(PRIME2);
    h ^= ((h as u64) >> 32) as i64;

    h
}

/// Seed for tree `tree_idx` of a forest seeded with `forest_seed`
pub fn tree_seed(forest_seed: u64, tree_idx: usize) -> u64 {
    xxhash64_i64(&[tree_idx as i64], forest_seed as i64) as u64
}

/// Deterministic tie-breaker for split selection
///
/// Orders candidates by `(feature_idx, threshold, node_id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SplitTieBreaker {
    pub feature_idx: usize,
    pub threshold: i64,
    pub node_id: usize,
}

impl SplitTieBreaker {
    pub fn new(feature_idx: usize, threshold: i64, node_id: usize) -> Self {
        Self {
            feature_idx,
            threshold,
            node_id,
        }
    }
}
