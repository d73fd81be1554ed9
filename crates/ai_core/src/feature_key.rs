//! Order-preserving integer keys for feature values.
//!
//! A finite `f64` maps to an `i64` whose signed ordering matches the numeric
//! ordering of the floats, across the whole range from subnormals up to
//! `f64::MAX`. Trees store thresholds as keys and route rows with a plain
//! integer `<=`, so training and inference never compare floats directly.

const MAGNITUDE_MASK: i64 = i64::MAX;

/// Key for a finite value; `None` for NaN and infinities.
///
/// `-0.0` and `0.0` share the key `0`.
pub fn encode(value: f64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }
    let bits = (value + 0.0).to_bits() as i64;
    // negative floats order backwards by magnitude; flip them below zero
    Some(if bits < 0 { bits ^ MAGNITUDE_MASK } else { bits })
}

/// Value a key was produced from.
pub fn decode(key: i64) -> f64 {
    let bits = if key < 0 { key ^ MAGNITUDE_MASK } else { key };
    f64::from_bits(bits as u64)
}

/// Split key between two distinct sorted keys.
///
/// Uses the numeric midpoint of the decoded values. Falls back to `lower`
/// when the midpoint rounds onto `upper`, so `lower <= split < upper`.
pub fn split_between(lower: i64, upper: i64) -> i64 {
    let (lo, hi) = (decode(lower), decode(upper));
    // halving first keeps the sum finite near f64::MAX
    let mid = lo / 2.0 + hi / 2.0;
    match encode(mid) {
        Some(key) if key >= lower && key < upper => key,
        _ => lower,
    }
}
