//! Exponential backoff between readiness attempts

/// Seconds to wait after `attempts` failed attempts
///
/// `round(((1 << c) - 1) / 2)` with halves rounded up, which yields
/// 0, 1, 2, 4, 8, 16, ... for c = 0, 1, 2, 3, 4, 5, ...
/// Saturates instead of overflowing for very large attempt counts.
pub fn backoff_secs(attempts: u32) -> u64 {
    let numerator = 1u64
        .checked_shl(attempts)
        .map_or(u64::MAX, |pow| pow - 1);

    // numerator is odd for every c >= 1, so rounding half up is a ceiling division
    numerator.div_ceil(2)
}
