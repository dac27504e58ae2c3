//! Hashrate measured in whole hashes per second.

use std::fmt;

const HASHES_PER_MEGAHASH: u64 = 1_000_000;

/// Hashes per thousandth of a megahash, the display resolution.
const DISPLAY_STEP: u64 = HASHES_PER_MEGAHASH / 1_000;

/// Hashrate in hashes per second.
///
/// Stored as an integer so threshold comparisons are exact. Displays in
/// MH/s with three decimals, truncated so a rate never reads higher than
/// it is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HashRate(u64);

impl HashRate {
    pub const ZERO: Self = Self(0);

    pub const fn from_hashes(hashes_per_sec: u64) -> Self {
        Self(hashes_per_sec)
    }

    pub const fn from_megahashes(megahashes_per_sec: u64) -> Self {
        Self(megahashes_per_sec * HASHES_PER_MEGAHASH)
    }

    /// Convert a pool-reported float, dropping the fractional hash.
    ///
    /// Flooring keeps `x < N` equivalent to `from_f64(x) < N` for whole
    /// thresholds. Negative, NaN and infinite inputs become zero.
    pub fn from_f64(hashes_per_sec: f64) -> Self {
        if !hashes_per_sec.is_finite() || hashes_per_sec <= 0.0 {
            return Self::ZERO;
        }
        // `as` saturates at u64::MAX.
        Self(hashes_per_sec.floor() as u64)
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for HashRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let thousandths = self.0 / DISPLAY_STEP;
        write!(f, "{}.{:03} MH/s", thousandths / 1_000, thousandths % 1_000)
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(0, "0.000 MH/s"; "zero")]
    #[test_case(230_000_000, "230.000 MH/s"; "baseline")]
    #[test_case(124_999_999, "124.999 MH/s"; "stays_below_boundary")]
    #[test_case(229_999_999, "229.999 MH/s"; "stays_below_baseline")]
    #[test_case(1_234_999, "1.234 MH/s"; "truncates")]
    fn display_in_megahashes(hashes: u64, expected: &str) {
        assert_eq!(HashRate::from_hashes(hashes).to_string(), expected);
    }

    #[test_case(229_999_999.6, 229_999_999; "just_below_baseline")]
    #[test_case(124_999_999.5, 124_999_999; "just_below_half_baseline")]
    #[test_case(230_000_000.0, 230_000_000; "whole")]
    #[test_case(0.9, 0; "below_one_hash")]
    fn from_f64_drops_fraction(pool: f64, hashes: u64) {
        assert_eq!(HashRate::from_f64(pool), HashRate::from_hashes(hashes));
    }

    #[test]
    fn from_f64_rejects_garbage() {
        assert!(HashRate::from_f64(-5.0).is_zero());
        assert!(HashRate::from_f64(f64::NAN).is_zero());
        assert!(HashRate::from_f64(f64::INFINITY).is_zero());
    }

    #[test]
    fn orders_by_rate() {
        assert!(HashRate::from_hashes(124_999_999) < HashRate::from_megahashes(125));
    }
}
