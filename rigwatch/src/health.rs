//! Rig health classification.
//!
//! [`classify`] turns a statistics [`Snapshot`] into a [`HealthResult`].
//! Rules are checked in a fixed order and the first match wins:
//!
//! | # | Condition | Health |
//! |---|-----------|--------|
//! | 1 | no active workers | `MissingInAction` |
//! | 2 | stale shares > 10% of all shares | `HighStales` |
//! | 3 | reported < 125 MH/s | `AlmostNoHashrate` |
//! | 4 | reported < 230 MH/s | `LowReportedHashrate` |
//! | 5 | current < 190 MH/s | `LowCurrentHashrate` |
//! | 6 | otherwise | `Ok` |
//!
//! The thresholds describe the expected performance of the watched rig.
//! They are fixed, not derived from history.
//!
//! Classification is pure. Anything time-dependent, such as how long an
//! outage lasted, is added by the caller through
//! [`HealthResult::with_outage`].

use std::fmt;
use std::time::Duration;

use time::OffsetDateTime;

use crate::types::{HashRate, Snapshot};

/// Reported hashrate the rig is expected to sustain.
pub const BASELINE_HASHRATE: HashRate = HashRate::from_megahashes(230);

/// Below this the rig is barely hashing at all (half the baseline).
pub const ALMOST_NO_HASHRATE: HashRate = HashRate::from_megahashes(125);

/// Floor for the pool-measured trailing hashrate. Lower than the
/// baseline because share luck makes it noisy.
pub const CURRENT_HASHRATE_FLOOR: HashRate = HashRate::from_megahashes(190);

/// Stale-share alarm level, in percent of all submitted shares.
pub const MAX_STALE_PERCENT: u64 = 10;

/// Discrete rig condition. Only equality is meaningful; there is no
/// severity order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Health {
    ApiError,
    MissingInAction,
    HighStales,
    AlmostNoHashrate,
    LowReportedHashrate,
    LowCurrentHashrate,
    Ok,
}

impl Health {
    pub fn is_ok(self) -> bool {
        self == Health::Ok
    }
}

/// Classification plus the text sent to recipients.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthResult {
    pub health: Health,
    /// Absent when the pool could not be reached.
    pub last_seen: Option<OffsetDateTime>,
    pub message: String,
}

impl HealthResult {
    fn new(health: Health, last_seen: OffsetDateTime, message: String) -> Self {
        Self {
            health,
            last_seen: Some(last_seen),
            message,
        }
    }

    /// Result for a poll that produced no statistics.
    pub fn api_error(message: impl Into<String>) -> Self {
        Self {
            health: Health::ApiError,
            last_seen: None,
            message: message.into(),
        }
    }

    /// Append how long the rig was unhealthy.
    pub fn with_outage(mut self, outage: Duration) -> Self {
        self.message
            .push_str(&format!(" Outage duration: {}", Hms(outage)));
        self
    }
}

/// Classify a snapshot.
pub fn classify(stats: &Snapshot) -> HealthResult {
    if stats.active_workers == 0 {
        return HealthResult::new(
            Health::MissingInAction,
            stats.last_seen,
            format!(
                "URGENT! Rig is missing in action! Active workers: 0. Reported hashrate: {}",
                stats.reported_hashrate
            ),
        );
    }

    let stales = StalePercentage::of(stats);
    if stales.exceeds(MAX_STALE_PERCENT) {
        return HealthResult::new(
            Health::HighStales,
            stats.last_seen,
            format!(
                "Warning! High share of stale shares: {stales} ({} of {})",
                stats.stale_shares,
                stats.total_shares()
            ),
        );
    }

    if stats.reported_hashrate < ALMOST_NO_HASHRATE {
        return HealthResult::new(
            Health::AlmostNoHashrate,
            stats.last_seen,
            format!(
                "URGENT! Almost no hashrate! Reported hashrate: {} (expected {BASELINE_HASHRATE})",
                stats.reported_hashrate
            ),
        );
    }

    if stats.reported_hashrate < BASELINE_HASHRATE {
        return HealthResult::new(
            Health::LowReportedHashrate,
            stats.last_seen,
            format!(
                "Warning! Reported hashrate is below {BASELINE_HASHRATE}: {}",
                stats.reported_hashrate
            ),
        );
    }

    if stats.current_hashrate < CURRENT_HASHRATE_FLOOR {
        return HealthResult::new(
            Health::LowCurrentHashrate,
            stats.last_seen,
            format!(
                "Warning! Current hashrate is below {CURRENT_HASHRATE_FLOOR}: {}",
                stats.current_hashrate
            ),
        );
    }

    HealthResult::new(
        Health::Ok,
        stats.last_seen,
        "OK! Status is back to normal.".to_string(),
    )
}

/// Stale shares as a fraction of all shares, kept as an exact ratio.
///
/// An empty share count is 0%.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StalePercentage {
    stale: u128,
    total: u128,
}

impl StalePercentage {
    fn of(stats: &Snapshot) -> Self {
        Self {
            stale: stats.stale_shares.into(),
            total: stats.total_shares().into(),
        }
    }

    /// Strictly greater than `percent`.
    fn exceeds(self, percent: u64) -> bool {
        self.total > 0 && self.stale * 100 > u128::from(percent) * self.total
    }

    /// Percentage in tenths, rounded half-up.
    fn tenths(self) -> u128 {
        if self.total == 0 {
            return 0;
        }
        (self.stale * 2_000 + self.total) / (2 * self.total)
    }
}

impl fmt::Display for StalePercentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tenths = self.tenths();
        write!(f, "{}.{}%", tenths / 10, tenths % 10)
    }
}

/// `H:MM:SS`, hours unbounded.
struct Hms(Duration);

impl fmt::Display for Hms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0.as_secs();
        write!(
            f,
            "{}:{:02}:{:02}",
            secs / 3_600,
            secs % 3_600 / 60,
            secs % 60
        )
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;
    use time::macros::datetime;

    use super::*;

    fn snapshot(
        active_workers: u32,
        reported: u64,
        current: u64,
        stale: u64,
        valid: u64,
        invalid: u64,
    ) -> Snapshot {
        Snapshot {
            sampled_at: datetime!(2021-05-01 12:00:00 UTC),
            last_seen: datetime!(2021-05-01 11:59:30 UTC),
            reported_hashrate: HashRate::from_hashes(reported),
            current_hashrate: HashRate::from_hashes(current),
            average_hashrate: HashRate::from_hashes(current),
            valid_shares: valid,
            invalid_shares: invalid,
            stale_shares: stale,
            active_workers,
        }
    }

    fn healthy() -> Snapshot {
        snapshot(5, 300_000_000, 250_000_000, 0, 100, 0)
    }

    #[test]
    fn healthy_rig_is_ok() {
        let result = classify(&healthy());
        assert_eq!(result.health, Health::Ok);
        assert_eq!(result.last_seen, Some(datetime!(2021-05-01 11:59:30 UTC)));
        assert_eq!(result.message, "OK! Status is back to normal.");
    }

    #[test_case(snapshot(0, 300_000_000, 250_000_000, 0, 100, 0); "otherwise_healthy")]
    #[test_case(snapshot(0, 0, 0, 0, 0, 0); "all_zero")]
    #[test_case(snapshot(0, 10, 10, 90, 10, 0); "high_stales_and_low_hashrate")]
    fn no_workers_is_missing_in_action(stats: Snapshot) {
        let result = classify(&stats);
        assert_eq!(result.health, Health::MissingInAction);
        assert!(result.message.starts_with("URGENT!"));
        assert!(result.message.contains("Active workers: 0"));
    }

    #[test]
    fn no_shares_never_raises_stales() {
        let result = classify(&snapshot(1, 300_000_000, 250_000_000, 0, 0, 0));
        assert_eq!(result.health, Health::Ok);
    }

    #[test_case(10, 90, 0, Health::Ok; "exactly_ten_percent")]
    #[test_case(11, 89, 0, Health::HighStales; "eleven_percent")]
    #[test_case(1, 0, 0, Health::HighStales; "only_stales")]
    #[test_case(10, 80, 10, Health::Ok; "invalid_shares_count_in_total")]
    fn stale_ratio_threshold(stale: u64, valid: u64, invalid: u64, expected: Health) {
        let stats = snapshot(1, 300_000_000, 250_000_000, stale, valid, invalid);
        assert_eq!(classify(&stats).health, expected);
    }

    #[test]
    fn stale_percentage_is_rounded_half_up() {
        // 1/8 = 12.5% exactly; 1/7 = 14.2857..%; 1/6 = 16.666..%
        let result = classify(&snapshot(1, 300_000_000, 250_000_000, 1, 7, 0));
        assert!(result.message.contains("12.5% (1 of 8)"), "{}", result.message);

        let result = classify(&snapshot(1, 300_000_000, 250_000_000, 1, 6, 0));
        assert!(result.message.contains("14.3%"), "{}", result.message);

        let result = classify(&snapshot(1, 300_000_000, 250_000_000, 1, 5, 0));
        assert!(result.message.contains("16.7%"), "{}", result.message);

        // 1/2000 = 0.05% rounds up to 0.1%
        let stales = StalePercentage { stale: 1, total: 2_000 };
        assert_eq!(stales.to_string(), "0.1%");
    }

    #[test_case(124_999_999, Health::AlmostNoHashrate; "just_below_half_baseline")]
    #[test_case(125_000_000, Health::LowReportedHashrate; "exactly_half_baseline")]
    #[test_case(229_999_999, Health::LowReportedHashrate; "just_below_baseline")]
    #[test_case(230_000_000, Health::Ok; "exactly_baseline")]
    fn reported_hashrate_thresholds(reported: u64, expected: Health) {
        let stats = snapshot(1, reported, 250_000_000, 0, 100, 0);
        assert_eq!(classify(&stats).health, expected);
    }

    #[test_case(189_999_999, Health::LowCurrentHashrate; "just_below_floor")]
    #[test_case(190_000_000, Health::Ok; "exactly_floor")]
    fn current_hashrate_threshold(current: u64, expected: Health) {
        let stats = snapshot(1, 230_000_000, current, 0, 100, 0);
        assert_eq!(classify(&stats).health, expected);
    }

    #[test]
    fn reported_hashrate_is_checked_before_current() {
        let stats = snapshot(1, 200_000_000, 0, 0, 100, 0);
        assert_eq!(classify(&stats).health, Health::LowReportedHashrate);
    }

    #[test]
    fn messages_carry_megahashes() {
        let result = classify(&snapshot(1, 100_000_000, 250_000_000, 0, 100, 0));
        assert!(result.message.contains("100.000 MH/s"), "{}", result.message);

        let result = classify(&snapshot(1, 229_999_999, 250_000_000, 0, 100, 0));
        assert_eq!(
            result.message,
            "Warning! Reported hashrate is below 230.000 MH/s: 229.999 MH/s"
        );

        let result = classify(&snapshot(1, 230_000_000, 150_500_000, 0, 100, 0));
        assert!(result.message.contains("150.500 MH/s"), "{}", result.message);
    }

    #[test]
    fn classify_is_idempotent() {
        let stats = snapshot(3, 200_000_000, 100_000_000, 3, 40, 1);
        assert_eq!(classify(&stats), classify(&stats));
    }

    #[test]
    fn api_error_has_no_last_seen() {
        let result = HealthResult::api_error("connection refused");
        assert_eq!(result.health, Health::ApiError);
        assert_eq!(result.last_seen, None);
        assert_eq!(result.message, "connection refused");
    }

    #[test]
    fn outage_is_appended_as_hms() {
        let result = classify(&healthy()).with_outage(Duration::from_secs(3 * 3_600 + 62));
        assert_eq!(
            result.message,
            "OK! Status is back to normal. Outage duration: 3:01:02"
        );
    }

    #[test]
    fn only_ok_is_ok() {
        let all = [
            Health::ApiError,
            Health::MissingInAction,
            Health::HighStales,
            Health::AlmostNoHashrate,
            Health::LowReportedHashrate,
            Health::LowCurrentHashrate,
            Health::Ok,
        ];
        let ok: Vec<_> = all.into_iter().filter(|h| h.is_ok()).collect();
        assert_eq!(ok, vec![Health::Ok]);
    }
}
