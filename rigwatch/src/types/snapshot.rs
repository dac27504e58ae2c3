use time::OffsetDateTime;

use super::HashRate;

/// One poll's worth of pool statistics for a rig.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// When the pool computed these statistics.
    pub sampled_at: OffsetDateTime,
    /// Last time the pool heard from the rig.
    pub last_seen: OffsetDateTime,
    /// Hashrate the mining software claims.
    pub reported_hashrate: HashRate,
    /// Hashrate the pool derives from recent shares.
    pub current_hashrate: HashRate,
    pub average_hashrate: HashRate,
    pub valid_shares: u64,
    pub invalid_shares: u64,
    pub stale_shares: u64,
    pub active_workers: u32,
}

impl Snapshot {
    pub fn total_shares(&self) -> u64 {
        self.valid_shares
            .saturating_add(self.invalid_shares)
            .saturating_add(self.stale_shares)
    }
}
