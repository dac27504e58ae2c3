//! Pool API data transfer objects.
//!
//! These mirror the pool's `currentStats` response. Fields the pool may
//! report as `null` are optional here and default to zero when converted
//! into a [`Snapshot`](crate::types::Snapshot).

use serde::{Deserialize, Serialize};

/// Response envelope.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StatsResponse {
    /// `"OK"` on success.
    pub status: String,
    #[serde(default)]
    pub data: Option<Statistics>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Per-miner statistics.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// Epoch seconds.
    pub time: i64,
    /// Epoch seconds.
    pub last_seen: i64,
    /// Hashes per second.
    pub reported_hashrate: Option<f64>,
    pub current_hashrate: Option<f64>,
    pub average_hashrate: Option<f64>,
    pub valid_shares: Option<u64>,
    pub invalid_shares: Option<u64>,
    pub stale_shares: Option<u64>,
    pub active_workers: Option<u32>,
}
