//! HTTP client for the pool's statistics API.

pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use time::OffsetDateTime;

use crate::error::Result;
use crate::tracing::prelude::*;
use crate::types::{HashRate, Snapshot};
use types::{Statistics, StatsResponse};

/// Default pool API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.ethermine.org";

/// Upper bound on a single statistics request, connect included.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of rig statistics.
///
/// The monitor only sees this trait, so tests can script the pool.
#[async_trait]
pub trait StatsSource: Send + Sync {
    async fn fetch(&self, rig_id: &str) -> std::result::Result<Snapshot, FetchError>;
}

/// Why a statistics snapshot could not be obtained.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Transport failure, timeout, or undecodable body.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("pool returned HTTP {0}")]
    Status(StatusCode),

    /// Pool answered but flagged an error.
    #[error("pool reported {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Pool {
        status: String,
        message: Option<String>,
    },

    #[error("pool returned no statistics")]
    NoData,

    #[error("invalid timestamp {0}")]
    Timestamp(i64),
}

/// Client for the pool's miner statistics endpoint.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl Client {
    /// Create a client for [`DEFAULT_BASE_URL`].
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self { http, base_url })
    }

    fn stats_url(&self, rig_id: &str) -> String {
        format!("{}/miner/{}/currentStats", self.base_url, rig_id)
    }

    /// Fetch the raw statistics for a miner.
    pub async fn get_stats(&self, rig_id: &str) -> std::result::Result<Statistics, FetchError> {
        let url = self.stats_url(rig_id);
        trace!(url = %url, "Requesting pool statistics");

        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let body: StatsResponse = response.json().await?;
        unwrap_response(body)
    }
}

#[async_trait]
impl StatsSource for Client {
    async fn fetch(&self, rig_id: &str) -> std::result::Result<Snapshot, FetchError> {
        let stats = self.get_stats(rig_id).await?;
        into_snapshot(stats)
    }
}

fn unwrap_response(body: StatsResponse) -> std::result::Result<Statistics, FetchError> {
    if body.status != "OK" {
        return Err(FetchError::Pool {
            status: body.status,
            message: body.error,
        });
    }
    body.data.ok_or(FetchError::NoData)
}

fn timestamp(secs: i64) -> std::result::Result<OffsetDateTime, FetchError> {
    OffsetDateTime::from_unix_timestamp(secs).map_err(|_| FetchError::Timestamp(secs))
}

/// Convert the wire representation into a snapshot.
pub fn into_snapshot(stats: Statistics) -> std::result::Result<Snapshot, FetchError> {
    Ok(Snapshot {
        sampled_at: timestamp(stats.time)?,
        last_seen: timestamp(stats.last_seen)?,
        reported_hashrate: HashRate::from_f64(stats.reported_hashrate.unwrap_or_default()),
        current_hashrate: HashRate::from_f64(stats.current_hashrate.unwrap_or_default()),
        average_hashrate: HashRate::from_f64(stats.average_hashrate.unwrap_or_default()),
        valid_shares: stats.valid_shares.unwrap_or_default(),
        invalid_shares: stats.invalid_shares.unwrap_or_default(),
        stale_shares: stats.stale_shares.unwrap_or_default(),
        active_workers: stats.active_workers.unwrap_or_default(),
    })
}
