//! Crate-level error type.
//!
//! Tick-time failures (fetching, notifying) are recovered inside the
//! monitor and never reach this type. It only covers startup: building
//! HTTP clients and reading configuration.

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
