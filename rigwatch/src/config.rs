//! Daemon configuration, read once from the environment at startup.
//!
//! | Variable                      | Required         | Default                      |
//! |-------------------------------|------------------|------------------------------|
//! | `RIGWATCH_MINER_ID`           | yes              | --                           |
//! | `RIGWATCH_RECIPIENTS`         | yes              | -- (comma separated numbers) |
//! | `RIGWATCH_SMS_ACCOUNT_ID`     | unless dry run   | --                           |
//! | `RIGWATCH_SMS_ACCESS_KEY`     | unless dry run   | --                           |
//! | `RIGWATCH_SMS_SENDER`         | no               | `RigWatcher`                 |
//! | `RIGWATCH_POOL_URL`           | no               | `https://api.ethermine.org`  |
//! | `RIGWATCH_POLL_INTERVAL_SECS` | no               | `120`                        |
//! | `RIGWATCH_DRY_RUN`            | no               | off                          |

use std::time::Duration;

use crate::api_client::DEFAULT_BASE_URL;
use crate::error::Result;
use crate::monitor::DEFAULT_POLL_INTERVAL;
use crate::notify::{DEFAULT_SENDER, SmsCredentials};

pub const MINER_ID: &str = "RIGWATCH_MINER_ID";
pub const RECIPIENTS: &str = "RIGWATCH_RECIPIENTS";
pub const SMS_ACCOUNT_ID: &str = "RIGWATCH_SMS_ACCOUNT_ID";
pub const SMS_ACCESS_KEY: &str = "RIGWATCH_SMS_ACCESS_KEY";
pub const SMS_SENDER: &str = "RIGWATCH_SMS_SENDER";
pub const POOL_URL: &str = "RIGWATCH_POOL_URL";
pub const POLL_INTERVAL_SECS: &str = "RIGWATCH_POLL_INTERVAL_SECS";
pub const DRY_RUN: &str = "RIGWATCH_DRY_RUN";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{name} has invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Miner (wallet) identifier at the pool.
    pub miner_id: String,
    /// Alert recipients, never empty.
    pub recipients: Vec<String>,
    pub pool_url: String,
    pub poll_interval: Duration,
    /// `None` in dry-run mode: alerts are only logged.
    pub sms: Option<SmsCredentials>,
}

impl Config {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self::from_lookup(|name| std::env::var(name).ok())?)
    }

    /// Read the configuration through `lookup`, which returns the value
    /// of a variable if it is set.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> std::result::Result<Self, ConfigError> {
        let get = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let miner_id = require(MINER_ID)?;

        let raw_recipients = require(RECIPIENTS)?;
        let recipients: Vec<String> = raw_recipients
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(String::from)
            .collect();
        if recipients.is_empty() {
            return Err(ConfigError::Invalid {
                name: RECIPIENTS,
                value: raw_recipients,
                reason: "no recipients listed",
            });
        }

        let poll_interval = match get(POLL_INTERVAL_SECS) {
            None => DEFAULT_POLL_INTERVAL,
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        name: POLL_INTERVAL_SECS,
                        value,
                        reason: "expected a positive number of seconds",
                    });
                }
            },
        };

        let dry_run = match get(DRY_RUN).as_deref() {
            None | Some("0" | "false") => false,
            Some("1" | "true") => true,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: DRY_RUN,
                    value: other.to_string(),
                    reason: "expected 1, 0, true or false",
                });
            }
        };

        let sms = if dry_run {
            None
        } else {
            Some(SmsCredentials {
                account_id: require(SMS_ACCOUNT_ID)?,
                access_key: require(SMS_ACCESS_KEY)?,
                sender: get(SMS_SENDER).unwrap_or_else(|| DEFAULT_SENDER.to_string()),
            })
        };

        Ok(Self {
            miner_id,
            recipients,
            pool_url: get(POOL_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            poll_interval,
            sms,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![
            (MINER_ID, "0xdeadbeef"),
            (RECIPIENTS, "+46701234567"),
            (SMS_ACCOUNT_ID, "AC123"),
            (SMS_ACCESS_KEY, "s3cret"),
        ]
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = Config::from_lookup(lookup(&minimal())).unwrap();

        assert_eq!(config.miner_id, "0xdeadbeef");
        assert_eq!(config.recipients, vec!["+46701234567"]);
        assert_eq!(config.pool_url, DEFAULT_BASE_URL);
        assert_eq!(config.poll_interval, Duration::from_secs(120));
        assert_eq!(
            config.sms,
            Some(SmsCredentials {
                account_id: "AC123".into(),
                access_key: "s3cret".into(),
                sender: "RigWatcher".into(),
            })
        );
    }

    #[test]
    fn recipients_are_split_and_trimmed() {
        let mut vars = minimal();
        vars.push((RECIPIENTS, " +4611 , +4622,, "));
        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.recipients, vec!["+4611", "+4622"]);
    }

    #[test]
    fn empty_recipient_list_is_rejected() {
        let mut vars = minimal();
        vars.push((RECIPIENTS, " , ,"));
        assert!(matches!(
            Config::from_lookup(lookup(&vars)),
            Err(ConfigError::Invalid { name: RECIPIENTS, .. })
        ));
    }

    #[test]
    fn missing_miner_id_is_reported() {
        let vars: Vec<_> = minimal()
            .into_iter()
            .filter(|(k, _)| *k != MINER_ID)
            .collect();
        assert_eq!(
            Config::from_lookup(lookup(&vars)),
            Err(ConfigError::Missing(MINER_ID))
        );
    }

    #[test]
    fn credentials_required_unless_dry_run() {
        let vars = [(MINER_ID, "0xdeadbeef"), (RECIPIENTS, "+4611")];
        assert_eq!(
            Config::from_lookup(lookup(&vars)),
            Err(ConfigError::Missing(SMS_ACCOUNT_ID))
        );

        let vars = [
            (MINER_ID, "0xdeadbeef"),
            (RECIPIENTS, "+4611"),
            (DRY_RUN, "true"),
        ];
        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.sms, None);
    }

    #[test]
    fn poll_interval_must_be_positive() {
        let mut vars = minimal();
        vars.push((POLL_INTERVAL_SECS, "0"));
        assert!(matches!(
            Config::from_lookup(lookup(&vars)),
            Err(ConfigError::Invalid { name: POLL_INTERVAL_SECS, .. })
        ));

        let mut vars = minimal();
        vars.push((POLL_INTERVAL_SECS, "30"));
        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.poll_interval, Duration::from_secs(30));
    }

    #[test]
    fn custom_sender_and_pool_url() {
        let mut vars = minimal();
        vars.push((SMS_SENDER, "MyRig"));
        vars.push((POOL_URL, "http://localhost:9000"));
        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.pool_url, "http://localhost:9000");
        assert_eq!(config.sms.unwrap().sender, "MyRig");
    }
}
