//! Outbound alert delivery.
//!
//! A [`Notifier`] delivers one message to one recipient. [`dispatch`]
//! fans a message out to every recipient concurrently and isolates
//! failures, so one bad number never blocks the others.

mod log;
mod sms;

pub use log::LogNotifier;
pub use sms::{DEFAULT_SENDER, SmsCredentials, SmsNotifier};

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::StatusCode;

use crate::tracing::prelude::*;

/// Delivers alert text to a single recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, recipient: &str, message: &str) -> Result<(), NotifyError>;
}

/// Delivery failure for one recipient.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("gateway rejected message with HTTP {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

/// Outcome of sending one message to all recipients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Send `message` to every recipient.
///
/// Failures are logged per recipient and counted; they never abort the
/// remaining deliveries.
pub async fn dispatch(
    notifier: &dyn Notifier,
    recipients: &[String],
    message: &str,
) -> DispatchReport {
    let sends = recipients.iter().map(|recipient| async move {
        (recipient, notifier.send(recipient, message).await)
    });

    let mut report = DispatchReport::default();
    for (recipient, result) in join_all(sends).await {
        match result {
            Ok(()) => {
                debug!(recipient = %recipient, "Alert delivered");
                report.delivered += 1;
            }
            Err(e) => {
                warn!(recipient = %recipient, error = %e, "Alert delivery failed");
                report.failed += 1;
            }
        }
    }
    report
}
