//! SMS delivery through a Twilio-compatible Messages API.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use super::{Notifier, NotifyError};
use crate::error::Result;
use crate::tracing::prelude::*;

/// Default SMS gateway base URL.
pub const DEFAULT_GATEWAY_URL: &str = "https://api.twilio.com";

/// Alphanumeric sender shown on the handset.
pub const DEFAULT_SENDER: &str = "RigWatcher";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Gateway account credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct SmsCredentials {
    pub account_id: String,
    pub access_key: String,
    pub sender: String,
}

// Keep the access key out of logs.
impl fmt::Debug for SmsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmsCredentials")
            .field("account_id", &self.account_id)
            .field("access_key", &"<redacted>")
            .field("sender", &self.sender)
            .finish()
    }
}

/// Sends each alert as a text message.
#[derive(Debug, Clone)]
pub struct SmsNotifier {
    http: reqwest::Client,
    base_url: String,
    credentials: SmsCredentials,
}

impl SmsNotifier {
    pub fn new(credentials: SmsCredentials) -> Result<Self> {
        Self::with_base_url(credentials, DEFAULT_GATEWAY_URL)
    }

    pub fn with_base_url(credentials: SmsCredentials, base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self {
            http,
            base_url,
            credentials,
        })
    }

    fn request(&self, recipient: &str, message: &str) -> reqwest::RequestBuilder {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.credentials.account_id
        );
        self.http
            .post(url)
            .basic_auth(
                &self.credentials.account_id,
                Some(&self.credentials.access_key),
            )
            .form(&[
                ("To", recipient),
                ("From", self.credentials.sender.as_str()),
                ("Body", message),
            ])
    }
}

#[async_trait]
impl Notifier for SmsNotifier {
    async fn send(&self, recipient: &str, message: &str) -> std::result::Result<(), NotifyError> {
        let response = self.request(recipient, message).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected { status, body });
        }

        info!(to = %recipient, body = %message, "Sent alert");
        Ok(())
    }
}
