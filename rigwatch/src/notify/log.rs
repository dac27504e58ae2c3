use async_trait::async_trait;

use super::{Notifier, NotifyError};
use crate::tracing::prelude::*;

/// Writes alerts to the log instead of sending them. Used for dry runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, recipient: &str, message: &str) -> Result<(), NotifyError> {
        warn!(recipient = %recipient, "Alert (dry run): {}", message);
        Ok(())
    }
}
