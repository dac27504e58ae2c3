//! Value types shared across the crate.

mod debounced_alarm;
mod hashrate;
mod snapshot;

pub use debounced_alarm::{AlarmStatus, DebouncedAlarm};
pub use hashrate::HashRate;
pub use snapshot::Snapshot;
