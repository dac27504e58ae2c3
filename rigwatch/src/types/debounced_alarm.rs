//! A one-shot alarm that fires once a condition has persisted for a
//! debounce duration.
//!
//! The debounce window is measured from the last instant the condition
//! was observed clear, not from the first instant it was observed true.
//! An alarm created at startup therefore counts startup as "clear".
//!
//! # State Machine
//!
//! ```text
//!               check(true), within window
//!            ┌──────────────────────────────┐
//!            ▼                              │
//!  Clear(since) ────────────────────────────┘
//!     ▲   │
//!     │   │ check(true), now - since >= debounce
//!     │   ▼
//!     │  Fired ──── check(true) ───► Fired (suppressed)
//!     │   │
//!     └───┘ check(false)
//! ```
//!
//! `check()` returns an [`AlarmStatus`] describing the transition so
//! callers can act on exactly the edges they care about (typically
//! `Triggered`).

use std::time::Duration;

use tokio::time::Instant;

/// Result of [`DebouncedAlarm::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmStatus {
    /// Condition is clear. Nothing to do.
    Idle,

    /// Condition holds but the debounce window has not elapsed.
    Pending,

    /// Debounce elapsed -- alarm just triggered. Returned exactly
    /// once per episode.
    Triggered,

    /// Already triggered, condition still holds. Suppressed.
    Active,

    /// Was triggered, condition just cleared. Returned exactly once.
    Resolved,
}

impl AlarmStatus {
    /// True once the debounce window has elapsed in this episode.
    pub fn is_raised(self) -> bool {
        matches!(self, AlarmStatus::Triggered | AlarmStatus::Active)
    }
}

/// A one-shot alarm with debounce.
///
/// Callers pass the current instant into every call, so the alarm never
/// reads the clock itself.
#[derive(Debug, Clone)]
pub struct DebouncedAlarm {
    debounce: Duration,
    last_clear: Instant,
    fired: bool,
}

impl DebouncedAlarm {
    /// Create an alarm whose condition is considered clear at `now`.
    pub fn new(debounce: Duration, now: Instant) -> Self {
        Self {
            debounce,
            last_clear: now,
            fired: false,
        }
    }

    /// Update the alarm with the current condition.
    ///
    /// | Previous state | condition | Result |
    /// |----------------|-----------|--------|
    /// | Clear | false | `Idle` (moves `last_clear` to `now`) |
    /// | Clear | true | `Pending` or `Triggered` |
    /// | Fired | false | `Resolved` (re-arms) |
    /// | Fired | true | `Active` (suppressed) |
    pub fn check(&mut self, condition: bool, now: Instant) -> AlarmStatus {
        if !condition {
            self.last_clear = self.last_clear.max(now);
            return if std::mem::take(&mut self.fired) {
                AlarmStatus::Resolved
            } else {
                AlarmStatus::Idle
            };
        }

        if self.fired {
            return AlarmStatus::Active;
        }

        if self.elapsed_since_clear(now) >= self.debounce {
            self.fired = true;
            AlarmStatus::Triggered
        } else {
            AlarmStatus::Pending
        }
    }

    /// Last instant the condition was observed clear.
    pub fn last_clear(&self) -> Instant {
        self.last_clear
    }

    /// Time the condition has held as of `now`.
    pub fn elapsed_since_clear(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_clear)
    }

    /// Whether the alarm has fired in the current episode.
    pub fn is_fired(&self) -> bool {
        self.fired
    }
}
