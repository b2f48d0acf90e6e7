//! Round countdown measured in whole milliseconds.
//!
//! The countdown only models the remaining time. Scheduling ticks belongs to
//! the runtime, which starts and stops its ticker on the session's
//! `StartTimer` / `StopTimer` effects.
use std::time::Duration;

/// Result of advancing the countdown by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Running,
    /// Time reached zero on this tick. Reported once per countdown.
    Expired,
    /// The countdown had already expired; nothing changed.
    AlreadyExpired,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Countdown {
    remaining_ms: u64,
    tick_ms: u64,
    expired: bool,
}

impl Countdown {
    pub fn new(duration: Duration, tick: Duration) -> Self {
        Self {
            remaining_ms: duration.as_millis() as u64,
            tick_ms: (tick.as_millis() as u64).max(1),
            expired: false,
        }
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.expired {
            return TickOutcome::AlreadyExpired;
        }

        self.remaining_ms = self.remaining_ms.saturating_sub(self.tick_ms);
        if self.remaining_ms == 0 {
            self.expired = true;
            TickOutcome::Expired
        } else {
            TickOutcome::Running
        }
    }

    pub fn remaining(&self) -> Duration {
        Duration::from_millis(self.remaining_ms)
    }

    /// Remaining time in seconds, as displayed by the circular timer.
    pub fn remaining_secs(&self) -> f32 {
        self.remaining_ms as f32 / 1000.0
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }
}
