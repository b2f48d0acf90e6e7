use std::time::Duration;

use crate::scoring::BonusKind;

use super::state::Epoch;

/// Side effect requested by a transition; executed by the runtime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Ask the round provider for content, excluding `recent` diagnoses.
    FetchRound { epoch: Epoch, recent: Vec<String> },
    /// Start ticking the countdown for the round loaded under `epoch`.
    StartTimer { epoch: Epoch, interval: Duration },
    /// Stop the ticker; no further tick may be delivered.
    StopTimer,
    /// Deliver `game_over_due(epoch)` after `delay`.
    ScheduleGameOver { epoch: Epoch, delay: Duration },
    PersistHighScore(i64),
    PersistHistory(Vec<String>),
    /// Transient floating feedback for the presentation layer.
    Feedback(Feedback),
    /// The offline fallback round replaced provider content.
    FallbackUsed { reason: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Feedback {
    /// Score change; `kind` is `None` for the base pick value.
    Score { amount: i64, kind: Option<BonusKind> },
    Health { amount: i64 },
}

/// Classified failure of a round fetch, after the retry policy gave up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundFailure {
    pub transient: bool,
    pub message: String,
}

impl RoundFailure {
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            transient: true,
            message: message.into(),
        }
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            transient: false,
            message: message.into(),
        }
    }
}

/// Progress report from the retry policy before a backoff wait.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryNotice {
    /// Attempt that will run after the wait (1-based).
    pub next_attempt: u32,
    pub attempts_remaining: u32,
    pub error: String,
}
