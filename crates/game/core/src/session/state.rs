use std::fmt;

use crate::config::GameConfig;
use crate::history::RecentDiagnoses;
use crate::round::RoundData;
use crate::timer::Countdown;

/// Generation counter guarding asynchronous completions.
///
/// Bumped on every `start_game`, `next_round` and `return_to_menu`. Fetch
/// results, timer ticks and deferred game-overs carry the epoch they were
/// issued under and are rejected once it no longer matches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Epoch(pub u64);

impl Epoch {
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GameStatus {
    #[default]
    Menu,
    LoadingRound,
    Playing,
    RoundOver,
    Reveal,
    GameOver,
}

/// Retry progress of the current fetch sequence, as shown on the loading screen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RetryState {
    /// Attempt that is about to run (1-based), or 0 before any retry.
    pub attempt: u32,
    pub attempts_remaining: u32,
    pub last_error: Option<String>,
}

/// Final numbers of a run, shown on the game-over screen.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameOverSummary {
    pub run_score: i64,
    pub high_score: i64,
    pub previous_high_score: i64,
    pub is_new_high_score: bool,
}

/// The single mutable aggregate owned by [`super::Session`].
#[derive(Clone, Debug)]
pub struct SessionState {
    pub status: GameStatus,
    pub epoch: Epoch,
    pub round: Option<RoundData>,
    pub run_score: i64,
    pub high_score: i64,
    pub health: u32,
    pub combo: u32,
    pub countdown: Countdown,
    pub retry: RetryState,
    /// Terminal fetch failure; set while halted in `LoadingRound`.
    pub load_error: Option<String>,
    /// Health ran out and the deferred transition to `GameOver` is scheduled.
    pub game_over_pending: bool,
    pub summary: Option<GameOverSummary>,
    pub history: RecentDiagnoses,
}

impl SessionState {
    pub(crate) fn new(config: &GameConfig, high_score: i64, history: RecentDiagnoses) -> Self {
        Self {
            status: GameStatus::Menu,
            epoch: Epoch::default(),
            round: None,
            run_score: 0,
            high_score,
            health: config.health.starting,
            combo: 0,
            countdown: Countdown::new(config.round_duration(), config.tick_interval()),
            retry: RetryState::default(),
            load_error: None,
            game_over_pending: false,
            summary: None,
            history,
        }
    }

    /// Tile clicks and timer ticks are only accepted in this state.
    pub fn accepts_input(&self) -> bool {
        self.status == GameStatus::Playing && !self.game_over_pending
    }
}
