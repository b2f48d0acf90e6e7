use crate::config::HealthZone;
use crate::round::{Difficulty, Tile};

use super::Session;
use super::state::{Epoch, GameOverSummary, GameStatus};

/// What the loading screen should show.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LoadingView {
    Fetching,
    Retrying {
        attempt: u32,
        total: u32,
        last_error: String,
    },
    /// Retries exhausted; only returning to the menu is possible.
    Failed { message: String },
}

/// Read-only view of the session handed to presentation subscribers.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionSnapshot {
    pub status: GameStatus,
    pub epoch: Epoch,
    pub diagnosis: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub tiles: Vec<Tile>,
    pub run_score: i64,
    pub high_score: i64,
    pub health: u32,
    pub health_zone: HealthZone,
    pub combo: u32,
    pub time_remaining_secs: f32,
    pub loading: Option<LoadingView>,
    pub game_over_pending: bool,
    pub summary: Option<GameOverSummary>,
}

impl SessionSnapshot {
    pub(super) fn capture(session: &Session) -> Self {
        let state = session.state();
        let round = state.round.as_ref();

        let loading = (state.status == GameStatus::LoadingRound).then(|| {
            if let Some(message) = &state.load_error {
                LoadingView::Failed {
                    message: message.clone(),
                }
            } else if let Some(error) = &state.retry.last_error {
                LoadingView::Retrying {
                    attempt: state.retry.attempt,
                    total: state.retry.attempt + state.retry.attempts_remaining.saturating_sub(1),
                    last_error: error.clone(),
                }
            } else {
                LoadingView::Fetching
            }
        });

        Self {
            status: state.status,
            epoch: state.epoch,
            diagnosis: round.map(|r| r.diagnosis.clone()),
            category: round.map(|r| r.category.clone()),
            difficulty: round.map(|r| r.difficulty),
            tiles: round.map(|r| r.tiles.clone()).unwrap_or_default(),
            run_score: state.run_score,
            high_score: state.high_score,
            health: state.health,
            health_zone: session.config().health.zone(state.health),
            combo: state.combo,
            time_remaining_secs: state.countdown.remaining_secs(),
            loading,
            game_over_pending: state.game_over_pending,
            summary: state.summary.clone(),
        }
    }
}
