//! Round session state machine.
//!
//! [`Session`] owns the single [`SessionState`] aggregate. Every command or
//! asynchronous completion goes through a method that either rejects it with
//! a [`SessionError`] or mutates the state and returns the [`Effect`]s the
//! runtime must perform (fetch, timer control, persistence, feedback).
//!
//! ```text
//! Menu ──start──▶ LoadingRound ──loaded / permanent failure──▶ Playing
//!                     │ transient failure: halt with error
//! Playing ──timer / all found──▶ RoundOver ──reveal──▶ Reveal
//! Playing ──health 0 (deferred)──▶ GameOver ──try again──▶ LoadingRound
//! RoundOver | Reveal ──next──▶ LoadingRound
//! any ──menu──▶ Menu
//! ```
mod effect;
mod error;
mod snapshot;
mod state;

pub use effect::{Effect, Feedback, RetryNotice, RoundFailure};
pub use error::SessionError;
pub use snapshot::{LoadingView, SessionSnapshot};
pub use state::{Epoch, GameOverSummary, GameStatus, RetryState, SessionState};

use crate::config::GameConfig;
use crate::history::RecentDiagnoses;
use crate::round::{RoundData, TileId, TileState};
use crate::scoring::{BonusKind, Pick, evaluate_pick};
use crate::timer::{Countdown, TickOutcome};

pub type Result<T> = std::result::Result<T, SessionError>;

/// Controller for one application session (many runs, many rounds).
#[derive(Clone, Debug)]
pub struct Session {
    config: GameConfig,
    fallback: RoundData,
    state: SessionState,
}

impl Session {
    /// Creates a session sitting in the menu.
    ///
    /// `fallback` is served whenever the provider fails permanently or
    /// returns content that does not validate.
    pub fn new(
        config: GameConfig,
        fallback: RoundData,
        high_score: i64,
        history: RecentDiagnoses,
    ) -> Self {
        let state = SessionState::new(&config, high_score, history);
        Self {
            config,
            fallback,
            state,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(self)
    }

    // ===== player commands =====

    /// Starts a new run from the menu.
    pub fn start_game(&mut self) -> Result<Vec<Effect>> {
        self.expect_status("start a game", &[GameStatus::Menu, GameStatus::GameOver])?;
        Ok(self.begin_run())
    }

    /// Restarts after a game over; same as starting from the menu.
    pub fn try_again(&mut self) -> Result<Vec<Effect>> {
        self.expect_status("try again", &[GameStatus::GameOver])?;
        Ok(self.begin_run())
    }

    /// Fetches the next round of the current run, keeping score and health.
    pub fn next_round(&mut self) -> Result<Vec<Effect>> {
        self.expect_status(
            "start the next round",
            &[GameStatus::RoundOver, GameStatus::Reveal],
        )?;
        Ok(self.begin_fetch())
    }

    /// Shows every relevant tile as correct. Informational only.
    pub fn reveal(&mut self) -> Result<Vec<Effect>> {
        self.expect_status("reveal answers", &[GameStatus::RoundOver])?;

        if let Some(round) = self.state.round.as_mut() {
            for tile in round.tiles.iter_mut().filter(|tile| tile.is_relevant) {
                tile.state = TileState::Correct;
            }
        }
        self.state.status = GameStatus::Reveal;
        Ok(Vec::new())
    }

    /// Abandons whatever is in progress and returns to the menu.
    ///
    /// Idempotent in the menu. Bumps the epoch so pending fetches, ticks and
    /// deferred game-overs from the abandoned screen are discarded.
    pub fn return_to_menu(&mut self) -> Result<Vec<Effect>> {
        if self.state.status == GameStatus::Menu {
            return Ok(Vec::new());
        }

        let mut effects = Vec::new();
        if self.state.status == GameStatus::Playing {
            effects.push(Effect::StopTimer);
        }

        self.state.epoch = self.state.epoch.next();
        self.state.status = GameStatus::Menu;
        self.state.round = None;
        self.state.game_over_pending = false;
        self.state.load_error = None;
        self.state.retry = RetryState::default();
        Ok(effects)
    }

    /// Handles a click on tile `id`.
    pub fn pick_tile(&mut self, id: &TileId) -> Result<Vec<Effect>> {
        if !self.state.accepts_input() {
            return Err(SessionError::NotAcceptingInput {
                status: self.state.status,
            });
        }

        let round = self
            .state
            .round
            .as_mut()
            .ok_or(SessionError::NotAcceptingInput {
                status: self.state.status,
            })?;
        let tile = round
            .tiles
            .iter_mut()
            .find(|tile| &tile.id == id)
            .ok_or_else(|| SessionError::UnknownTile(id.clone()))?;
        if !tile.is_idle() {
            return Err(SessionError::TileAlreadyResolved(id.clone()));
        }

        let pick = if tile.is_relevant {
            tile.state = TileState::Correct;
            Pick::Correct {
                completes_round: !round
                    .tiles
                    .iter()
                    .any(|tile| tile.is_relevant && tile.is_idle()),
                relevant_total: round.relevant_count(),
            }
        } else {
            tile.state = TileState::Incorrect;
            Pick::Incorrect
        };

        let outcome = evaluate_pick(&self.config, pick, self.state.combo, self.state.health);
        self.state.run_score += outcome.score_delta;
        self.state.combo = outcome.combo_after;
        self.state.health = outcome.health_after;

        let mut effects = vec![Effect::Feedback(Feedback::Score {
            amount: outcome.base_score(),
            kind: None,
        })];
        for bonus in &outcome.bonuses {
            let feedback = match bonus.kind {
                BonusKind::ComboHealth if bonus.amount == 0 => continue,
                BonusKind::ComboHealth => Feedback::Health {
                    amount: bonus.amount,
                },
                kind => Feedback::Score {
                    amount: bonus.amount,
                    kind: Some(kind),
                },
            };
            effects.push(Effect::Feedback(feedback));
        }
        if outcome.health_delta < 0 {
            effects.push(Effect::Feedback(Feedback::Health {
                amount: outcome.health_delta,
            }));
        }

        if outcome.depletes_health() {
            self.state.game_over_pending = true;
            effects.push(Effect::StopTimer);
            effects.push(Effect::ScheduleGameOver {
                epoch: self.state.epoch,
                delay: self.config.game_over_delay(),
            });
        } else if let Pick::Correct {
            completes_round: true,
            ..
        } = pick
        {
            effects.extend(self.finish_round());
        }

        Ok(effects)
    }

    /// Clears the player's recent-diagnosis history.
    pub fn clear_history(&mut self) -> Vec<Effect> {
        self.state.history.clear();
        vec![Effect::PersistHistory(Vec::new())]
    }

    // ===== asynchronous completions =====

    /// Provider returned content for the fetch issued under `epoch`.
    pub fn round_loaded(&mut self, epoch: Epoch, round: RoundData) -> Result<Vec<Effect>> {
        self.expect_pending_fetch(epoch)?;

        let round = round.normalized(&self.config);
        match round.validate(&self.config) {
            Ok(()) => {
                self.state.history.record(&round.diagnosis);
                let mut effects = vec![Effect::PersistHistory(self.state.history.to_vec())];
                effects.extend(self.enter_playing(round));
                Ok(effects)
            }
            Err(error) => Ok(self.enter_fallback(format!("invalid round content: {error}"))),
        }
    }

    /// The retry policy is about to wait before another attempt.
    pub fn retry_scheduled(&mut self, epoch: Epoch, notice: RetryNotice) -> Result<Vec<Effect>> {
        self.expect_pending_fetch(epoch)?;

        self.state.retry = RetryState {
            attempt: notice.next_attempt,
            attempts_remaining: notice.attempts_remaining,
            last_error: Some(notice.error),
        };
        Ok(Vec::new())
    }

    /// The fetch issued under `epoch` failed for good.
    ///
    /// Transient failures halt in `LoadingRound` with the error shown; only
    /// returning to the menu leaves that state. Permanent failures play the
    /// offline fallback round instead.
    pub fn round_failed(&mut self, epoch: Epoch, failure: RoundFailure) -> Result<Vec<Effect>> {
        self.expect_pending_fetch(epoch)?;

        if failure.transient {
            self.state.retry.attempts_remaining = 0;
            self.state.retry.last_error = Some(failure.message.clone());
            self.state.load_error = Some(failure.message);
            Ok(Vec::new())
        } else {
            Ok(self.enter_fallback(failure.message))
        }
    }

    /// One timer tick for the round started under `epoch`.
    pub fn tick(&mut self, epoch: Epoch) -> Result<Vec<Effect>> {
        self.expect_current(epoch)?;
        if !self.state.accepts_input() {
            return Err(SessionError::NotAcceptingInput {
                status: self.state.status,
            });
        }

        match self.state.countdown.tick() {
            TickOutcome::Expired => Ok(self.finish_round()),
            TickOutcome::Running | TickOutcome::AlreadyExpired => Ok(Vec::new()),
        }
    }

    /// Deferred transition scheduled when health ran out under `epoch`.
    pub fn game_over_due(&mut self, epoch: Epoch) -> Result<Vec<Effect>> {
        self.expect_current(epoch)?;
        if !self.state.game_over_pending {
            return Err(SessionError::NoPendingGameOver);
        }

        self.state.game_over_pending = false;
        self.state.status = GameStatus::GameOver;

        let previous = self.state.high_score;
        let run_score = self.state.run_score;
        let is_new_high_score = run_score > previous;
        let mut effects = Vec::new();
        if is_new_high_score {
            self.state.high_score = run_score;
            effects.push(Effect::PersistHighScore(run_score));
        }

        self.state.summary = Some(GameOverSummary {
            run_score,
            high_score: self.state.high_score,
            previous_high_score: previous,
            is_new_high_score,
        });
        Ok(effects)
    }

    // ===== internals =====

    fn begin_run(&mut self) -> Vec<Effect> {
        self.state.run_score = 0;
        self.state.health = self.config.health.starting.min(self.config.health.maximum);
        self.state.summary = None;
        self.begin_fetch()
    }

    fn begin_fetch(&mut self) -> Vec<Effect> {
        self.state.epoch = self.state.epoch.next();
        self.state.status = GameStatus::LoadingRound;
        self.state.round = None;
        self.state.combo = 0;
        self.state.game_over_pending = false;
        self.state.load_error = None;
        self.state.retry = RetryState::default();

        vec![Effect::FetchRound {
            epoch: self.state.epoch,
            recent: self.state.history.to_vec(),
        }]
    }

    fn enter_playing(&mut self, round: RoundData) -> Vec<Effect> {
        self.state.round = Some(round);
        self.state.countdown =
            Countdown::new(self.config.round_duration(), self.config.tick_interval());
        self.state.combo = 0;
        self.state.retry = RetryState::default();
        self.state.load_error = None;
        self.state.status = GameStatus::Playing;

        vec![Effect::StartTimer {
            epoch: self.state.epoch,
            interval: self.config.tick_interval(),
        }]
    }

    fn enter_fallback(&mut self, reason: String) -> Vec<Effect> {
        let mut effects = vec![Effect::FallbackUsed { reason }];
        effects.extend(self.enter_playing(self.fallback.clone().normalized(&self.config)));
        effects
    }

    /// Ends the round: relevant tiles never found are revealed as missed.
    fn finish_round(&mut self) -> Vec<Effect> {
        if let Some(round) = self.state.round.as_mut() {
            for tile in round
                .tiles
                .iter_mut()
                .filter(|tile| tile.is_relevant && tile.is_idle())
            {
                tile.state = TileState::Missed;
            }
        }
        self.state.status = GameStatus::RoundOver;
        vec![Effect::StopTimer]
    }

    fn expect_status(&self, command: &'static str, allowed: &[GameStatus]) -> Result<()> {
        if allowed.contains(&self.state.status) {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                command,
                status: self.state.status,
            })
        }
    }

    fn expect_current(&self, epoch: Epoch) -> Result<()> {
        if epoch == self.state.epoch {
            Ok(())
        } else {
            Err(SessionError::StaleEpoch {
                event: epoch,
                current: self.state.epoch,
            })
        }
    }

    fn expect_pending_fetch(&self, epoch: Epoch) -> Result<()> {
        self.expect_current(epoch)?;
        if self.state.status != GameStatus::LoadingRound || self.state.load_error.is_some() {
            return Err(SessionError::StaleEpoch {
                event: epoch,
                current: self.state.epoch,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::round::{Difficulty, Tile};

    fn round(name: &str) -> RoundData {
        let mut tiles: Vec<Tile> = (0..7)
            .map(|i| Tile::new(format!("r{i}"), format!("sign {i}"), true))
            .collect();
        tiles.extend((0..5).map(|i| Tile::new(format!("d{i}"), format!("distractor {i}"), false)));
        RoundData {
            diagnosis: name.into(),
            category: "Test".into(),
            difficulty: Difficulty::Easy,
            tiles,
        }
    }

    fn fallback() -> RoundData {
        round("Fallback")
    }

    fn new_session(high_score: i64) -> Session {
        Session::new(
            GameConfig::default(),
            fallback(),
            high_score,
            RecentDiagnoses::new(GameConfig::DEFAULT_RECENT_HISTORY_LIMIT),
        )
    }

    fn playing(session: &mut Session, name: &str) -> Epoch {
        let effects = match session.state().status {
            GameStatus::RoundOver | GameStatus::Reveal => session.next_round(),
            _ => session.start_game(),
        }
        .unwrap();
        let Effect::FetchRound { epoch, .. } = effects[0] else {
            panic!("expected a fetch, got {effects:?}");
        };
        session.round_loaded(epoch, round(name)).unwrap();
        epoch
    }

    fn pick(session: &mut Session, id: &str) -> Vec<Effect> {
        session.pick_tile(&TileId::new(id)).unwrap()
    }

    fn tile_state(session: &Session, id: &str) -> TileState {
        session
            .state()
            .round
            .as_ref()
            .unwrap()
            .tiles
            .iter()
            .find(|tile| tile.id.as_str() == id)
            .unwrap()
            .state
    }

    #[test]
    fn start_game_requests_round_with_history() {
        let mut session = new_session(0);
        session.state.history.record("Gout");

        let effects = session.start_game().unwrap();

        assert_eq!(session.state().status, GameStatus::LoadingRound);
        assert_eq!(
            effects,
            vec![Effect::FetchRound {
                epoch: Epoch(1),
                recent: vec!["Gout".to_string()],
            }]
        );
    }

    #[test]
    fn loaded_round_starts_timer_and_records_history() {
        let mut session = new_session(0);
        session.start_game().unwrap();

        let effects = session.round_loaded(Epoch(1), round("Asthma")).unwrap();

        assert_eq!(session.state().status, GameStatus::Playing);
        assert_eq!(session.state().countdown.remaining(), Duration::from_secs(15));
        assert_eq!(
            effects,
            vec![
                Effect::PersistHistory(vec!["Asthma".to_string()]),
                Effect::StartTimer {
                    epoch: Epoch(1),
                    interval: Duration::from_millis(100),
                },
            ]
        );
    }

    #[test]
    fn five_correct_then_one_incorrect() {
        let mut session = new_session(0);
        playing(&mut session, "Asthma");

        for id in ["r0", "r1", "r2", "r3", "r4"] {
            pick(&mut session, id);
        }
        assert_eq!(session.state().run_score, 50);
        assert_eq!(session.state().health, 100);
        assert_eq!(session.state().combo, 5);

        let effects = pick(&mut session, "d0");
        assert_eq!(session.state().run_score, 40);
        assert_eq!(session.state().health, 85);
        assert_eq!(session.state().combo, 0);
        assert_eq!(
            effects,
            vec![
                Effect::Feedback(Feedback::Score {
                    amount: -10,
                    kind: None
                }),
                Effect::Feedback(Feedback::Health { amount: -15 }),
            ]
        );
    }

    #[test]
    fn score_may_go_negative() {
        let mut session = new_session(0);
        playing(&mut session, "Asthma");
        pick(&mut session, "d0");
        pick(&mut session, "d1");
        assert_eq!(session.state().run_score, -20);
    }

    #[test]
    fn resolved_tiles_are_immutable() {
        let mut session = new_session(0);
        playing(&mut session, "Asthma");
        pick(&mut session, "d0");

        let err = session.pick_tile(&TileId::new("d0")).unwrap_err();
        assert_eq!(err, SessionError::TileAlreadyResolved(TileId::new("d0")));
        assert_eq!(session.state().run_score, -10);
        assert_eq!(tile_state(&session, "d0"), TileState::Incorrect);

        assert_eq!(
            session.pick_tile(&TileId::new("nope")).unwrap_err(),
            SessionError::UnknownTile(TileId::new("nope"))
        );
    }

    #[test]
    fn timer_expiry_reveals_only_idle_relevant_tiles() {
        let mut session = new_session(0);
        let epoch = playing(&mut session, "Asthma");
        pick(&mut session, "r0");
        pick(&mut session, "d0");

        let mut effects = Vec::new();
        for _ in 0..150 {
            effects = session.tick(epoch).unwrap();
        }

        assert_eq!(effects, vec![Effect::StopTimer]);
        assert_eq!(session.state().status, GameStatus::RoundOver);
        assert_eq!(session.state().health, 85);
        assert_eq!(tile_state(&session, "r0"), TileState::Correct);
        assert_eq!(tile_state(&session, "d0"), TileState::Incorrect);
        for i in 1..7 {
            assert_eq!(tile_state(&session, &format!("r{i}")), TileState::Missed);
        }
        for i in 1..5 {
            assert_eq!(tile_state(&session, &format!("d{i}")), TileState::Idle);
        }

        assert!(matches!(
            session.tick(epoch),
            Err(SessionError::NotAcceptingInput { .. })
        ));
        assert!(matches!(
            session.pick_tile(&TileId::new("r1")),
            Err(SessionError::NotAcceptingInput { .. })
        ));
    }

    #[test]
    fn finding_every_relevant_tile_without_mistakes_is_perfect() {
        let mut session = new_session(0);
        playing(&mut session, "Asthma");

        let mut last = Vec::new();
        for i in 0..7 {
            last = pick(&mut session, &format!("r{i}"));
        }

        // 7 * 5 + combo bonus at 5 + perfect round.
        assert_eq!(session.state().run_score, 35 + 25 + 100);
        assert_eq!(session.state().status, GameStatus::RoundOver);
        assert!(last.contains(&Effect::Feedback(Feedback::Score {
            amount: 100,
            kind: Some(BonusKind::PerfectRound),
        })));
        assert_eq!(last.last(), Some(&Effect::StopTimer));
    }

    #[test]
    fn completing_after_a_mistake_is_not_perfect() {
        let mut session = new_session(0);
        playing(&mut session, "Asthma");
        pick(&mut session, "d0");
        for i in 0..7 {
            pick(&mut session, &format!("r{i}"));
        }

        assert_eq!(session.state().run_score, -10 + 35 + 25);
        assert_eq!(session.state().status, GameStatus::RoundOver);
    }

    #[test]
    fn depleted_health_defers_game_over_and_blocks_timer_expiry() {
        let mut session = new_session(0);
        let epoch = playing(&mut session, "Asthma");
        session.state.health = 15;
        session.state.countdown = Countdown::new(Duration::from_millis(100), Duration::from_millis(100));

        let effects = pick(&mut session, "d0");
        assert_eq!(session.state().health, 0);
        assert!(session.state().game_over_pending);
        assert!(effects.contains(&Effect::StopTimer));
        assert!(effects.contains(&Effect::ScheduleGameOver {
            epoch,
            delay: Duration::from_millis(100),
        }));

        // A tick queued in the same window must not end the round instead.
        assert!(session.tick(epoch).is_err());
        assert!(session.pick_tile(&TileId::new("r0")).is_err());
        assert_eq!(session.state().status, GameStatus::Playing);

        session.game_over_due(epoch).unwrap();
        assert_eq!(session.state().status, GameStatus::GameOver);
        assert_eq!(
            session.state().summary,
            Some(GameOverSummary {
                run_score: -10,
                high_score: 0,
                previous_high_score: 0,
                is_new_high_score: false,
            })
        );
    }

    #[test]
    fn menu_before_deferred_game_over_wins() {
        let mut session = new_session(0);
        let epoch = playing(&mut session, "Asthma");
        session.state.health = 10;
        pick(&mut session, "d0");

        let effects = session.return_to_menu().unwrap();
        assert_eq!(effects, vec![Effect::StopTimer]);

        assert!(matches!(
            session.game_over_due(epoch),
            Err(SessionError::StaleEpoch { .. })
        ));
        assert_eq!(session.state().status, GameStatus::Menu);
    }

    #[test]
    fn high_score_updates_only_when_beaten() {
        let mut session = new_session(30);
        let epoch = playing(&mut session, "Asthma");
        for i in 0..5 {
            pick(&mut session, &format!("r{i}"));
        }
        session.state.health = 15;
        pick(&mut session, "d0");
        let effects = session.game_over_due(epoch).unwrap();

        assert_eq!(effects, vec![Effect::PersistHighScore(40)]);
        let summary = session.state().summary.clone().unwrap();
        assert!(summary.is_new_high_score);
        assert_eq!(summary.previous_high_score, 30);
        assert_eq!(session.state().high_score, 40);

        // A worse run leaves the record alone.
        session.try_again().unwrap();
        let epoch = session.state().epoch;
        session.round_loaded(epoch, round("Gout")).unwrap();
        session.state.health = 15;
        pick(&mut session, "d0");
        let effects = session.game_over_due(epoch).unwrap();
        assert!(effects.is_empty());
        assert_eq!(session.state().high_score, 40);
        assert_eq!(session.state().run_score, -10);
    }

    #[test]
    fn next_round_keeps_run_but_resets_round() {
        let mut session = new_session(0);
        let first = playing(&mut session, "Asthma");
        pick(&mut session, "r0");
        pick(&mut session, "d0");
        for _ in 0..150 {
            let _ = session.tick(first);
        }
        assert_eq!(session.state().status, GameStatus::RoundOver);

        let effects = session.next_round().unwrap();
        let second = session.state().epoch;
        assert_ne!(first, second);
        assert_eq!(
            effects,
            vec![Effect::FetchRound {
                epoch: second,
                recent: vec!["Asthma".to_string()],
            }]
        );
        assert_eq!(session.state().run_score, -5);
        assert_eq!(session.state().health, 85);
        assert_eq!(session.state().combo, 0);

        // Ticks left over from the first round are stale.
        assert!(matches!(
            session.tick(first),
            Err(SessionError::StaleEpoch { .. })
        ));

        session.round_loaded(second, round("Gout")).unwrap();
        assert_eq!(session.state().countdown.remaining(), Duration::from_secs(15));
        assert_eq!(session.state().history.as_slice(), ["Gout", "Asthma"]);
    }

    #[test]
    fn reveal_shows_all_relevant_tiles() {
        let mut session = new_session(0);
        let epoch = playing(&mut session, "Asthma");
        pick(&mut session, "d1");
        for _ in 0..150 {
            let _ = session.tick(epoch);
        }
        let score = session.state().run_score;

        session.reveal().unwrap();
        assert_eq!(session.state().status, GameStatus::Reveal);
        for i in 0..7 {
            assert_eq!(tile_state(&session, &format!("r{i}")), TileState::Correct);
        }
        assert_eq!(tile_state(&session, "d1"), TileState::Incorrect);
        assert_eq!(session.state().run_score, score);

        session.next_round().unwrap();
        assert_eq!(session.state().status, GameStatus::LoadingRound);
    }

    #[test]
    fn permanent_failure_plays_fallback_without_recording_it() {
        let mut session = new_session(0);
        session.start_game().unwrap();

        let effects = session
            .round_failed(Epoch(1), RoundFailure::permanent("bad api key"))
            .unwrap();

        assert_eq!(session.state().status, GameStatus::Playing);
        assert!(matches!(effects[0], Effect::FallbackUsed { .. }));
        assert_eq!(
            session.state().round.as_ref().unwrap().diagnosis,
            "Fallback"
        );
        assert!(session.state().history.is_empty());
    }

    #[test]
    fn invalid_content_falls_back() {
        let mut session = new_session(0);
        session.start_game().unwrap();
        let mut broken = round("Broken");
        broken.tiles.truncate(4);

        let effects = session.round_loaded(Epoch(1), broken).unwrap();

        assert!(matches!(effects[0], Effect::FallbackUsed { .. }));
        assert_eq!(
            session.state().round.as_ref().unwrap().diagnosis,
            "Fallback"
        );
    }

    #[test]
    fn transient_failure_halts_until_menu() {
        let mut session = new_session(0);
        session.start_game().unwrap();
        session
            .retry_scheduled(
                Epoch(1),
                RetryNotice {
                    next_attempt: 2,
                    attempts_remaining: 2,
                    error: "timeout".into(),
                },
            )
            .unwrap();
        assert_eq!(
            session.snapshot().loading,
            Some(LoadingView::Retrying {
                attempt: 2,
                total: 3,
                last_error: "timeout".into(),
            })
        );

        let effects = session
            .round_failed(Epoch(1), RoundFailure::transient("network error"))
            .unwrap();

        assert!(effects.is_empty());
        assert_eq!(session.state().status, GameStatus::LoadingRound);
        assert_eq!(
            session.snapshot().loading,
            Some(LoadingView::Failed {
                message: "network error".into()
            })
        );
        assert!(session.next_round().is_err());
        assert!(session.start_game().is_err());

        session.return_to_menu().unwrap();
        assert_eq!(session.state().status, GameStatus::Menu);
        assert_eq!(session.snapshot().loading, None);
    }

    #[test]
    fn late_fetch_result_is_ignored_after_leaving() {
        let mut session = new_session(0);
        session.start_game().unwrap();
        session.return_to_menu().unwrap();
        session.start_game().unwrap();
        assert_eq!(session.state().epoch, Epoch(3));

        let err = session.round_loaded(Epoch(1), round("Late")).unwrap_err();
        assert!(err.is_ignorable());
        assert_eq!(session.state().status, GameStatus::LoadingRound);
        assert!(session.state().round.is_none());
    }

    #[test]
    fn invalid_commands_are_rejected() {
        let mut session = new_session(0);
        assert!(matches!(
            session.next_round(),
            Err(SessionError::InvalidTransition { .. })
        ));
        assert!(session.reveal().is_err());
        assert!(session.try_again().is_err());
        assert_eq!(session.return_to_menu(), Ok(Vec::new()));
    }

    #[test]
    fn health_and_combo_stay_in_bounds_over_long_runs() {
        let mut session = new_session(0);
        let mut seed: u64 = 0x5eed;
        let mut rounds = 0;

        while rounds < 40 {
            match session.state().status {
                GameStatus::Menu | GameStatus::GameOver => {
                    let effects = session.start_game().unwrap();
                    let Effect::FetchRound { epoch, .. } = effects[0] else {
                        unreachable!()
                    };
                    session.round_loaded(epoch, round("Asthma")).unwrap();
                }
                GameStatus::RoundOver => {
                    rounds += 1;
                    playing(&mut session, "Asthma");
                }
                GameStatus::Playing if session.state().game_over_pending => {
                    let epoch = session.state().epoch;
                    session.game_over_due(epoch).unwrap();
                }
                GameStatus::Playing => {
                    seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                    let index = (seed >> 33) as usize % 12;
                    let id = session.state().round.as_ref().unwrap().tiles[index].id.clone();
                    let combo_before = session.state().combo;
                    let relevant = session.state().round.as_ref().unwrap().tiles[index].is_relevant;
                    if session.pick_tile(&id).is_ok() {
                        if relevant {
                            assert_eq!(session.state().combo, combo_before + 1);
                        } else {
                            assert_eq!(session.state().combo, 0);
                        }
                    }
                }
                other => panic!("unexpected status {other}"),
            }
            assert!(session.state().health <= 100);
        }
    }
}
