//! Session worker that owns the authoritative [`game_core::Session`].
//!
//! Commands from [`SessionHandle`](crate::api::SessionHandle) and completions
//! from the tasks it spawns (round fetch, countdown ticker, deferred game
//! over) are processed one at a time on this task, so session state has a
//! single writer. Every accepted transition publishes a snapshot to the
//! EventBus.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use game_core::{
    Effect, Epoch, GameStatus, RetryNotice, RoundData, RoundFailure, Session, SessionError,
    SessionSnapshot, TileId,
};

use crate::api::{ProviderError, Result, RoundProvider, RoundRequest};
use crate::events::{Event, EventBus};
use crate::profile::PlayerProfile;
use crate::retry::RetryPolicy;

/// Player-initiated session commands.
#[derive(Debug, Clone)]
pub(crate) enum PlayerCommand {
    StartGame,
    TryAgain,
    NextRound,
    Reveal,
    ReturnToMenu,
    PickTile(TileId),
    ClearHistory,
}

impl PlayerCommand {
    fn label(&self) -> &'static str {
        match self {
            Self::StartGame => "start game",
            Self::TryAgain => "try again",
            Self::NextRound => "next round",
            Self::Reveal => "reveal",
            Self::ReturnToMenu => "return to menu",
            Self::PickTile(_) => "pick tile",
            Self::ClearHistory => "clear history",
        }
    }
}

/// Commands that can be sent to the session worker
pub(crate) enum Command {
    Player {
        command: PlayerCommand,
        reply: oneshot::Sender<Result<()>>,
    },
    Rename {
        name: String,
        reply: oneshot::Sender<Result<String>>,
    },
    Username {
        reply: oneshot::Sender<String>,
    },
    QuerySnapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Shutdown,
}

/// Results delivered back to the worker by the tasks it spawned.
enum Completion {
    RoundFetched {
        epoch: Epoch,
        result: std::result::Result<RoundData, ProviderError>,
    },
    RetryScheduled {
        epoch: Epoch,
        notice: RetryNotice,
    },
    Tick {
        epoch: Epoch,
    },
    GameOverDue {
        epoch: Epoch,
    },
}

pub(crate) struct SessionWorker {
    session: Session,
    profile: PlayerProfile,
    provider: Arc<dyn RoundProvider>,
    retry_policy: RetryPolicy,
    event_bus: EventBus,
    command_rx: mpsc::Receiver<Command>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
    fetch_task: Option<JoinHandle<()>>,
    timer_task: Option<JoinHandle<()>>,
    game_over_task: Option<JoinHandle<()>>,
}

impl SessionWorker {
    pub(crate) fn new(
        session: Session,
        profile: PlayerProfile,
        provider: Arc<dyn RoundProvider>,
        retry_policy: RetryPolicy,
        event_bus: EventBus,
        command_rx: mpsc::Receiver<Command>,
    ) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();

        info!(
            "SessionWorker initialized for player {} (high score {}, {} recent diagnoses)",
            profile.player_id(),
            session.state().high_score,
            session.state().history.len()
        );

        Self {
            session,
            profile,
            provider,
            retry_policy,
            event_bus,
            command_rx,
            completion_tx,
            completion_rx,
            fetch_task: None,
            timer_task: None,
            game_over_task: None,
        }
    }

    /// Main worker loop. Ends when every handle is dropped or on shutdown.
    pub(crate) async fn run(mut self) {
        self.publish_snapshot();

        loop {
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                Some(completion) = self.completion_rx.recv() => {
                    self.handle_completion(completion);
                }
            }
        }

        for task in [
            self.fetch_task.take(),
            self.timer_task.take(),
            self.game_over_task.take(),
        ]
        .into_iter()
        .flatten()
        {
            task.abort();
        }
        debug!("SessionWorker stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Player { command, reply } => {
                let result = self.handle_player_command(command);
                if reply.send(result).is_err() {
                    debug!("Player command reply channel closed (caller dropped)");
                }
            }
            Command::Rename { name, reply } => {
                let result = self.profile.rename(&name);
                if let Ok(name) = &result {
                    info!("Username changed to {}", name);
                }
                if reply.send(result).is_err() {
                    debug!("Rename reply channel closed (caller dropped)");
                }
            }
            Command::Username { reply } => {
                if reply.send(self.profile.username()).is_err() {
                    debug!("Username reply channel closed (caller dropped)");
                }
            }
            Command::QuerySnapshot { reply } => {
                if reply.send(self.session.snapshot()).is_err() {
                    debug!("QuerySnapshot reply channel closed (caller dropped)");
                }
            }
            Command::Shutdown => {}
        }
    }

    fn handle_player_command(&mut self, command: PlayerCommand) -> Result<()> {
        let label = command.label();
        let before = self.session.state().status;
        let result = match command {
            PlayerCommand::StartGame => self.session.start_game(),
            PlayerCommand::TryAgain => self.session.try_again(),
            PlayerCommand::NextRound => self.session.next_round(),
            PlayerCommand::Reveal => self.session.reveal(),
            PlayerCommand::ReturnToMenu => self.session.return_to_menu(),
            PlayerCommand::PickTile(id) => self.session.pick_tile(&id),
            PlayerCommand::ClearHistory => Ok(self.session.clear_history()),
        };
        self.transition(label, before, result)
    }

    fn handle_completion(&mut self, completion: Completion) {
        let before = self.session.state().status;
        let (label, result) = match completion {
            Completion::RoundFetched { epoch, result } => {
                let result = match result {
                    Ok(round) => self.session.round_loaded(epoch, round),
                    Err(error) => self.session.round_failed(
                        epoch,
                        RoundFailure {
                            transient: error.is_transient(),
                            message: error.to_string(),
                        },
                    ),
                };
                ("round fetch", result)
            }
            Completion::RetryScheduled { epoch, notice } => {
                ("retry notice", self.session.retry_scheduled(epoch, notice))
            }
            Completion::Tick { epoch } => {
                trace!("Tick for round {}", epoch);
                ("tick", self.session.tick(epoch))
            }
            Completion::GameOverDue { epoch } => {
                ("deferred game over", self.session.game_over_due(epoch))
            }
        };

        // Rejections were already logged; completions have no caller to notify.
        let _ = self.transition(label, before, result);
    }

    fn transition(
        &mut self,
        label: &'static str,
        before: GameStatus,
        result: std::result::Result<Vec<Effect>, SessionError>,
    ) -> Result<()> {
        let effects = match result {
            Ok(effects) => effects,
            Err(error) if error.is_ignorable() => {
                debug!("Ignored {}: {}", label, error);
                return Err(error.into());
            }
            Err(error) => {
                warn!("Rejected {}: {}", label, error);
                return Err(error.into());
            }
        };

        self.log_status_change(label, before);
        for effect in effects {
            self.execute_effect(effect);
        }
        self.cancel_stale_tasks();
        self.publish_snapshot();
        Ok(())
    }

    fn log_status_change(&self, label: &str, before: GameStatus) {
        let state = self.session.state();
        if state.status == before {
            return;
        }

        match state.status {
            GameStatus::Playing => {
                if let Some(round) = &state.round {
                    info!(
                        "Round {} loaded: {} ({}, {})",
                        state.epoch, round.diagnosis, round.category, round.difficulty
                    );
                }
            }
            GameStatus::RoundOver => info!(
                "Round {} over: score {}, health {}",
                state.epoch, state.run_score, state.health
            ),
            GameStatus::GameOver => info!("Game over with score {}", state.run_score),
            status => debug!("Session {} -> {} after {}", before, status, label),
        }
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::FetchRound { epoch, recent } => self.spawn_fetch(epoch, recent),
            Effect::StartTimer { epoch, interval } => self.start_timer(epoch, interval),
            Effect::StopTimer => self.stop_timer(),
            Effect::ScheduleGameOver { epoch, delay } => self.schedule_game_over(epoch, delay),
            Effect::PersistHighScore(score) => {
                info!("New high score {}", score);
                self.profile.save_high_score(score);
            }
            Effect::PersistHistory(entries) => self.profile.save_recent_diagnoses(&entries),
            Effect::Feedback(feedback) => self.event_bus.publish(Event::Feedback(feedback)),
            Effect::FallbackUsed { reason } => {
                warn!("Serving offline fallback round: {}", reason);
            }
        }
    }

    fn spawn_fetch(&mut self, epoch: Epoch, recent: Vec<String>) {
        if let Some(task) = self.fetch_task.take() {
            task.abort();
        }

        let config = self.session.config();
        let request = RoundRequest {
            recent_diagnoses: recent,
            correct_count_target: config.correct_count_target,
            tile_count: config.tile_count,
        };
        let provider = Arc::clone(&self.provider);
        let policy = self.retry_policy.clone();
        let completions = self.completion_tx.clone();

        debug!(
            "Fetching round {} (excluding {} recent diagnoses)",
            epoch,
            request.recent_diagnoses.len()
        );

        self.fetch_task = Some(tokio::spawn(async move {
            let provider = provider.as_ref();
            let request = &request;
            let result = policy
                .run(
                    move |attempt| {
                        trace!("Round {} fetch attempt {}", epoch, attempt);
                        provider.generate_round(request)
                    },
                    |notice| {
                        if completions
                            .send(Completion::RetryScheduled { epoch, notice })
                            .is_err()
                        {
                            debug!("Retry notice dropped (worker stopped)");
                        }
                    },
                )
                .await;

            if completions
                .send(Completion::RoundFetched { epoch, result })
                .is_err()
            {
                debug!("Round fetch result dropped (worker stopped)");
            }
        }));
    }

    fn start_timer(&mut self, epoch: Epoch, interval: Duration) {
        self.stop_timer();

        let interval = interval.max(Duration::from_millis(1));
        let completions = self.completion_tx.clone();
        self.timer_task = Some(tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if completions.send(Completion::Tick { epoch }).is_err() {
                    break;
                }
            }
        }));
    }

    fn stop_timer(&mut self) {
        if let Some(task) = self.timer_task.take() {
            task.abort();
        }
    }

    fn schedule_game_over(&mut self, epoch: Epoch, delay: Duration) {
        if let Some(task) = self.game_over_task.take() {
            task.abort();
        }

        let completions = self.completion_tx.clone();
        self.game_over_task = Some(tokio::spawn(async move {
            time::sleep(delay).await;
            if completions.send(Completion::GameOverDue { epoch }).is_err() {
                debug!("Deferred game over dropped (worker stopped)");
            }
        }));
    }

    /// Abort background work the session no longer waits for.
    fn cancel_stale_tasks(&mut self) {
        let state = self.session.state();
        let awaiting_fetch = state.status == GameStatus::LoadingRound && state.load_error.is_none();
        let awaiting_game_over = state.game_over_pending;
        let ticking = state.accepts_input();

        if !awaiting_fetch && let Some(task) = self.fetch_task.take() {
            task.abort();
        }
        if !awaiting_game_over && let Some(task) = self.game_over_task.take() {
            task.abort();
        }
        if !ticking {
            self.stop_timer();
        }
    }

    fn publish_snapshot(&self) {
        self.event_bus
            .publish(Event::Session(Box::new(self.session.snapshot())));
    }
}
