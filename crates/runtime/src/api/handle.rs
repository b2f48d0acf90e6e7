//! Cloneable façade for issuing commands to the runtime.
//!
//! [`SessionHandle`] hides channel plumbing and offers async helpers for
//! driving the session or streaming events from specific topics.
use std::collections::HashMap;

use tokio::sync::{broadcast, mpsc, oneshot};

use game_core::{SessionSnapshot, TileId};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::workers::{Command, PlayerCommand};

/// Client-facing handle to interact with the session
#[derive(Clone)]
pub struct SessionHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl SessionHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    async fn player(&self, command: PlayerCommand) -> Result<()> {
        self.request(|reply| Command::Player { command, reply }).await?
    }

    /// Start a new run from the menu or the game-over screen.
    pub async fn start_game(&self) -> Result<()> {
        self.player(PlayerCommand::StartGame).await
    }

    /// Start a new run after game over.
    pub async fn try_again(&self) -> Result<()> {
        self.player(PlayerCommand::TryAgain).await
    }

    /// Load the next round after a round ended.
    pub async fn next_round(&self) -> Result<()> {
        self.player(PlayerCommand::NextRound).await
    }

    /// Show the correct tiles of the round that just ended.
    pub async fn reveal(&self) -> Result<()> {
        self.player(PlayerCommand::Reveal).await
    }

    /// Abandon whatever is in progress and go back to the menu.
    pub async fn return_to_menu(&self) -> Result<()> {
        self.player(PlayerCommand::ReturnToMenu).await
    }

    /// Pick a tile in the current round.
    ///
    /// Picks outside of play are rejected with an ignorable error
    /// (see [`RuntimeError::is_ignorable`]).
    pub async fn pick_tile(&self, id: impl Into<TileId>) -> Result<()> {
        self.player(PlayerCommand::PickTile(id.into())).await
    }

    /// Forget recently played diagnoses.
    pub async fn clear_history(&self) -> Result<()> {
        self.player(PlayerCommand::ClearHistory).await
    }

    /// Change the player's name; returns the name actually stored.
    pub async fn rename(&self, name: impl Into<String>) -> Result<String> {
        let name = name.into();
        self.request(|reply| Command::Rename { name, reply }).await?
    }

    pub async fn username(&self) -> Result<String> {
        self.request(|reply| Command::Username { reply }).await
    }

    /// Query the current session state (read-only snapshot)
    pub async fn snapshot(&self) -> Result<SessionSnapshot> {
        self.request(|reply| Command::QuerySnapshot { reply }).await
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use runtime::{Event, Topic};
    ///
    /// let mut session_rx = handle.subscribe(Topic::Session);
    /// while let Ok(Event::Session(snapshot)) = session_rx.recv().await {
    ///     render(&snapshot);
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub(crate) async fn shutdown(&self) -> Result<()> {
        self.command_tx
            .send(Command::Shutdown)
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }
}
