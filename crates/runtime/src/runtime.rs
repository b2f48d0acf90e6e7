//! High-level runtime orchestrator.
//!
//! The runtime owns the session worker, wires up command/event channels, and
//! exposes a builder-based API for clients to drive the game.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use game_content::{ConfigLoader, fallback_round};
use game_core::{GameConfig, RoundData, Session};

use crate::api::{Result, RoundProvider, RuntimeError, SessionHandle};
use crate::events::{Event, EventBus, Topic};
use crate::profile::PlayerProfile;
use crate::retry::RetryPolicy;
use crate::store::{InMemoryStore, KeyValueStore};
use crate::workers::{Command, SessionWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub game_config: GameConfig,
    pub retry_policy: RetryPolicy,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            game_config: GameConfig::default(),
            retry_policy: RetryPolicy::default(),
            event_buffer_size: 100,
            command_buffer_size: 32,
        }
    }
}

impl RuntimeConfig {
    /// Build a config from `SPRINTER_*` environment variables.
    ///
    /// Missing or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(path) = read_env::<PathBuf>("SPRINTER_CONFIG") {
            match ConfigLoader::load(&path) {
                Ok(game_config) => config.game_config = game_config,
                Err(e) => warn!(
                    "Ignoring game config {}: {:#}; using defaults",
                    path.display(),
                    e
                ),
            }
        }

        if let Some(attempts) = read_env::<u32>("SPRINTER_RETRY_ATTEMPTS") {
            config.retry_policy.max_attempts = attempts.max(1);
        }
        if let Some(delay_ms) = read_env::<u64>("SPRINTER_RETRY_BASE_DELAY_MS") {
            config.retry_policy.base_delay = Duration::from_millis(delay_ms);
        }

        if let Some(capacity) = read_env::<usize>("SPRINTER_COMMAND_BUFFER") {
            config.command_buffer_size = capacity.max(1);
        }
        if let Some(capacity) = read_env::<usize>("SPRINTER_EVENT_BUFFER") {
            config.event_buffer_size = capacity.max(1);
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

/// Main runtime that hosts one game session.
///
/// Design: Runtime owns the session worker.
/// [`SessionHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: SessionHandle,
    worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Subscribe to events from a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    /// Shutdown the runtime gracefully
    ///
    /// Pending fetches, timers and deferred transitions are cancelled.
    pub async fn shutdown(self) -> Result<()> {
        if self.handle.shutdown().await.is_err() {
            tracing::debug!("Session worker already stopped");
        }
        drop(self.handle);

        self.worker_handle.await.map_err(RuntimeError::WorkerJoin)?;
        info!("Runtime shut down");
        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    provider: Option<Arc<dyn RoundProvider>>,
    store: Option<Arc<dyn KeyValueStore>>,
    fallback: Option<RoundData>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            provider: None,
            store: None,
            fallback: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the round provider (required)
    pub fn provider(mut self, provider: impl RoundProvider + 'static) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    /// Set a provider that is shared with other owners
    pub fn shared_provider(mut self, provider: Arc<dyn RoundProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the persistent store (defaults to an in-memory store)
    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Replace the built-in offline round
    pub fn fallback_round(mut self, round: RoundData) -> Self {
        self.fallback = Some(round);
        self
    }

    /// Build the runtime
    pub async fn build(self) -> Result<Runtime> {
        let provider = self.provider.ok_or(RuntimeError::MissingProvider)?;
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryStore::new()) as Arc<dyn KeyValueStore>);
        let fallback = self.fallback.unwrap_or_else(fallback_round);

        let game_config = self.config.game_config;
        let profile = PlayerProfile::load(store, game_config.recent_history_limit);
        let session = Session::new(
            game_config,
            fallback,
            profile.high_score(),
            profile.recent_diagnoses(),
        );

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);

        let handle = SessionHandle::new(command_tx, event_bus.clone());

        let worker = SessionWorker::new(
            session,
            profile,
            provider,
            self.config.retry_policy,
            event_bus,
            command_rx,
        );

        let worker_handle = tokio::spawn(async move {
            worker.run().await;
        });

        Ok(Runtime {
            handle,
            worker_handle,
        })
    }
}
