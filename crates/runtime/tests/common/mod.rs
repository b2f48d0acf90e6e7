//! Shared fixtures for runtime integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::time::timeout;

use game_core::{RoundData, SessionSnapshot, Tile};
use runtime::{
    Event, InMemoryStore, ProviderError, RoundProvider, RoundRequest, Runtime, RuntimeConfig,
    SessionHandle, Topic,
};

/// Provider that replays queued responses, then serves `default_round`.
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<RoundData, ProviderError>>>,
    requests: Mutex<Vec<RoundRequest>>,
    delay: Duration,
}

impl ScriptedProvider {
    pub fn new(responses: impl IntoIterator<Item = Result<RoundData, ProviderError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
        }
    }

    /// Every response resolves only after `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn requests(&self) -> Vec<RoundRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl RoundProvider for ScriptedProvider {
    async fn generate_round(&self, request: &RoundRequest) -> Result<RoundData, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        let response = self.responses.lock().unwrap().pop_front();

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        response.unwrap_or_else(|| Ok(round("Default Diagnosis")))
    }
}

/// Twelve tiles: relevant `r1..r7` followed by distractors `d1..d5`.
pub fn round(diagnosis: &str) -> RoundData {
    let relevant =
        (1..=7).map(|n| Tile::new(format!("r{n}"), format!("{diagnosis} sign {n}"), true));
    let distractors =
        (1..=5).map(|n| Tile::new(format!("d{n}"), format!("Unrelated {n}"), false));

    RoundData {
        diagnosis: diagnosis.to_string(),
        category: "Test".to_string(),
        difficulty: Default::default(),
        tiles: relevant.chain(distractors).collect(),
    }
}

pub struct Harness {
    pub runtime: Runtime,
    pub handle: SessionHandle,
    pub provider: Arc<ScriptedProvider>,
    pub store: Arc<InMemoryStore>,
}

pub async fn start(provider: ScriptedProvider) -> Harness {
    start_with(provider, RuntimeConfig::default(), Arc::new(InMemoryStore::new())).await
}

pub async fn start_with(
    provider: ScriptedProvider,
    config: RuntimeConfig,
    store: Arc<InMemoryStore>,
) -> Harness {
    let provider = Arc::new(provider);
    let runtime = Runtime::builder()
        .config(config)
        .shared_provider(provider.clone())
        .store(store.clone())
        .build()
        .await
        .expect("runtime should build");
    let handle = runtime.handle();

    Harness {
        runtime,
        handle,
        provider,
        store,
    }
}

/// Wait (in virtual time) for the first snapshot matching `predicate`.
pub async fn wait_for(
    rx: &mut broadcast::Receiver<Event>,
    predicate: impl Fn(&SessionSnapshot) -> bool,
) -> SessionSnapshot {
    let search = async {
        loop {
            match rx.recv().await {
                Ok(Event::Session(snapshot)) if predicate(snapshot.as_ref()) => return *snapshot,
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => panic!("event bus closed"),
            }
        }
    };

    timeout(Duration::from_secs(120), search)
        .await
        .expect("expected snapshot never arrived")
}

pub fn session_events(handle: &SessionHandle) -> broadcast::Receiver<Event> {
    handle.subscribe(Topic::Session)
}
