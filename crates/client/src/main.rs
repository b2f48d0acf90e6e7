//! Symptom sprinter terminal client binary.
//!
//! This binary is the composition root that assembles:
//! 1. Runtime (session logic) via RuntimeBuilder
//! 2. Round provider: the built-in offline deck or `SPRINTER_DECK`
//! 3. Persistent store: `store.json` in `SPRINTER_DATA_DIR` or the
//!    platform data directory
//!
//! ```bash
//! SPRINTER_DECK=decks/cardiology.ron cargo run -p sprinter-client
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};

use game_content::{DeckLoader, RoundDeck};
use runtime::{DeckRoundProvider, FileStore, InMemoryStore, KeyValueStore, Runtime, RuntimeConfig};
use sprinter_client::logging::setup_logging;
use sprinter_client::{App, ClientConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let client_config = ClientConfig::from_env();
    let _log_guard = setup_logging(&client_config.resolved_log_dir())?;

    let runtime_config = RuntimeConfig::from_env();
    tracing::info!("Starting symptom sprinter");
    tracing::info!(
        "Retry policy: {} attempts, base delay {:?}",
        runtime_config.retry_policy.max_attempts,
        runtime_config.retry_policy.base_delay
    );

    let deck = match &client_config.deck_path {
        Some(path) => DeckLoader::load(path)?,
        None => RoundDeck::builtin().context("built-in deck is invalid")?,
    };
    tracing::info!("Deck loaded with {} diagnoses", deck.len());

    let runtime = Runtime::builder()
        .config(runtime_config)
        .provider(DeckRoundProvider::new(deck))
        .store(open_store(&client_config))
        .build()
        .await?;

    let mut app = App::new(runtime.handle()).await?;
    let result = app.run().await;
    drop(app);

    runtime.shutdown().await?;
    tracing::info!("Client shutdown complete");
    result
}

/// File store when possible; otherwise play without persistence.
fn open_store(config: &ClientConfig) -> Arc<dyn KeyValueStore> {
    let store = match &config.data_dir {
        Some(dir) => FileStore::new(dir),
        None => FileStore::in_default_dir(),
    };

    match store {
        Ok(store) => {
            tracing::info!("Store: {}", store.path().display());
            Arc::new(store)
        }
        Err(e) => {
            tracing::warn!("Persistent store unavailable ({}); progress will not be saved", e);
            Arc::new(InMemoryStore::new())
        }
    }
}
