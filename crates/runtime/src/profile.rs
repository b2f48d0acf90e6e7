//! Player profile persisted through a [`KeyValueStore`].
//!
//! Storage failures never reach the session: reads degrade to defaults and
//! writes are logged and dropped.

use std::sync::Arc;

use rand::Rng;
use tracing::{debug, warn};

use game_core::RecentDiagnoses;

use crate::api::{Result, RuntimeError};
use crate::store::KeyValueStore;

pub const HIGH_SCORE_KEY: &str = "symptom_sprinter_hs";
pub const USERNAME_KEY: &str = "symptom_sprinter_username";
pub const PLAYER_ID_KEY: &str = "symptom_sprinter_player_id";

/// Maximum username length in characters.
pub const USERNAME_MAX_CHARS: usize = 20;

pub struct PlayerProfile {
    store: Arc<dyn KeyValueStore>,
    player_id: String,
    history_limit: usize,
}

impl PlayerProfile {
    /// Load the profile, creating a player id on first use.
    ///
    /// When the store cannot be read or written a temporary id is used for
    /// this process only.
    pub fn load(store: Arc<dyn KeyValueStore>, history_limit: usize) -> Self {
        let player_id = match store.get(PLAYER_ID_KEY) {
            Ok(Some(id)) if !id.trim().is_empty() => id,
            Ok(_) => {
                let id = random_player_id();
                match store.set(PLAYER_ID_KEY, &id) {
                    Ok(()) => id,
                    Err(e) => {
                        warn!("Failed to persist player id: {}", e);
                        format!("temp_{id}")
                    }
                }
            }
            Err(e) => {
                warn!("Player id unavailable, using a temporary one: {}", e);
                format!("temp_{}", random_player_id())
            }
        };

        debug!("Loaded player profile {}", player_id);

        Self {
            store,
            player_id,
            history_limit,
        }
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    pub fn history_key(&self) -> String {
        format!("symptom_sprinter_player_{}_diagnoses", self.player_id)
    }

    pub fn high_score(&self) -> i64 {
        match self.store.get(HIGH_SCORE_KEY) {
            Ok(Some(raw)) => raw.trim().parse().unwrap_or_else(|_| {
                warn!("Ignoring malformed high score {:?}", raw);
                0
            }),
            Ok(None) => 0,
            Err(e) => {
                warn!("Failed to read high score: {}", e);
                0
            }
        }
    }

    pub fn save_high_score(&self, score: i64) {
        if let Err(e) = self.store.set(HIGH_SCORE_KEY, &score.to_string()) {
            warn!("Failed to persist high score {}: {}", score, e);
        }
    }

    /// Current username, generating and persisting `Player#<n>` on first use.
    pub fn username(&self) -> String {
        match self.store.get(USERNAME_KEY) {
            Ok(Some(name)) if !name.trim().is_empty() => return name,
            Ok(_) => {}
            Err(e) => warn!("Failed to read username: {}", e),
        }

        let name = format!("Player#{}", rand::rng().random_range(1..=9999));
        if let Err(e) = self.store.set(USERNAME_KEY, &name) {
            warn!("Failed to persist username: {}", e);
        }
        name
    }

    /// Set a new username: trimmed, non-empty, at most
    /// [`USERNAME_MAX_CHARS`] characters. Returns the name stored.
    pub fn rename(&self, name: &str) -> Result<String> {
        let name: String = name.trim().chars().take(USERNAME_MAX_CHARS).collect();
        let name = name.trim_end().to_owned();
        if name.is_empty() {
            return Err(RuntimeError::InvalidUsername(
                "username cannot be empty".into(),
            ));
        }

        if let Err(e) = self.store.set(USERNAME_KEY, &name) {
            warn!("Failed to persist username: {}", e);
        }
        Ok(name)
    }

    /// Recently played diagnoses, most recent first.
    pub fn recent_diagnoses(&self) -> RecentDiagnoses {
        let raw = match self.store.get(&self.history_key()) {
            Ok(Some(raw)) => raw,
            Ok(None) => return RecentDiagnoses::new(self.history_limit),
            Err(e) => {
                warn!("Failed to read diagnosis history: {}", e);
                return RecentDiagnoses::new(self.history_limit);
            }
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(entries) => RecentDiagnoses::from_entries(entries, self.history_limit),
            Err(e) => {
                warn!("Ignoring malformed diagnosis history: {}", e);
                RecentDiagnoses::new(self.history_limit)
            }
        }
    }

    /// Persist the history list; an empty list removes the key.
    pub fn save_recent_diagnoses(&self, entries: &[String]) {
        if entries.is_empty() {
            self.clear_history();
            return;
        }

        let key = self.history_key();
        let result = serde_json::to_string(entries)
            .map_err(Into::into)
            .and_then(|json| self.store.set(&key, &json));
        if let Err(e) = result {
            warn!("Failed to persist diagnosis history: {}", e);
        }
    }

    pub fn clear_history(&self) {
        if let Err(e) = self.store.remove(&self.history_key()) {
            warn!("Failed to clear diagnosis history: {}", e);
        }
    }
}

fn random_player_id() -> String {
    hex::encode(rand::rng().random::<[u8; 16]>())
}
