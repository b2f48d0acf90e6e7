//! Offline round deck loader.
//!
//! A deck lists diagnoses with their true findings and distractors. The
//! runtime's deck provider turns entries into playable rounds.

use std::path::Path;

use game_core::{Difficulty, GameConfig, RoundData, Tile};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// One diagnosis in a deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckEntry {
    pub diagnosis: String,
    pub category: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub relevant: Vec<String>,
    pub distractors: Vec<String>,
}

impl DeckEntry {
    /// Builds a round with ids `"<prefix>-<n>"`, relevant phrases first.
    pub fn to_round(&self, id_prefix: &str) -> RoundData {
        let phrases = self
            .relevant
            .iter()
            .map(|text| (text, true))
            .chain(self.distractors.iter().map(|text| (text, false)));

        let tiles = phrases
            .enumerate()
            .map(|(index, (text, is_relevant))| {
                Tile::new(format!("{id_prefix}-{}", index + 1), text.clone(), is_relevant)
            })
            .collect();

        RoundData {
            diagnosis: self.diagnosis.clone(),
            category: self.category.clone(),
            difficulty: self.difficulty,
            tiles,
        }
    }

    pub fn tile_count(&self) -> usize {
        self.relevant.len() + self.distractors.len()
    }
}

/// Ordered collection of deck entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoundDeck {
    entries: Vec<DeckEntry>,
}

impl RoundDeck {
    pub fn new(entries: Vec<DeckEntry>) -> Self {
        Self { entries }
    }

    /// The deck shipped with the game.
    pub fn builtin() -> LoadResult<Self> {
        DeckLoader::parse(include_str!("../../data/rounds.ron"))
    }

    pub fn entries(&self) -> &[DeckEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Loader for round decks from RON files.
pub struct DeckLoader;

impl DeckLoader {
    /// Load a deck from a RON file.
    ///
    /// File format: a list of [`DeckEntry`] records.
    ///
    /// ```ron
    /// [
    ///     (
    ///         diagnosis: "Gout",
    ///         category: "Rheumatology",
    ///         difficulty: Easy,
    ///         relevant: ["Podagra", "Hyperuricemia", "Tophi", ...],
    ///         distractors: ["Photophobia", "Hemoptysis", ...],
    ///     ),
    /// ]
    /// ```
    pub fn load(path: &Path) -> LoadResult<RoundDeck> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Invalid deck at {}: {}", path.display(), e))
    }

    /// Parse a deck from RON text, rejecting entries that cannot form a round.
    ///
    /// Every entry needs a diagnosis, at least one relevant finding and
    /// enough phrases for a full board of [`GameConfig::DEFAULT_TILE_COUNT`].
    pub fn parse(content: &str) -> LoadResult<RoundDeck> {
        let entries: Vec<DeckEntry> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse deck RON: {}", e))?;

        for entry in &entries {
            anyhow::ensure!(
                !entry.diagnosis.trim().is_empty(),
                "deck entry without diagnosis"
            );
            anyhow::ensure!(
                !entry.relevant.is_empty(),
                "{} has no relevant findings",
                entry.diagnosis
            );
            anyhow::ensure!(
                entry.tile_count() >= GameConfig::DEFAULT_TILE_COUNT,
                "{} has {} findings, a round needs {}",
                entry.diagnosis,
                entry.tile_count(),
                GameConfig::DEFAULT_TILE_COUNT
            );
        }

        Ok(RoundDeck::new(entries))
    }
}
