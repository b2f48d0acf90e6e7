//! Round content: the diagnosis under test and its grid of phrase tiles.
//!
//! A [`RoundData`] is produced by a round provider, validated against the
//! active [`GameConfig`], and then owned by the session for exactly one round.
use std::collections::HashSet;
use std::fmt;

use crate::config::GameConfig;

/// Identifier of a tile, unique within a round.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TileId(pub String);

impl TileId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TileId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Interaction state of a single tile.
///
/// `Idle` moves to exactly one of the other states per round. `Missed` is
/// only ever assigned by the round-over reveal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TileState {
    #[default]
    Idle,
    Correct,
    Incorrect,
    Missed,
}

/// One phrase tile on the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tile {
    pub id: TileId,
    pub text: String,
    pub is_relevant: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub state: TileState,
}

impl Tile {
    pub fn new(id: impl Into<TileId>, text: impl Into<String>, is_relevant: bool) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            is_relevant,
            state: TileState::Idle,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state == TileState::Idle
    }
}

impl From<String> for TileId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Difficulty label attached by the generator.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// Content for one round.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundData {
    pub diagnosis: String,
    pub category: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub difficulty: Difficulty,
    pub tiles: Vec<Tile>,
}

impl RoundData {
    /// Number of tiles that are true findings for the diagnosis.
    pub fn relevant_count(&self) -> usize {
        self.tiles.iter().filter(|tile| tile.is_relevant).count()
    }

    /// Checks the structural invariants the session relies on.
    ///
    /// The relevant/distractor split is the provider's responsibility; any
    /// split with at least one relevant tile is accepted.
    pub fn validate(&self, config: &GameConfig) -> Result<(), RoundError> {
        if self.diagnosis.trim().is_empty() {
            return Err(RoundError::BlankDiagnosis);
        }

        if self.tiles.len() != config.tile_count {
            return Err(RoundError::TileCount {
                expected: config.tile_count,
                actual: self.tiles.len(),
            });
        }

        let mut seen = HashSet::with_capacity(self.tiles.len());
        for tile in &self.tiles {
            if !seen.insert(&tile.id) {
                return Err(RoundError::DuplicateTileId(tile.id.clone()));
            }
            if tile.text.trim().is_empty() {
                return Err(RoundError::BlankTile(tile.id.clone()));
            }
        }

        if self.relevant_count() == 0 {
            return Err(RoundError::NoRelevantTiles);
        }

        Ok(())
    }

    /// Brings a raw provider response into shape for play.
    ///
    /// Extra tiles beyond the configured count are dropped and every tile is
    /// reset to `Idle`. The result still has to pass [`RoundData::validate`].
    pub fn normalized(mut self, config: &GameConfig) -> Self {
        self.tiles.truncate(config.tile_count);
        for tile in &mut self.tiles {
            tile.state = TileState::Idle;
        }
        self
    }
}

/// Structural problems in round content.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RoundError {
    #[error("round has no diagnosis")]
    BlankDiagnosis,

    #[error("round must have {expected} tiles, got {actual}")]
    TileCount { expected: usize, actual: usize },

    #[error("tile id {0} appears more than once")]
    DuplicateTileId(TileId),

    #[error("tile {0} has no text")]
    BlankTile(TileId),

    #[error("round has no relevant tiles")]
    NoRelevantTiles,
}
