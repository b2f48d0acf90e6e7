//! Data-driven content definitions and loaders.
//!
//! This crate houses static game content and provides loaders for data files:
//! - The fixed offline fallback round
//! - Round decks for offline play (data-driven via RON)
//! - Game configuration (data-driven via TOML)
//!
//! Content is consumed by the runtime and never mutated there.

pub mod fallback;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use fallback::fallback_round;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, DeckEntry, DeckLoader, LoadResult, RoundDeck};
