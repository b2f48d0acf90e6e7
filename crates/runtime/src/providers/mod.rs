//! Round provider implementations.

mod deck;

pub use deck::DeckRoundProvider;
