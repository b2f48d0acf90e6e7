//! Offline provider serving rounds from a [`RoundDeck`].

use std::sync::Mutex;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};

use game_content::{DeckEntry, RoundDeck};
use game_core::RoundData;

use crate::api::{ProviderError, RoundProvider, RoundRequest};

/// Serves deck entries as rounds.
///
/// Diagnoses in the request's recent list are skipped while other entries
/// remain. Tile order is shuffled and every round gets fresh tile ids.
pub struct DeckRoundProvider {
    deck: RoundDeck,
    rng: Mutex<StdRng>,
}

impl DeckRoundProvider {
    pub fn new(deck: RoundDeck) -> Self {
        Self {
            deck,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Deterministic variant for tests and replays.
    pub fn with_seed(deck: RoundDeck, seed: u64) -> Self {
        Self {
            deck,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn deck(&self) -> &RoundDeck {
        &self.deck
    }

    fn draw(&self, request: &RoundRequest) -> Result<RoundData, ProviderError> {
        if self.deck.is_empty() {
            return Err(ProviderError::Configuration("round deck is empty".into()));
        }

        let mut rng = self
            .rng
            .lock()
            .map_err(|_| ProviderError::Other("deck rng lock poisoned".into()))?;

        let is_recent = |entry: &DeckEntry| {
            request
                .recent_diagnoses
                .iter()
                .any(|recent| recent.eq_ignore_ascii_case(&entry.diagnosis))
        };
        let fresh: Vec<&DeckEntry> = self
            .deck
            .entries()
            .iter()
            .filter(|&e| !is_recent(e))
            .collect();
        let candidates: Vec<&DeckEntry> = if fresh.is_empty() {
            tracing::debug!("Every deck entry was played recently; reusing the full deck");
            self.deck.entries().iter().collect()
        } else {
            fresh
        };

        let entry = candidates
            .choose(&mut *rng)
            .ok_or_else(|| ProviderError::Configuration("round deck is empty".into()))?;

        let mut entry = (*entry).clone();
        fit_to_board(&mut entry, request, &mut *rng);

        let prefix = hex::encode(rng.random::<[u8; 4]>());
        let mut round = entry.to_round(&prefix);
        round.tiles.shuffle(&mut *rng);
        Ok(round)
    }
}

/// Samples findings so the entry fills exactly `tile_count` tiles.
///
/// The relevant/distractor split follows `correct_count_target` when the
/// entry has enough of both; otherwise as many distractors as fit are kept
/// next to at least one relevant finding. Entries already at the board size
/// are left alone.
fn fit_to_board(entry: &mut DeckEntry, request: &RoundRequest, rng: &mut StdRng) {
    let tiles = request.tile_count;
    let target = request.correct_count_target;
    if tiles == 0 {
        return;
    }

    let (relevant, distractors) = if target > 0
        && target < tiles
        && entry.relevant.len() >= target
        && entry.distractors.len() >= tiles - target
    {
        (target, tiles - target)
    } else if entry.tile_count() > tiles {
        let distractors = entry.distractors.len().min(tiles - 1);
        (tiles - distractors, distractors)
    } else {
        return;
    };

    entry.relevant = sample(&entry.relevant, relevant, rng);
    entry.distractors = sample(&entry.distractors, distractors, rng);
}

fn sample(phrases: &[String], amount: usize, rng: &mut StdRng) -> Vec<String> {
    if phrases.len() <= amount {
        return phrases.to_vec();
    }
    phrases.choose_multiple(rng, amount).cloned().collect()
}

#[async_trait]
impl RoundProvider for DeckRoundProvider {
    async fn generate_round(&self, request: &RoundRequest) -> Result<RoundData, ProviderError> {
        self.draw(request)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use game_core::GameConfig;

    use super::*;

    fn request(recent: &[&str]) -> RoundRequest {
        RoundRequest {
            recent_diagnoses: recent.iter().map(|s| s.to_string()).collect(),
            correct_count_target: 7,
            tile_count: 12,
        }
    }

    fn entry(diagnosis: &str, relevant: usize, distractors: usize) -> DeckEntry {
        DeckEntry {
            diagnosis: diagnosis.to_string(),
            category: "Internal Medicine".to_string(),
            difficulty: Default::default(),
            relevant: (1..=relevant).map(|n| format!("finding {n}")).collect(),
            distractors: (1..=distractors).map(|n| format!("distractor {n}")).collect(),
        }
    }

    #[tokio::test]
    async fn serves_valid_rounds_with_fresh_ids() {
        let provider = DeckRoundProvider::with_seed(RoundDeck::builtin().unwrap(), 7);
        let config = GameConfig::default();

        let first = provider.generate_round(&request(&[])).await.unwrap();
        let second = provider.generate_round(&request(&[])).await.unwrap();

        assert_eq!(first.validate(&config), Ok(()));
        assert_eq!(first.relevant_count(), 7);

        let first_ids: HashSet<_> = first.tiles.iter().map(|t| t.id.clone()).collect();
        assert!(second.tiles.iter().all(|t| !first_ids.contains(&t.id)));
    }

    #[tokio::test]
    async fn skips_recent_diagnoses_while_possible() {
        let deck = RoundDeck::builtin().unwrap();
        let names: Vec<String> = deck.entries().iter().map(|e| e.diagnosis.clone()).collect();
        let provider = DeckRoundProvider::with_seed(deck, 11);

        let (last, recent) = names.split_last().unwrap();
        let recent: Vec<&str> = recent.iter().map(String::as_str).collect();
        for _ in 0..5 {
            let round = provider.generate_round(&request(&recent)).await.unwrap();
            assert_eq!(&round.diagnosis, last);
        }

        let all: Vec<&str> = names.iter().map(String::as_str).collect();
        assert!(provider.generate_round(&request(&all)).await.is_ok());
    }

    #[tokio::test]
    async fn empty_deck_is_a_permanent_error() {
        let provider = DeckRoundProvider::new(RoundDeck::default());
        let error = provider.generate_round(&request(&[])).await.unwrap_err();
        assert!(!error.is_transient());
    }

    #[tokio::test]
    async fn rounds_fill_the_board_for_any_split() {
        let config = GameConfig::default();
        let cases = [(9, 3, 9), (7, 5, 7), (3, 9, 3), (10, 6, 7), (1, 14, 1)];

        for (relevant, distractors, expected_relevant) in cases {
            let deck = RoundDeck::new(vec![entry("Sarcoidosis", relevant, distractors)]);
            let provider = DeckRoundProvider::with_seed(deck, 1);

            let round = provider.generate_round(&request(&[])).await.unwrap();
            assert_eq!(round.validate(&config), Ok(()), "{relevant}/{distractors}");
            assert_eq!(round.tiles.len(), 12);
            assert_eq!(round.relevant_count(), expected_relevant, "{relevant}/{distractors}");
        }
    }
}
