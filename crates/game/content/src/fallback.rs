//! Fixed round served when the round provider fails permanently.

use game_core::{Difficulty, RoundData, Tile};

/// The offline-safe round used for fallback.
///
/// Tile ids are stable (`"1"` to `"12"`) so the round is identical every time.
pub fn fallback_round() -> RoundData {
    let relevant = [
        "RLQ Pain",
        "McBurney's Point",
        "Anorexia",
        "Nausea",
        "Fever",
        "Leukocytosis",
        "Rebound Tenderness",
    ];
    let distractors = [
        "Left Arm Pain",
        "Visual Aura",
        "Productive Cough",
        "Jaundice",
        "Bradycardia",
    ];

    let tiles = relevant
        .iter()
        .map(|text| (text, true))
        .chain(distractors.iter().map(|text| (text, false)))
        .enumerate()
        .map(|(index, (text, is_relevant))| Tile::new((index + 1).to_string(), *text, is_relevant))
        .collect();

    RoundData {
        diagnosis: "Acute Appendicitis".to_string(),
        category: "General Surgery".to_string(),
        difficulty: Difficulty::Easy,
        tiles,
    }
}
