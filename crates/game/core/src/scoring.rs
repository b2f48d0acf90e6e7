//! Score, combo and health arithmetic for a single tile pick.
//!
//! [`evaluate_pick`] is pure: it never touches session state. The session
//! applies the returned [`PickOutcome`] and decides on transitions.
use crate::config::GameConfig;

/// What the player picked, as seen by the scoring rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pick {
    /// A relevant tile.
    Correct {
        /// Whether this pick leaves no relevant tile unfound.
        completes_round: bool,
        /// Number of relevant tiles in the round.
        relevant_total: usize,
    },
    /// A distractor tile.
    Incorrect,
}

/// Kind of an extra award on top of the base pick value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BonusKind {
    /// Score bonus for every full combo streak.
    Combo,
    /// Health restored alongside the combo bonus.
    ComboHealth,
    /// Round completed without a single mistake.
    PerfectRound,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bonus {
    pub amount: i64,
    pub kind: BonusKind,
}

/// Deltas produced by one pick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PickOutcome {
    /// Base value plus every score bonus.
    pub score_delta: i64,
    pub combo_after: u32,
    /// Effective health change after clamping to `[0, maximum]`.
    pub health_delta: i64,
    pub health_after: u32,
    pub bonuses: Vec<Bonus>,
}

impl PickOutcome {
    /// Health hit zero with this pick.
    pub fn depletes_health(&self) -> bool {
        self.health_after == 0
    }

    /// Base value of the pick without bonuses.
    pub fn base_score(&self) -> i64 {
        self.score_delta
            - self
                .bonuses
                .iter()
                .filter(|bonus| bonus.kind != BonusKind::ComboHealth)
                .map(|bonus| bonus.amount)
                .sum::<i64>()
    }
}

/// Computes the effect of a pick given the current combo and health.
pub fn evaluate_pick(config: &GameConfig, pick: Pick, combo: u32, health: u32) -> PickOutcome {
    let scoring = &config.scoring;
    let rules = &config.health;
    let health = health.min(rules.maximum);

    match pick {
        Pick::Correct {
            completes_round,
            relevant_total,
        } => {
            let combo_after = combo.saturating_add(1);
            let mut score_delta = scoring.correct_pick;
            let mut health_after = health;
            let mut bonuses = Vec::new();

            if scoring.combo_streak > 0 && combo_after % scoring.combo_streak == 0 {
                score_delta += scoring.combo_bonus;
                bonuses.push(Bonus {
                    amount: scoring.combo_bonus,
                    kind: BonusKind::Combo,
                });

                health_after = health.saturating_add(rules.combo_bonus).min(rules.maximum);
                bonuses.push(Bonus {
                    amount: i64::from(health_after - health),
                    kind: BonusKind::ComboHealth,
                });
            }

            if completes_round && combo_after as usize == relevant_total {
                score_delta += scoring.perfect_round_bonus;
                bonuses.push(Bonus {
                    amount: scoring.perfect_round_bonus,
                    kind: BonusKind::PerfectRound,
                });
            }

            PickOutcome {
                score_delta,
                combo_after,
                health_delta: i64::from(health_after) - i64::from(health),
                health_after,
                bonuses,
            }
        }
        Pick::Incorrect => {
            let health_after = health.saturating_sub(rules.wrong_pick_penalty);
            PickOutcome {
                score_delta: scoring.incorrect_pick,
                combo_after: 0,
                health_delta: i64::from(health_after) - i64::from(health),
                health_after,
                bonuses: Vec::new(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MID_ROUND: Pick = Pick::Correct {
        completes_round: false,
        relevant_total: 7,
    };

    #[test]
    fn correct_pick_increments_combo() {
        let config = GameConfig::default();
        for combo in [0, 1, 3, 7, 12] {
            let outcome = evaluate_pick(&config, MID_ROUND, combo, 100);
            assert_eq!(outcome.combo_after, combo + 1);
        }
    }

    #[test]
    fn incorrect_pick_resets_combo_and_costs_health() {
        let config = GameConfig::default();
        for combo in [0, 4, 9] {
            let outcome = evaluate_pick(&config, Pick::Incorrect, combo, 85);
            assert_eq!(outcome.combo_after, 0);
            assert_eq!(outcome.score_delta, -10);
            assert_eq!(outcome.health_delta, -15);
            assert_eq!(outcome.health_after, 70);
        }
    }

    #[test]
    fn combo_bonus_fires_on_every_fifth_pick_only() {
        let config = GameConfig::default();
        let fired: Vec<u32> = (0..16)
            .filter(|&combo| {
                evaluate_pick(&config, MID_ROUND, combo, 50)
                    .bonuses
                    .iter()
                    .any(|bonus| bonus.kind == BonusKind::Combo)
            })
            .map(|combo| combo + 1)
            .collect();

        assert_eq!(fired, vec![5, 10, 15]);
    }

    #[test]
    fn combo_health_bonus_is_capped() {
        let config = GameConfig::default();

        let at_cap = evaluate_pick(&config, MID_ROUND, 4, 100);
        assert_eq!(at_cap.score_delta, 30);
        assert_eq!(at_cap.health_delta, 0);
        assert_eq!(at_cap.health_after, 100);

        let partial = evaluate_pick(&config, MID_ROUND, 4, 92);
        assert_eq!(partial.health_after, 100);
        assert_eq!(partial.health_delta, 8);

        let full = evaluate_pick(&config, MID_ROUND, 4, 40);
        assert_eq!(full.health_after, 55);
    }

    #[test]
    fn health_floors_at_zero() {
        let config = GameConfig::default();
        let outcome = evaluate_pick(&config, Pick::Incorrect, 0, 10);
        assert_eq!(outcome.health_after, 0);
        assert_eq!(outcome.health_delta, -10);
        assert!(outcome.depletes_health());

        let exact = evaluate_pick(&config, Pick::Incorrect, 0, 15);
        assert!(exact.depletes_health());
    }

    #[test]
    fn perfect_round_requires_streak_covering_every_relevant_tile() {
        let config = GameConfig::default();
        let finishing = Pick::Correct {
            completes_round: true,
            relevant_total: 7,
        };

        let perfect = evaluate_pick(&config, finishing, 6, 100);
        assert!(
            perfect
                .bonuses
                .iter()
                .any(|bonus| bonus.kind == BonusKind::PerfectRound)
        );
        assert_eq!(perfect.score_delta, 105);
        assert_eq!(perfect.base_score(), 5);

        let flawed = evaluate_pick(&config, finishing, 3, 100);
        assert!(flawed.bonuses.is_empty());
        assert_eq!(flawed.score_delta, 5);
    }

    #[test]
    fn perfect_round_on_combo_boundary_stacks_both_bonuses() {
        let config = GameConfig::default();
        let finishing = Pick::Correct {
            completes_round: true,
            relevant_total: 5,
        };

        let outcome = evaluate_pick(&config, finishing, 4, 100);
        assert_eq!(outcome.score_delta, 5 + 25 + 100);
        assert_eq!(outcome.base_score(), 5);
    }
}
