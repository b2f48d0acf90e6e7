//! Game configuration constants and tunable parameters.
//!
//! [`GameConfig`] is the single configuration object shared by the session
//! state machine and presentation layers. Every value has a compile-time
//! default exposed as an associated constant; a config file may override any
//! subset of them (see `game_content::ConfigLoader`).
use std::time::Duration;

/// Top-level tunables for rounds, scoring, health and timing.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    /// Length of a round in milliseconds.
    pub round_duration_ms: u64,
    /// Number of tiles every round must contain.
    pub tile_count: usize,
    /// Number of relevant tiles the generator should aim for.
    pub correct_count_target: usize,
    /// Countdown granularity in milliseconds.
    pub tick_interval_ms: u64,
    /// Delay between health depletion and the hard transition to game over.
    pub game_over_delay_ms: u64,
    /// Maximum number of recent diagnoses remembered for exclusion.
    pub recent_history_limit: usize,
    pub scoring: ScoringConfig,
    pub health: HealthConfig,
}

impl GameConfig {
    pub const DEFAULT_ROUND_DURATION_MS: u64 = 15_000;
    pub const DEFAULT_TILE_COUNT: usize = 12;
    pub const DEFAULT_CORRECT_COUNT_TARGET: usize = 7;
    pub const DEFAULT_TICK_INTERVAL_MS: u64 = 100;
    pub const DEFAULT_GAME_OVER_DELAY_MS: u64 = 100;
    pub const DEFAULT_RECENT_HISTORY_LIMIT: usize = 20;

    pub fn new() -> Self {
        Self {
            round_duration_ms: Self::DEFAULT_ROUND_DURATION_MS,
            tile_count: Self::DEFAULT_TILE_COUNT,
            correct_count_target: Self::DEFAULT_CORRECT_COUNT_TARGET,
            tick_interval_ms: Self::DEFAULT_TICK_INTERVAL_MS,
            game_over_delay_ms: Self::DEFAULT_GAME_OVER_DELAY_MS,
            recent_history_limit: Self::DEFAULT_RECENT_HISTORY_LIMIT,
            scoring: ScoringConfig::default(),
            health: HealthConfig::default(),
        }
    }

    pub fn round_duration(&self) -> Duration {
        Duration::from_millis(self.round_duration_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn game_over_delay(&self) -> Duration {
        Duration::from_millis(self.game_over_delay_ms)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Point values awarded or deducted per pick.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScoringConfig {
    pub correct_pick: i64,
    /// Negative value applied on a distractor pick.
    pub incorrect_pick: i64,
    pub combo_bonus: i64,
    /// Streak length at which the combo bonus fires (and every multiple).
    pub combo_streak: u32,
    pub perfect_round_bonus: i64,
}

impl ScoringConfig {
    pub const CORRECT_PICK: i64 = 5;
    pub const INCORRECT_PICK: i64 = -10;
    pub const COMBO_BONUS: i64 = 25;
    pub const COMBO_STREAK: u32 = 5;
    pub const PERFECT_ROUND_BONUS: i64 = 100;
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            correct_pick: Self::CORRECT_PICK,
            incorrect_pick: Self::INCORRECT_PICK,
            combo_bonus: Self::COMBO_BONUS,
            combo_streak: Self::COMBO_STREAK,
            perfect_round_bonus: Self::PERFECT_ROUND_BONUS,
        }
    }
}

/// Health pool and display thresholds.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HealthConfig {
    pub starting: u32,
    pub maximum: u32,
    /// Health removed by a distractor pick (positive magnitude).
    pub wrong_pick_penalty: u32,
    pub combo_bonus: u32,
    /// Health at or above this value is displayed as safe.
    pub safe_threshold: u32,
    /// Health at or above this value (and below safe) is a warning.
    pub warning_threshold: u32,
}

impl HealthConfig {
    pub const STARTING: u32 = 100;
    pub const MAXIMUM: u32 = 100;
    pub const WRONG_PICK_PENALTY: u32 = 15;
    pub const COMBO_BONUS: u32 = 15;
    pub const SAFE_THRESHOLD: u32 = 60;
    pub const WARNING_THRESHOLD: u32 = 30;

    /// Classifies a health value into its display zone.
    pub fn zone(&self, health: u32) -> HealthZone {
        if health >= self.safe_threshold {
            HealthZone::Safe
        } else if health >= self.warning_threshold {
            HealthZone::Warning
        } else {
            HealthZone::Critical
        }
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            starting: Self::STARTING,
            maximum: Self::MAXIMUM,
            wrong_pick_penalty: Self::WRONG_PICK_PENALTY,
            combo_bonus: Self::COMBO_BONUS,
            safe_threshold: Self::SAFE_THRESHOLD,
            warning_threshold: Self::WARNING_THRESHOLD,
        }
    }
}

/// Display zone for the health bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "lowercase")]
pub enum HealthZone {
    Safe,
    Warning,
    Critical,
}

impl HealthZone {
    /// Low health pulses in the UI.
    pub const fn is_low(&self) -> bool {
        matches!(self, Self::Critical)
    }
}
