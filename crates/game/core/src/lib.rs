//! Deterministic rules and data types for the symptom-sprint trivia game.
//!
//! `game-core` defines the canonical rules (scoring, health, countdown) and
//! the round session state machine, exposed as pure APIs without I/O. All
//! session mutation flows through [`session::Session`]; the runtime crate
//! performs the [`session::Effect`]s it returns.
pub mod config;
pub mod history;
pub mod round;
pub mod scoring;
pub mod session;
pub mod timer;

pub use config::{GameConfig, HealthConfig, HealthZone, ScoringConfig};
pub use history::RecentDiagnoses;
pub use round::{Difficulty, RoundData, RoundError, Tile, TileId, TileState};
pub use scoring::{Bonus, BonusKind, Pick, PickOutcome, evaluate_pick};
pub use session::{
    Effect, Epoch, Feedback, GameOverSummary, GameStatus, LoadingView, RetryNotice, RetryState,
    RoundFailure, Session, SessionError, SessionSnapshot, SessionState,
};
pub use timer::{Countdown, TickOutcome};
