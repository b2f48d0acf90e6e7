use crate::round::TileId;

use super::state::{Epoch, GameStatus};

/// Commands and events a session can reject.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("cannot {command} while {status}")]
    InvalidTransition {
        command: &'static str,
        status: GameStatus,
    },

    #[error("event from epoch {event} arrived after the session moved to {current}")]
    StaleEpoch { event: Epoch, current: Epoch },

    #[error("input ignored while {status}")]
    NotAcceptingInput { status: GameStatus },

    #[error("no tile with id {0}")]
    UnknownTile(TileId),

    #[error("tile {0} was already picked")]
    TileAlreadyResolved(TileId),

    #[error("no game over is pending")]
    NoPendingGameOver,
}

impl SessionError {
    /// Expected races and repeated input: dropped silently rather than reported.
    pub const fn is_ignorable(&self) -> bool {
        matches!(
            self,
            Self::StaleEpoch { .. }
                | Self::NotAcceptingInput { .. }
                | Self::TileAlreadyResolved(_)
                | Self::NoPendingGameOver
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn races_are_ignorable_but_misuse_is_not() {
        let stale = SessionError::StaleEpoch {
            event: Epoch(1),
            current: Epoch(2),
        };
        assert!(stale.is_ignorable());
        assert!(
            !SessionError::InvalidTransition {
                command: "reveal",
                status: GameStatus::Menu
            }
            .is_ignorable()
        );
        assert_eq!(
            SessionError::InvalidTransition {
                command: "reveal",
                status: GameStatus::Menu
            }
            .to_string(),
            "cannot reveal while Menu"
        );
    }
}
