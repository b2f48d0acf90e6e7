//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, storage, and session transitions
//! so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use game_core::SessionError;

pub use crate::store::StoreError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("session worker command channel closed")]
    CommandChannelClosed,

    #[error("session worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("session worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("runtime requires a round provider before building")]
    MissingProvider,

    #[error("invalid username: {0}")]
    InvalidUsername(String),
}

impl RuntimeError {
    /// True for session rejections that a presentation layer may drop silently.
    pub fn is_ignorable(&self) -> bool {
        matches!(self, Self::Session(e) if e.is_ignorable())
    }
}
