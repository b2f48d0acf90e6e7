//! Asynchronous abstraction for sourcing round content.
//!
//! Runtime users plug in [`RoundProvider`] implementations so sessions can
//! run against a remote generator, an offline deck, or scripted fixtures.
use async_trait::async_trait;
use thiserror::Error;

use game_core::RoundData;

/// Parameters sent with every round request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoundRequest {
    /// Diagnoses the provider should avoid, most recent first.
    pub recent_diagnoses: Vec<String>,
    /// Number of relevant tiles the round should contain.
    pub correct_count_target: usize,
    /// Number of tiles on the board.
    pub tile_count: usize,
}

/// Trait for producing a fresh round of content.
///
/// Implementations report failures through [`ProviderError`]; the retry
/// policy decides from [`ProviderError::is_transient`] whether another
/// attempt is worthwhile.
#[async_trait]
pub trait RoundProvider: Send + Sync {
    async fn generate_round(
        &self,
        request: &RoundRequest,
    ) -> std::result::Result<RoundData, ProviderError>;
}

/// Failure reported by a [`RoundProvider`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("provider responded with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("provider misconfigured: {0}")]
    Configuration(String),

    #[error("invalid round content: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Other(String),
}

const TRANSIENT_KEYWORDS: [&str; 4] = ["connection", "network", "timeout", "timed out"];

impl ProviderError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether retrying the same request could succeed.
    ///
    /// Server errors (5xx), network failures and timeouts are transient, as
    /// is anything that carries no status at all. Other statuses, bad
    /// configuration and malformed content are permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Status { status, message } => *status >= 500 || mentions_transport(message),
            Self::Network(_) | Self::Timeout(_) | Self::Other(_) => true,
            Self::Configuration(_) | Self::InvalidResponse(_) => false,
        }
    }
}

fn mentions_transport(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    TRANSIENT_KEYWORDS.iter().any(|k| message.contains(k))
}
