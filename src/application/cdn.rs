//! Port to the edge cache's surrogate-key purge API.

use async_trait::async_trait;
use thiserror::Error;

use crate::purge::SurrogateKey;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurgeApiError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("purge API rejected the credentials (status {status})")]
    Unauthorized { status: u16 },
    #[error("purge API rate limit exceeded")]
    RateLimited,
    #[error("purge API returned status {status}: {body}")]
    Rejected { status: u16, body: String },
}

impl PurgeApiError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Issues one purge instruction for a surrogate key.
///
/// Implementations make a single attempt; the caller bounds the wait.
#[async_trait]
pub trait SurrogatePurger: Send + Sync {
    async fn purge_surrogate_key(&self, key: &SurrogateKey) -> Result<(), PurgeApiError>;
}
