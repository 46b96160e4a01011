//! Store traits the purge engine queries at dispatch time.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::ids::{CommentId, ContentId};
use crate::domain::types::ContentStatus;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepoError {
    #[error("store request failed: {0}")]
    Request(String),
    #[error("resource not found")]
    NotFound,
    #[error("invalid store response: {message}")]
    InvalidResponse { message: String },
    #[error("store timeout")]
    Timeout,
    #[error("store unavailable: {message}")]
    Unavailable { message: String },
}

impl RepoError {
    pub fn from_request(err: impl std::fmt::Display) -> Self {
        Self::Request(err.to_string())
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Read access to the lifecycle status of content items.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Current status of `id`, or `None` when the item no longer exists.
    async fn status(&self, id: ContentId) -> Result<Option<ContentStatus>, RepoError>;
}

/// Resolves comments to the content item they belong to.
#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn parent_content_id(&self, comment_id: CommentId) -> Result<ContentId, RepoError>;
}
