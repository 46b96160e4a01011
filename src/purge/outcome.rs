//! Dispatch outcomes.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::application::cdn::PurgeApiError;
use crate::application::repos::RepoError;
use crate::domain::error::DomainError;
use crate::domain::types::ContentStatus;

use super::keys::SurrogateKey;

/// Result of handling one transition.
///
/// `Sent` means the purge API accepted the call; it says nothing about when
/// the edge applies it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurgeOutcome {
    Suppressed(SuppressReason),
    Sent(SurrogateKey),
    Failed(PurgeFailure),
}

impl PurgeOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            PurgeOutcome::Suppressed(_) => "suppressed",
            PurgeOutcome::Sent(_) => "sent",
            PurgeOutcome::Failed(_) => "failed",
        }
    }

    pub fn key(&self) -> Option<&SurrogateKey> {
        match self {
            PurgeOutcome::Sent(key) => Some(key),
            _ => None,
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, PurgeOutcome::Sent(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, PurgeOutcome::Failed(_))
    }
}

impl fmt::Display for PurgeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PurgeOutcome::Suppressed(reason) => write!(f, "suppressed ({reason})"),
            PurgeOutcome::Sent(key) => write!(f, "sent `{key}`"),
            PurgeOutcome::Failed(failure) => write!(f, "failed ({failure})"),
        }
    }
}

/// Why no purge was attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuppressReason {
    /// Purging is switched off in configuration.
    Disabled,
    /// The transition cannot change cached output.
    Classifier,
    /// The content store no longer knows the item.
    ContentMissing,
    /// The item's current status keeps it out of the cache.
    StatusGate(ContentStatus),
}

impl fmt::Display for SuppressReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuppressReason::Disabled => f.write_str("purging disabled"),
            SuppressReason::Classifier => f.write_str("transition does not affect cached output"),
            SuppressReason::ContentMissing => f.write_str("content not found"),
            SuppressReason::StatusGate(status) => write!(f, "content status `{status}`"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurgeFailure {
    #[error(transparent)]
    InvalidContentId(#[from] DomainError),
    #[error("content status lookup failed: {0}")]
    StatusLookupFailed(RepoError),
    #[error("comment parent lookup failed: {0}")]
    ParentLookupFailed(RepoError),
    #[error("purge call failed: {0}")]
    PurgeCallFailed(#[from] PurgeApiError),
    #[error("purge call timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
}

impl PurgeFailure {
    pub fn code(&self) -> &'static str {
        match self {
            PurgeFailure::InvalidContentId(_) => "invalid_content_id",
            PurgeFailure::StatusLookupFailed(_) => "status_lookup_failed",
            PurgeFailure::ParentLookupFailed(_) => "parent_lookup_failed",
            PurgeFailure::PurgeCallFailed(_) => "purge_call_failed",
            PurgeFailure::Timeout(_) => "timeout",
        }
    }
}
