//! Event classification.
//!
//! Content events always proceed to the dispatcher, where the status gate has
//! the final say. Comment events proceed only when they change what a reader
//! of the parent item can see.

use crate::domain::ids::RawContentId;
use crate::domain::types::COMMENT_APPROVED;

use super::transition::{ContentTransition, TransitionKind};

/// Whether a transition of this kind can change cached output.
pub fn warrants_purge(kind: &TransitionKind) -> bool {
    match kind {
        TransitionKind::ContentSaved
        | TransitionKind::ContentDeleted
        | TransitionKind::ContentTrashed
        | TransitionKind::AttachmentDeleted => true,
        // Moving into or out of `approved` adds or removes a visible comment.
        TransitionKind::CommentStatusChanged {
            old_status,
            new_status,
        } => is_approved(old_status.as_deref()) || is_approved(new_status.as_deref()),
        TransitionKind::CommentPosted { approved } => *approved,
    }
}

/// Content id to purge for `transition`, or `None` when it is suppressed.
pub fn classify(transition: &ContentTransition) -> Option<RawContentId> {
    warrants_purge(&transition.kind).then(|| transition.content_id.clone())
}

fn is_approved(status: Option<&str>) -> bool {
    status == Some(COMMENT_APPROVED)
}
