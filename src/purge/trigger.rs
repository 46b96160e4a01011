//! Purge trigger service.
//!
//! The entry point event sources call for every lifecycle event. It applies
//! the classifier and hands purge-worthy transitions to the dispatcher.

use std::sync::Arc;

use metrics::counter;
use tokio::time::timeout;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::application::repos::{CommentStore, RepoError};
use crate::domain::ids::{CommentId, ContentId, RawContentId};

use super::classifier::{classify, warrants_purge};
use super::config::PurgeConfig;
use super::dispatcher::PurgeDispatcher;
use super::outcome::{PurgeFailure, PurgeOutcome, SuppressReason};
use super::transition::{CommentEvent, ContentTransition, TransitionKind};

const METRIC_TRANSITION_TOTAL: &str = "purgewire_transition_total";

/// Purge trigger wired to one dispatcher.
///
/// # Usage
///
/// ```ignore
/// // After the CMS has saved a post:
/// let outcome = trigger.content_saved(post_id).await;
/// ```
pub struct PurgeTrigger {
    config: PurgeConfig,
    dispatcher: Arc<PurgeDispatcher>,
    comments: Option<Arc<dyn CommentStore>>,
}

impl PurgeTrigger {
    pub fn new(config: PurgeConfig, dispatcher: Arc<PurgeDispatcher>) -> Self {
        Self {
            config,
            dispatcher,
            comments: None,
        }
    }

    /// Enable comment events that still need their parent item resolved.
    pub fn with_comment_store(mut self, comments: Arc<dyn CommentStore>) -> Self {
        self.comments = Some(comments);
        self
    }

    /// Handle one transition and report what happened.
    ///
    /// Never returns an error: failures are part of the outcome so the
    /// triggering content operation can complete regardless.
    #[instrument(
        skip_all,
        fields(
            transition_id = %transition.id,
            event = transition.kind.name(),
            content_id = %transition.content_id
        )
    )]
    pub async fn on_content_transition(&self, transition: ContentTransition) -> PurgeOutcome {
        if !self.config.enabled {
            debug!("Purge trigger skipped: purging disabled");
            return PurgeOutcome::Suppressed(SuppressReason::Disabled);
        }

        count_transition(&transition.kind);
        self.classify_and_dispatch(&transition).await
    }

    async fn classify_and_dispatch(&self, transition: &ContentTransition) -> PurgeOutcome {
        let Some(content_id) = classify(transition) else {
            debug!("Transition suppressed by classifier");
            return PurgeOutcome::Suppressed(SuppressReason::Classifier);
        };

        self.dispatcher.dispatch(&content_id).await
    }

    /// Content was created or updated.
    pub async fn content_saved(&self, content_id: impl Into<RawContentId>) -> PurgeOutcome {
        self.on_content_transition(ContentTransition::new(
            content_id,
            TransitionKind::ContentSaved,
        ))
        .await
    }

    /// Content was permanently deleted.
    pub async fn content_deleted(&self, content_id: impl Into<RawContentId>) -> PurgeOutcome {
        self.on_content_transition(ContentTransition::new(
            content_id,
            TransitionKind::ContentDeleted,
        ))
        .await
    }

    /// Content was moved to the trash.
    pub async fn content_trashed(&self, content_id: impl Into<RawContentId>) -> PurgeOutcome {
        self.on_content_transition(ContentTransition::new(
            content_id,
            TransitionKind::ContentTrashed,
        ))
        .await
    }

    /// An attachment was deleted.
    pub async fn attachment_deleted(&self, content_id: impl Into<RawContentId>) -> PurgeOutcome {
        self.on_content_transition(ContentTransition::new(
            content_id,
            TransitionKind::AttachmentDeleted,
        ))
        .await
    }

    /// A comment moved between statuses.
    pub async fn comment_status_changed(
        &self,
        comment_id: CommentId,
        old_status: Option<String>,
        new_status: Option<String>,
    ) -> PurgeOutcome {
        self.comment_transition(
            Uuid::new_v4(),
            comment_id,
            CommentEvent::CommentStatusChanged {
                old_status,
                new_status,
            },
        )
        .await
    }

    /// A new comment was posted.
    pub async fn comment_posted(&self, comment_id: CommentId, approved: bool) -> PurgeOutcome {
        self.comment_transition(
            Uuid::new_v4(),
            comment_id,
            CommentEvent::CommentPosted { approved },
        )
        .await
    }

    /// Resolve the comment's parent item, then handle the transition as
    /// `transition_id`.
    ///
    /// The parent is only looked up when the event warrants a purge.
    #[instrument(
        skip_all,
        fields(transition_id = %transition_id, comment_id = %comment_id)
    )]
    pub async fn comment_transition(
        &self,
        transition_id: Uuid,
        comment_id: CommentId,
        event: CommentEvent,
    ) -> PurgeOutcome {
        if !self.config.enabled {
            debug!("Purge trigger skipped: purging disabled");
            return PurgeOutcome::Suppressed(SuppressReason::Disabled);
        }

        let kind = TransitionKind::from(event);
        count_transition(&kind);
        if !warrants_purge(&kind) {
            debug!(event = kind.name(), "Comment transition suppressed by classifier");
            return PurgeOutcome::Suppressed(SuppressReason::Classifier);
        }

        match self.parent_of(comment_id).await {
            Ok(parent) => {
                let transition = ContentTransition {
                    id: transition_id,
                    ..ContentTransition::new(parent, kind)
                };
                self.classify_and_dispatch(&transition).await
            }
            Err(err) => {
                warn!(error = %err, "Comment parent lookup failed");
                PurgeOutcome::Failed(PurgeFailure::ParentLookupFailed(err))
            }
        }
    }

    async fn parent_of(&self, comment_id: CommentId) -> Result<ContentId, RepoError> {
        let Some(comments) = &self.comments else {
            return Err(RepoError::unavailable("no comment store configured"));
        };

        timeout(
            self.config.status_timeout(),
            comments.parent_content_id(comment_id),
        )
        .await
        .map_err(|_| RepoError::Timeout)?
    }
}

fn count_transition(kind: &TransitionKind) {
    counter!(METRIC_TRANSITION_TOTAL, "event" => kind.name()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ContentStatus;
    use crate::purge::testing::{
        MemoryCommentStore, MemoryContentStore, PurgeBehavior, RecordingPurger,
    };

    struct Harness {
        trigger: PurgeTrigger,
        store: Arc<MemoryContentStore>,
        comments: Arc<MemoryCommentStore>,
        purger: Arc<RecordingPurger>,
    }

    fn harness(config: PurgeConfig) -> Harness {
        let store = Arc::new(
            MemoryContentStore::default()
                .with_status(42, ContentStatus::Published)
                .with_status(7, ContentStatus::Draft)
                .with_status(99, ContentStatus::Published),
        );
        let comments = Arc::new(MemoryCommentStore::default().with_parent(500, 99));
        let purger = Arc::new(RecordingPurger::with_behavior(PurgeBehavior::Accept));
        let dispatcher = Arc::new(PurgeDispatcher::new(
            config.clone(),
            store.clone(),
            purger.clone(),
        ));
        let trigger = PurgeTrigger::new(config, dispatcher).with_comment_store(comments.clone());

        Harness {
            trigger,
            store,
            comments,
            purger,
        }
    }

    #[tokio::test]
    async fn saved_published_content_is_purged() {
        let h = harness(PurgeConfig::default());

        let outcome = h.trigger.content_saved(42_i64).await;

        assert!(outcome.is_sent());
        assert_eq!(h.purger.calls(), vec!["post-42".to_string()]);
    }

    #[tokio::test]
    async fn saved_draft_is_suppressed_by_gate() {
        let h = harness(PurgeConfig::default());

        let outcome = h.trigger.content_saved(7_i64).await;

        assert_eq!(
            outcome,
            PurgeOutcome::Suppressed(SuppressReason::StatusGate(ContentStatus::Draft))
        );
        assert!(h.purger.calls().is_empty());
    }

    #[tokio::test]
    async fn every_content_event_reaches_the_dispatcher() {
        let h = harness(PurgeConfig::default());

        h.trigger.content_deleted(42_i64).await;
        h.trigger.content_trashed(42_i64).await;
        h.trigger.attachment_deleted(42_i64).await;

        assert_eq!(h.purger.calls().len(), 3);
    }

    #[tokio::test]
    async fn disabled_trigger_touches_nothing() {
        let h = harness(PurgeConfig {
            enabled: false,
            ..Default::default()
        });

        let outcome = h.trigger.content_saved(42_i64).await;
        let comment = h.trigger.comment_posted(CommentId::new(500), true).await;

        assert_eq!(outcome, PurgeOutcome::Suppressed(SuppressReason::Disabled));
        assert_eq!(comment, PurgeOutcome::Suppressed(SuppressReason::Disabled));
        assert_eq!(h.store.lookups(), 0);
        assert_eq!(h.comments.lookups(), 0);
        assert!(h.purger.calls().is_empty());
    }

    #[tokio::test]
    async fn approved_comment_purges_parent() {
        let h = harness(PurgeConfig::default());

        let outcome = h
            .trigger
            .comment_status_changed(
                CommentId::new(500),
                Some("pending".to_string()),
                Some("approved".to_string()),
            )
            .await;

        assert!(outcome.is_sent());
        assert_eq!(h.purger.calls(), vec!["post-99".to_string()]);
    }

    #[tokio::test]
    async fn suppressed_comment_skips_parent_lookup() {
        let h = harness(PurgeConfig::default());

        let outcome = h.trigger.comment_posted(CommentId::new(500), false).await;

        assert_eq!(outcome, PurgeOutcome::Suppressed(SuppressReason::Classifier));
        assert_eq!(h.comments.lookups(), 0);
        assert!(h.purger.calls().is_empty());
    }

    #[tokio::test]
    async fn unknown_comment_reports_parent_lookup_failure() {
        let h = harness(PurgeConfig::default());

        let outcome = h.trigger.comment_posted(CommentId::new(1), true).await;

        assert_eq!(
            outcome,
            PurgeOutcome::Failed(PurgeFailure::ParentLookupFailed(RepoError::NotFound))
        );
        assert!(h.purger.calls().is_empty());
    }

    #[tokio::test]
    async fn comment_events_need_a_comment_store() {
        let store = Arc::new(MemoryContentStore::default());
        let purger = Arc::new(RecordingPurger::default());
        let dispatcher = Arc::new(PurgeDispatcher::new(
            PurgeConfig::default(),
            store,
            purger,
        ));
        let trigger = PurgeTrigger::new(PurgeConfig::default(), dispatcher);

        let outcome = trigger.comment_posted(CommentId::new(500), true).await;

        assert!(matches!(
            outcome,
            PurgeOutcome::Failed(PurgeFailure::ParentLookupFailed(RepoError::Unavailable { .. }))
        ));
    }

    #[tokio::test]
    async fn parent_lookup_is_bounded_by_status_timeout() {
        let config = PurgeConfig {
            status_timeout_ms: 20,
            ..Default::default()
        };
        let purger = Arc::new(RecordingPurger::default());
        let dispatcher = Arc::new(PurgeDispatcher::new(
            config.clone(),
            Arc::new(MemoryContentStore::default().with_status(99, ContentStatus::Published)),
            purger.clone(),
        ));
        let comments = Arc::new(MemoryCommentStore::hanging());
        let trigger = PurgeTrigger::new(config, dispatcher).with_comment_store(comments.clone());

        let outcome = trigger.comment_posted(CommentId::new(500), true).await;

        assert_eq!(
            outcome,
            PurgeOutcome::Failed(PurgeFailure::ParentLookupFailed(RepoError::Timeout))
        );
        assert_eq!(comments.lookups(), 1);
        assert!(purger.calls().is_empty());
    }

    #[tokio::test]
    async fn resolved_comment_transition_passes_through_classifier() {
        let h = harness(PurgeConfig::default());

        let suppressed = h
            .trigger
            .on_content_transition(ContentTransition::new(
                99_i64,
                TransitionKind::CommentStatusChanged {
                    old_status: Some("spam".to_string()),
                    new_status: Some("trash".to_string()),
                },
            ))
            .await;

        assert_eq!(
            suppressed,
            PurgeOutcome::Suppressed(SuppressReason::Classifier)
        );
        assert_eq!(h.store.lookups(), 0);
    }
}
