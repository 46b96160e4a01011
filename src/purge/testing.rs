//! In-memory collaborators for purge engine unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::application::cdn::{PurgeApiError, SurrogatePurger};
use crate::application::repos::{CommentStore, ContentStore, RepoError};
use crate::domain::ids::{CommentId, ContentId};
use crate::domain::types::ContentStatus;

use super::keys::SurrogateKey;

#[derive(Default)]
pub(crate) struct MemoryContentStore {
    statuses: HashMap<ContentId, ContentStatus>,
    failure: Option<RepoError>,
    hang: bool,
    lookups: AtomicUsize,
}

impl MemoryContentStore {
    pub(crate) fn with_status(mut self, id: u64, status: ContentStatus) -> Self {
        self.statuses.insert(ContentId::new(id), status);
        self
    }

    pub(crate) fn failing(error: RepoError) -> Self {
        Self {
            failure: Some(error),
            ..Default::default()
        }
    }

    pub(crate) fn hanging() -> Self {
        Self {
            hang: true,
            ..Default::default()
        }
    }

    pub(crate) fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn status(&self, id: ContentId) -> Result<Option<ContentStatus>, RepoError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.hang {
            std::future::pending::<()>().await;
        }
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        Ok(self.statuses.get(&id).cloned())
    }
}

#[derive(Default)]
pub(crate) struct MemoryCommentStore {
    parents: HashMap<CommentId, ContentId>,
    hang: bool,
    lookups: AtomicUsize,
}

impl MemoryCommentStore {
    pub(crate) fn with_parent(mut self, comment_id: u64, parent_id: u64) -> Self {
        self.parents
            .insert(CommentId::new(comment_id), ContentId::new(parent_id));
        self
    }

    pub(crate) fn hanging() -> Self {
        Self {
            hang: true,
            ..Default::default()
        }
    }

    pub(crate) fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommentStore for MemoryCommentStore {
    async fn parent_content_id(&self, comment_id: CommentId) -> Result<ContentId, RepoError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.hang {
            std::future::pending::<()>().await;
        }
        self.parents
            .get(&comment_id)
            .copied()
            .ok_or(RepoError::NotFound)
    }
}

#[derive(Clone, Copy, Default)]
pub(crate) enum PurgeBehavior {
    #[default]
    Accept,
    RateLimited,
    Hang,
}

#[derive(Default)]
pub(crate) struct RecordingPurger {
    behavior: PurgeBehavior,
    calls: Mutex<Vec<String>>,
}

impl RecordingPurger {
    pub(crate) fn with_behavior(behavior: PurgeBehavior) -> Self {
        Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl SurrogatePurger for RecordingPurger {
    async fn purge_surrogate_key(&self, key: &SurrogateKey) -> Result<(), PurgeApiError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(key.as_str().to_string());
        match self.behavior {
            PurgeBehavior::Accept => Ok(()),
            PurgeBehavior::RateLimited => Err(PurgeApiError::RateLimited),
            PurgeBehavior::Hang => std::future::pending().await,
        }
    }
}
