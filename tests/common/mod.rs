//! In-memory collaborators shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use purgewire::application::cdn::{PurgeApiError, SurrogatePurger};
use purgewire::application::repos::{CommentStore, ContentStore, RepoError};
use purgewire::domain::ids::{CommentId, ContentId};
use purgewire::domain::types::ContentStatus;
use purgewire::purge::{PurgeConfig, PurgeDispatcher, PurgeTrigger, SurrogateKey};

/// Content store backed by a map; statuses can change between calls.
#[derive(Default)]
pub struct FakeContentStore {
    statuses: Mutex<HashMap<ContentId, ContentStatus>>,
    lookups: AtomicUsize,
}

impl FakeContentStore {
    pub async fn set(&self, id: u64, status: ContentStatus) {
        self.statuses.lock().await.insert(ContentId::new(id), status);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentStore for FakeContentStore {
    async fn status(&self, id: ContentId) -> Result<Option<ContentStatus>, RepoError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.statuses.lock().await.get(&id).cloned())
    }
}

#[derive(Default)]
pub struct FakeCommentStore {
    parents: Mutex<HashMap<CommentId, ContentId>>,
    lookups: AtomicUsize,
}

impl FakeCommentStore {
    pub async fn set(&self, comment_id: u64, parent_id: u64) {
        self.parents
            .lock()
            .await
            .insert(CommentId::new(comment_id), ContentId::new(parent_id));
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommentStore for FakeCommentStore {
    async fn parent_content_id(&self, comment_id: CommentId) -> Result<ContentId, RepoError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.parents
            .lock()
            .await
            .get(&comment_id)
            .copied()
            .ok_or(RepoError::NotFound)
    }
}

/// What the fake purge API does with each call.
#[derive(Clone, Debug, Default)]
pub enum PurgeMode {
    #[default]
    Accept,
    Fail(PurgeApiError),
    Delay(Duration),
}

#[derive(Default)]
pub struct FakePurger {
    mode: PurgeMode,
    calls: Mutex<Vec<String>>,
}

impl FakePurger {
    pub fn new(mode: PurgeMode) -> Self {
        Self {
            mode,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl SurrogatePurger for FakePurger {
    async fn purge_surrogate_key(&self, key: &SurrogateKey) -> Result<(), PurgeApiError> {
        self.calls.lock().await.push(key.as_str().to_string());
        match &self.mode {
            PurgeMode::Accept => Ok(()),
            PurgeMode::Fail(err) => Err(err.clone()),
            PurgeMode::Delay(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(())
            }
        }
    }
}

/// A fully wired trigger plus handles on its collaborators.
pub struct Pipeline {
    pub trigger: Arc<PurgeTrigger>,
    pub content: Arc<FakeContentStore>,
    pub comments: Arc<FakeCommentStore>,
    pub purger: Arc<FakePurger>,
}

pub fn pipeline(config: PurgeConfig, mode: PurgeMode) -> Pipeline {
    let content = Arc::new(FakeContentStore::default());
    let comments = Arc::new(FakeCommentStore::default());
    let purger = Arc::new(FakePurger::new(mode));

    let dispatcher = Arc::new(PurgeDispatcher::new(
        config.clone(),
        content.clone(),
        purger.clone(),
    ));
    let trigger = Arc::new(PurgeTrigger::new(config, dispatcher).with_comment_store(comments.clone()));

    Pipeline {
        trigger,
        content,
        comments,
        purger,
    }
}
