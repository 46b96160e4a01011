//! Content transitions delivered by the event source.

use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::ids::RawContentId;

/// One lifecycle event for a content item.
///
/// For comment events `content_id` is the comment's parent item, never the
/// comment itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentTransition {
    /// Correlation id for logs.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub content_id: RawContentId,
    #[serde(flatten)]
    pub kind: TransitionKind,
    /// When the event source observed the change.
    #[serde(default = "OffsetDateTime::now_utc", with = "time::serde::rfc3339")]
    pub observed_at: OffsetDateTime,
}

impl ContentTransition {
    pub fn new(content_id: impl Into<RawContentId>, kind: TransitionKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            content_id: content_id.into(),
            kind,
            observed_at: OffsetDateTime::now_utc(),
        }
    }
}

/// Lifecycle event kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TransitionKind {
    ContentSaved,
    ContentDeleted,
    ContentTrashed,
    AttachmentDeleted,
    CommentStatusChanged {
        #[serde(default)]
        old_status: Option<String>,
        #[serde(default)]
        new_status: Option<String>,
    },
    CommentPosted {
        #[serde(default, deserialize_with = "deserialize_truthy")]
        approved: bool,
    },
}

impl TransitionKind {
    pub fn name(&self) -> &'static str {
        match self {
            TransitionKind::ContentSaved => "content_saved",
            TransitionKind::ContentDeleted => "content_deleted",
            TransitionKind::ContentTrashed => "content_trashed",
            TransitionKind::AttachmentDeleted => "attachment_deleted",
            TransitionKind::CommentStatusChanged { .. } => "comment_status_changed",
            TransitionKind::CommentPosted { .. } => "comment_posted",
        }
    }
}

/// Comment event whose parent content item is not resolved yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CommentEvent {
    CommentStatusChanged {
        #[serde(default)]
        old_status: Option<String>,
        #[serde(default)]
        new_status: Option<String>,
    },
    CommentPosted {
        #[serde(default, deserialize_with = "deserialize_truthy")]
        approved: bool,
    },
}

impl From<CommentEvent> for TransitionKind {
    fn from(event: CommentEvent) -> Self {
        match event {
            CommentEvent::CommentStatusChanged {
                old_status,
                new_status,
            } => TransitionKind::CommentStatusChanged {
                old_status,
                new_status,
            },
            CommentEvent::CommentPosted { approved } => TransitionKind::CommentPosted { approved },
        }
    }
}

/// CMS approval flags arrive as booleans, `0`/`1`, or strings such as
/// `"spam"`. Zero, `""`, `"0"` and `null` are false; anything else is true.
fn deserialize_truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Float(f64),
        Text(String),
    }

    let flag = Option::<Flag>::deserialize(deserializer)?;
    Ok(match flag {
        None => false,
        Some(Flag::Bool(value)) => value,
        Some(Flag::Int(value)) => value != 0,
        Some(Flag::Float(value)) => value != 0.0,
        Some(Flag::Text(value)) => !value.is_empty() && value != "0",
    })
}
