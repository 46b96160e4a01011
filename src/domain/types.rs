//! Lifecycle statuses reported by the content store.

use std::fmt;

use serde::{Serialize, Serializer};

/// Comment status that makes a comment publicly visible.
pub const COMMENT_APPROVED: &str = "approved";

/// Current lifecycle status of a content item.
///
/// Parsing is lenient: unknown statuses are preserved in [`ContentStatus::Other`]
/// so they still show up in logs and never pass the status gate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContentStatus {
    Published,
    Trashed,
    Draft,
    AutoDraft,
    Pending,
    Private,
    Scheduled,
    Inherit,
    Other(String),
}

impl ContentStatus {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "publish" | "published" => ContentStatus::Published,
            "trash" | "trashed" => ContentStatus::Trashed,
            "draft" => ContentStatus::Draft,
            "auto-draft" => ContentStatus::AutoDraft,
            "pending" => ContentStatus::Pending,
            "private" => ContentStatus::Private,
            "future" => ContentStatus::Scheduled,
            "inherit" => ContentStatus::Inherit,
            other => ContentStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ContentStatus::Published => "published",
            ContentStatus::Trashed => "trashed",
            ContentStatus::Draft => "draft",
            ContentStatus::AutoDraft => "auto-draft",
            ContentStatus::Pending => "pending",
            ContentStatus::Private => "private",
            ContentStatus::Scheduled => "future",
            ContentStatus::Inherit => "inherit",
            ContentStatus::Other(value) => value.as_str(),
        }
    }

    /// Only public or just-removed content can be sitting in the edge cache.
    pub fn is_cache_relevant(&self) -> bool {
        matches!(self, ContentStatus::Published | ContentStatus::Trashed)
    }
}

impl fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ContentStatus {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl Serialize for ContentStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
