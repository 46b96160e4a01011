//! Surrogate key derivation.
//!
//! Every cached response rendered from a content item carries the item's
//! surrogate key, so one purge evicts all of them without knowing their URLs.

use std::fmt;

use serde::Serialize;

use crate::domain::ids::ContentId;

/// Prefix shared by all content-item surrogate keys.
pub const CONTENT_KEY_PREFIX: &str = "post-";

/// Canonical cache tag of a content item: `post-<decimal id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SurrogateKey(String);

impl SurrogateKey {
    pub fn for_content(id: ContentId) -> Self {
        Self(format!("{CONTENT_KEY_PREFIX}{id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SurrogateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SurrogateKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
