use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("invalid content id `{value}`: {reason}")]
    InvalidContentId { value: String, reason: &'static str },
}

impl DomainError {
    pub fn invalid_content_id(value: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidContentId {
            value: value.into(),
            reason,
        }
    }
}
