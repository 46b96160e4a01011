//! Content and comment identifiers.
//!
//! Event sources hand over ids in whatever shape their runtime produces
//! (integers, numeric strings). [`RawContentId`] keeps that shape; a
//! [`ContentId`] only exists once the value has been validated as an unsigned
//! decimal integer.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Identifier exactly as supplied by the event source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawContentId {
    Number(i64),
    /// JSON integers above `i64::MAX`.
    Unsigned(u64),
    Text(String),
}

impl fmt::Display for RawContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawContentId::Number(value) => write!(f, "{value}"),
            RawContentId::Unsigned(value) => write!(f, "{value}"),
            RawContentId::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for RawContentId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<u64> for RawContentId {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(number) => Self::Number(number),
            Err(_) => Self::Unsigned(value),
        }
    }
}

impl From<&str> for RawContentId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawContentId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<ContentId> for RawContentId {
    fn from(value: ContentId) -> Self {
        Self::from(value.get())
    }
}

/// How a negative id is treated when building a [`ContentId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NegativeIdPolicy {
    /// Negative ids are invalid input.
    #[default]
    Reject,
    /// Negative ids are folded to their absolute value.
    Absolute,
}

/// Validated, unsigned content identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(u64);

impl ContentId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// Validate a raw id. Non-numeric text is always rejected; the sign is
    /// handled according to `policy`.
    pub fn from_raw(raw: &RawContentId, policy: NegativeIdPolicy) -> Result<Self, DomainError> {
        match raw {
            RawContentId::Number(value) if *value >= 0 => Ok(Self(value.unsigned_abs())),
            RawContentId::Number(value) => negative(raw, value.unsigned_abs(), policy),
            RawContentId::Unsigned(value) => Ok(Self(*value)),
            RawContentId::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Err(DomainError::invalid_content_id(text.as_str(), "id is empty"));
                }

                let (is_negative, digits) = match trimmed.strip_prefix('-') {
                    Some(rest) => (true, rest),
                    None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
                };

                if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
                    return Err(DomainError::invalid_content_id(
                        text.as_str(),
                        "id is not a decimal integer",
                    ));
                }

                let magnitude = digits.parse::<u64>().map_err(|_| {
                    DomainError::invalid_content_id(text.as_str(), "id exceeds the 64-bit range")
                })?;

                if is_negative && magnitude != 0 {
                    negative(raw, magnitude, policy)
                } else {
                    Ok(Self(magnitude))
                }
            }
        }
    }
}

fn negative(
    raw: &RawContentId,
    magnitude: u64,
    policy: NegativeIdPolicy,
) -> Result<ContentId, DomainError> {
    match policy {
        NegativeIdPolicy::Reject => Err(DomainError::invalid_content_id(
            raw.to_string(),
            "id is negative",
        )),
        NegativeIdPolicy::Absolute => {
            tracing::warn!(
                content_id = %raw,
                coerced = magnitude,
                "Negative content id coerced to its absolute value"
            );
            Ok(ContentId(magnitude))
        }
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a comment; comment events are purged through their parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(u64);

impl CommentId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: impl Into<RawContentId>) -> Result<ContentId, DomainError> {
        ContentId::from_raw(&raw.into(), NegativeIdPolicy::Reject)
    }

    #[test]
    fn accepts_non_negative_numbers_and_numeric_text() {
        assert_eq!(parse(42_i64), Ok(ContentId::new(42)));
        assert_eq!(parse(0_i64), Ok(ContentId::new(0)));
        assert_eq!(parse("99"), Ok(ContentId::new(99)));
        assert_eq!(parse(" 7 "), Ok(ContentId::new(7)));
        assert_eq!(parse("+8"), Ok(ContentId::new(8)));
        assert_eq!(parse(u64::MAX), Ok(ContentId::new(u64::MAX)));
    }

    #[test]
    fn rejects_negative_ids_by_default() {
        let err = parse(-5_i64).expect_err("negative id");
        assert_eq!(err, DomainError::invalid_content_id("-5", "id is negative"));

        assert!(parse("-12").is_err());
    }

    #[test]
    fn negative_zero_text_is_zero() {
        assert_eq!(parse("-0"), Ok(ContentId::new(0)));
    }

    #[test]
    fn absolute_policy_folds_sign() {
        let policy = NegativeIdPolicy::Absolute;
        assert_eq!(
            ContentId::from_raw(&RawContentId::Number(-5), policy),
            Ok(ContentId::new(5))
        );
        assert_eq!(
            ContentId::from_raw(&RawContentId::from("-12"), policy),
            Ok(ContentId::new(12))
        );
        assert_eq!(
            ContentId::from_raw(&RawContentId::Number(i64::MIN), policy),
            Ok(ContentId::new(i64::MIN.unsigned_abs()))
        );
    }

    #[test]
    fn rejects_non_numeric_text_under_any_policy() {
        for policy in [NegativeIdPolicy::Reject, NegativeIdPolicy::Absolute] {
            for raw in ["", "  ", "abc", "42abc", "4.2", "-", "0x10"] {
                assert!(
                    ContentId::from_raw(&RawContentId::from(raw), policy).is_err(),
                    "`{raw}` must be rejected"
                );
            }
        }
    }

    #[test]
    fn rejects_text_beyond_u64() {
        let err = parse("18446744073709551616").expect_err("overflow");
        assert!(matches!(
            err,
            DomainError::InvalidContentId {
                reason: "id exceeds the 64-bit range",
                ..
            }
        ));
    }

    #[test]
    fn raw_id_deserializes_from_number_or_string() {
        let number: RawContentId = serde_json::from_str("42").expect("number id");
        assert_eq!(number, RawContentId::Number(42));

        let text: RawContentId = serde_json::from_str("\"42\"").expect("text id");
        assert_eq!(text, RawContentId::Text("42".to_string()));
    }

    #[test]
    fn ids_beyond_i64_stay_unsigned() {
        let raw = RawContentId::from(u64::MAX);
        assert_eq!(raw, RawContentId::Unsigned(u64::MAX));
        assert_eq!(raw.to_string(), "18446744073709551615");
        assert_eq!(parse(raw), Ok(ContentId::new(u64::MAX)));

        assert_eq!(RawContentId::from(42_u64), RawContentId::Number(42));
    }

    #[test]
    fn raw_id_deserializes_numbers_beyond_i64() {
        let raw: RawContentId =
            serde_json::from_str("18446744073709551615").expect("u64 id");
        assert_eq!(raw, RawContentId::Unsigned(u64::MAX));
        assert_eq!(parse(raw), Ok(ContentId::new(u64::MAX)));

        let max_signed: RawContentId =
            serde_json::from_str("9223372036854775807").expect("i64 id");
        assert_eq!(max_signed, RawContentId::Number(i64::MAX));
    }
}
