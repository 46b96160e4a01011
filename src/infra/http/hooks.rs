//! Webhook handlers that feed CMS events into the purge trigger.

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::ids::CommentId;
use crate::purge::{CommentEvent, ContentTransition, PurgeOutcome};

use super::HookState;
use super::error::ApiError;

/// Body of every accepted webhook call.
#[derive(Debug, Serialize)]
pub struct OutcomeReport {
    pub transition_id: Uuid,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl OutcomeReport {
    pub fn new(transition_id: Uuid, outcome: &PurgeOutcome) -> Self {
        let (key, code, reason) = match outcome {
            PurgeOutcome::Sent(key) => (Some(key.to_string()), None, None),
            PurgeOutcome::Suppressed(reason) => (None, None, Some(reason.to_string())),
            PurgeOutcome::Failed(failure) => {
                (None, Some(failure.code()), Some(failure.to_string()))
            }
        };

        Self {
            transition_id,
            outcome: outcome.label(),
            key,
            code,
            reason,
        }
    }
}

type Accepted = (StatusCode, Json<OutcomeReport>);

pub async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// `POST /hooks/transitions`
///
/// Replies 202 whatever the purge outcome; only malformed input is an error.
pub async fn content_transition(
    State(state): State<HookState>,
    payload: Result<Json<ContentTransition>, JsonRejection>,
) -> Result<Accepted, ApiError> {
    let Json(transition) = payload.map_err(|rejection| {
        ApiError::bad_request(
            rejection.status(),
            "Invalid transition payload",
            rejection.body_text(),
        )
    })?;

    let transition_id = transition.id;
    let outcome = state.trigger.on_content_transition(transition).await;

    Ok((
        StatusCode::ACCEPTED,
        Json(OutcomeReport::new(transition_id, &outcome)),
    ))
}

/// `POST /hooks/comments/{comment_id}`
pub async fn comment_event(
    State(state): State<HookState>,
    comment_id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<CommentEvent>, JsonRejection>,
) -> Result<Accepted, ApiError> {
    let Path(comment_id) = comment_id.map_err(|rejection| {
        ApiError::bad_request(
            rejection.status(),
            "Invalid comment id",
            rejection.body_text(),
        )
    })?;
    let Json(event) = payload.map_err(|rejection| {
        ApiError::bad_request(
            rejection.status(),
            "Invalid comment event payload",
            rejection.body_text(),
        )
    })?;

    let transition_id = Uuid::new_v4();
    let outcome = state
        .trigger
        .comment_transition(transition_id, CommentId::new(comment_id), event)
        .await;

    Ok((
        StatusCode::ACCEPTED,
        Json(OutcomeReport::new(transition_id, &outcome)),
    ))
}
