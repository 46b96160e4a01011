//! Webhook listener: the event-dispatch edge in front of the purge trigger.

mod error;
mod hooks;
mod middleware;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::purge::PurgeTrigger;

pub use error::{ApiError, ApiErrorBody};
pub use hooks::OutcomeReport;

#[derive(Clone)]
pub struct HookState {
    pub trigger: Arc<PurgeTrigger>,
    /// Shared secret required on `/hooks/*`; `None` leaves them open.
    pub webhook_token: Option<Arc<str>>,
}

impl HookState {
    pub fn new(trigger: Arc<PurgeTrigger>, webhook_token: Option<&str>) -> Self {
        Self {
            trigger,
            webhook_token: webhook_token.map(Arc::from),
        }
    }
}

pub fn build_router(state: HookState) -> Router {
    let hooks = Router::new()
        .route("/hooks/transitions", post(hooks::content_transition))
        .route("/hooks/comments/{comment_id}", post(hooks::comment_event))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::webhook_auth,
        ));

    Router::new()
        .route("/health", get(hooks::health))
        .merge(hooks)
        .layer(axum::middleware::from_fn(middleware::log_responses))
        .layer(axum::middleware::from_fn(middleware::set_request_context))
        .with_state(state)
}
