use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::counter;
use subtle::ConstantTimeEq;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::HookState;
use super::error::ApiError;

const TOKEN_HEADER: &str = "x-purgewire-token";
const METRIC_WEBHOOK_REJECTED_TOTAL: &str = "purgewire_webhook_rejected_total";

#[derive(Clone)]
pub struct RequestContext {
    pub request_id: String,
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let ctx = RequestContext {
        request_id: request_id.clone(),
    };
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(ctx);
    response
}

pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = start.elapsed().as_millis();

    if status.is_server_error() {
        error!(
            target = "purgewire::http::response",
            status = status.as_u16(),
            method = %method,
            path = %uri.path(),
            elapsed_ms = elapsed_ms,
            request_id = request_id,
            "request failed"
        );
    } else if status.is_client_error() {
        warn!(
            target = "purgewire::http::response",
            status = status.as_u16(),
            method = %method,
            path = %uri.path(),
            elapsed_ms = elapsed_ms,
            request_id = request_id,
            "request rejected"
        );
    } else {
        info!(
            target = "purgewire::http::response",
            status = status.as_u16(),
            method = %method,
            path = %uri.path(),
            elapsed_ms = elapsed_ms,
            request_id = request_id,
            "request handled"
        );
    }

    response
}

/// Require the shared webhook secret when one is configured.
///
/// Accepts `Authorization: Bearer <token>` or `x-purgewire-token: <token>`.
pub async fn webhook_auth(
    State(state): State<HookState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(expected) = state.webhook_token.as_deref() else {
        return next.run(request).await;
    };

    let authorized = extract_token(request.headers())
        .is_some_and(|token| bool::from(token.as_bytes().ct_eq(expected.as_bytes())));

    if !authorized {
        counter!(METRIC_WEBHOOK_REJECTED_TOTAL).increment(1);
        return ApiError::unauthorized().into_response();
    }

    next.run(request).await
}

fn extract_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| raw.strip_prefix("Bearer "));

    bearer.or_else(|| {
        headers
            .get(TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
    })
}
