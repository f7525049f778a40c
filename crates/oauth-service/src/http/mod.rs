//! HTTP layer: router and endpoint handlers.

pub mod authorize;
pub mod metadata;
pub mod token;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use oauth_core::OAuthError;
use tower_http::trace::TraceLayer;

use crate::AppState;
use crate::rate_limit;

/// Build the service router over shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        // OAuth metadata (RFC 8414)
        .route(
            "/.well-known/oauth-authorization-server",
            get(metadata::handler),
        )
        // Authorization endpoint
        .route("/oauth/authorize", get(authorize::handler))
        // Token endpoint, rate limited before any grant logic runs
        .route(
            "/oauth/token",
            post(token::handler).layer(middleware::from_fn_with_state(
                state.clone(),
                rate_limit::limit_token_requests,
            )),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness check
async fn root() -> &'static str {
    "OAuth Server is Running!"
}

/// Render a core error as a structured body with the right status class.
pub(crate) fn error_response(err: OAuthError) -> Response {
    let status = if err.kind.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(err)).into_response()
}
