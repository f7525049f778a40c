//! OAuth2 Token Endpoint
//!
//! Handles:
//! - Authorization code exchange
//! - Refresh token grants

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use oauth_core::TokenRequest;

use crate::AppState;
use crate::http::error_response;

/// Handler for `POST /oauth/token`
pub async fn handler(
    State(state): State<Arc<AppState>>,
    Form(request): Form<TokenRequest>,
) -> Response {
    match state.grants.token(&request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => error_response(err),
    }
}
