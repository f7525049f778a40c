//! OAuth2 Authorization Endpoint

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use oauth_core::AuthorizeRequest;

use crate::AppState;
use crate::http::error_response;

/// Handler for `GET /oauth/authorize`
///
/// Success is a 302 back to the client's redirect_uri carrying the fresh
/// authorization code (plus the echoed state); failures are structured
/// 400 bodies rather than redirects.
pub async fn handler(
    State(state): State<Arc<AppState>>,
    Query(request): Query<AuthorizeRequest>,
) -> Response {
    match state.grants.authorize(&request) {
        Ok(target) => (StatusCode::FOUND, [(header::LOCATION, target.location)]).into_response(),
        Err(err) => error_response(err),
    }
}
