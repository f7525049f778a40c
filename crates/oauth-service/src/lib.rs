//! oauth-service library: exposes the HTTP layer over oauth-core.
//!
//! This is a thin library layer over the service components, allowing
//! integration tests to build the router against their own state.

pub mod config;
pub mod http;
pub mod rate_limit;

use oauth_core::GrantProcessor;

use crate::rate_limit::RateLimiter;

/// Shared application state
pub struct AppState {
    pub grants: GrantProcessor,
    pub limiter: RateLimiter,
    pub public_url: String,
}
