//! Fixed-window rate limiting for the token endpoint.
//!
//! Requests are counted per caller IP in fixed windows; once a caller has
//! used up its budget, further requests are answered with 429 before any
//! grant logic runs.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::Json;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
struct RateLimitError {
    error: &'static str,
    error_description: &'static str,
}

#[derive(Debug)]
struct Window {
    started: Instant,
    count: u32,
}

/// Per-key fixed-window request counter.
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Count a request against `key`. Returns false once the key has used
    /// up its budget for the current window; a stale window restarts.
    pub fn allow(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock().unwrap();
        let window = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(window.started) >= self.window {
            window.started = now;
            window.count = 0;
        }

        window.count += 1;
        window.count <= self.max_requests
    }
}

/// Middleware in front of `POST /oauth/token`.
///
/// Keyed by the caller's IP when connect info is available; requests
/// without it (e.g. in-process test calls) share a single bucket.
pub async fn limit_token_requests(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let key = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    if !state.limiter.allow(&key) {
        tracing::warn!("Rate limit exceeded for caller {}", key);
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(RateLimitError {
                error: "too_many_requests",
                error_description: "Too many requests. Please try again later.",
            }),
        )
            .into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sixth_request_in_window_is_denied() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 5);
        for _ in 0..5 {
            assert!(limiter.allow("203.0.113.7"));
        }
        assert!(!limiter.allow("203.0.113.7"));
    }

    #[test]
    fn test_keys_are_counted_independently() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 1);
        assert!(limiter.allow("203.0.113.7"));
        assert!(!limiter.allow("203.0.113.7"));
        assert!(limiter.allow("203.0.113.8"));
    }

    #[test]
    fn test_budget_resets_after_window_elapses() {
        let limiter = RateLimiter::new(Duration::from_millis(10), 1);
        assert!(limiter.allow("203.0.113.7"));
        assert!(!limiter.allow("203.0.113.7"));

        std::thread::sleep(Duration::from_millis(20));
        assert!(limiter.allow("203.0.113.7"));
    }
}
