//! In-memory store for long-lived refresh tokens.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::secret;

/// Number of random bytes behind each token (rendered as 64 hex chars).
const TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidateError {
    #[error("refresh token not found")]
    NotFound,
    #[error("refresh token was issued to a different client")]
    ClientMismatch,
    #[error("refresh token expired")]
    Expired,
}

#[derive(Debug, Clone)]
struct IssuedToken {
    client_id: String,
    expires_at: DateTime<Utc>,
}

/// Store of active refresh tokens, keyed by the token value.
///
/// Unlike authorization codes, a refresh token survives validation: the
/// same value keeps working until it naturally expires. Rotation-on-use
/// would change the threat model and is deliberately not done here.
pub struct RefreshTokenStore {
    ttl: Duration,
    tokens: RwLock<HashMap<String, IssuedToken>>,
}

impl RefreshTokenStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            tokens: RwLock::new(HashMap::new()),
        }
    }

    /// Generate a fresh token for `client_id` and record it with the
    /// configured TTL.
    pub fn issue(&self, client_id: &str) -> String {
        let token = secret::generate_hex(TOKEN_BYTES);
        let issued = IssuedToken {
            client_id: client_id.to_string(),
            expires_at: Utc::now() + self.ttl,
        };

        let mut tokens = self.tokens.write().unwrap();
        tokens.insert(token.clone(), issued);
        token
    }

    /// Check a token without consuming it. Expired entries are evicted on
    /// lookup; everything else leaves the map untouched.
    pub fn validate(&self, token: &str, client_id: &str) -> Result<(), ValidateError> {
        let mut tokens = self.tokens.write().unwrap();
        let issued = tokens.get(token).ok_or(ValidateError::NotFound)?;

        if issued.client_id != client_id {
            return Err(ValidateError::ClientMismatch);
        }
        if issued.expires_at <= Utc::now() {
            tokens.remove(token);
            return Err(ValidateError::Expired);
        }
        Ok(())
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.tokens.read().unwrap().len()
    }
}
