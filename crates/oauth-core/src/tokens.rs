//! Signed access token minting.
//!
//! Access tokens are self-contained HS256 JWTs; nothing is stored server
//! side and nothing here can invalidate one before its natural expiry. A
//! resource server holding the same secret can verify them with any
//! standard JWT library.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claim set asserted by a minted token. Registered claim names are used
/// so external verifiers need no custom mapping: `sub` carries the client
/// identity, `iat`/`exp` bound its validity window.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
#[error("failed to sign access token: {0}")]
pub struct MintError(#[from] jsonwebtoken::errors::Error);

/// Mints bearer tokens bound to a client identity and a lifetime.
///
/// The signing secret is supplied by the configuration layer; a missing
/// secret is a startup-fatal condition there, never defaulted here.
pub struct AccessTokenIssuer {
    key: EncodingKey,
    lifetime: Duration,
}

impl AccessTokenIssuer {
    pub fn new(secret: &str, lifetime: Duration) -> Self {
        Self {
            key: EncodingKey::from_secret(secret.as_bytes()),
            lifetime,
        }
    }

    /// How long minted tokens stay valid; mirrored as `expires_in` in
    /// token responses.
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Build and sign the claim set for `client_id`.
    ///
    /// Signing is the one CPU-bound step in the token flow, so it is
    /// exposed as an awaitable operation. A signing failure must reach the
    /// caller; it is the only 5xx-class condition in the core.
    pub async fn mint(&self, client_id: &str) -> Result<String, MintError> {
        let now = Utc::now();
        let claims = AccessTokenClaims {
            sub: client_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.key)?;
        Ok(token)
    }
}
