//! In-memory store for single-use authorization codes.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::secret;

/// Number of random bytes behind each code (rendered as 32 hex chars).
const CODE_BYTES: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RedeemError {
    #[error("authorization code not found")]
    NotFound,
    #[error("authorization code was issued to a different client")]
    ClientMismatch,
    #[error("authorization code expired")]
    Expired,
}

#[derive(Debug, Clone)]
struct IssuedCode {
    client_id: String,
    expires_at: DateTime<Utc>,
}

/// Store of pending authorization codes, keyed by the code value.
///
/// Codes are single-use: `redeem` removes the entry no matter how the
/// check turns out, so a value can succeed at most once, ever. Expired
/// entries are evicted lazily, when next looked up.
pub struct AuthCodeStore {
    ttl: Duration,
    codes: RwLock<HashMap<String, IssuedCode>>,
}

impl AuthCodeStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            codes: RwLock::new(HashMap::new()),
        }
    }

    /// Generate a fresh code for `client_id` and record it with the
    /// configured TTL. Insert-only; never replaces a live key in practice
    /// given the entropy budget.
    pub fn issue(&self, client_id: &str) -> String {
        let code = secret::generate_hex(CODE_BYTES);
        let issued = IssuedCode {
            client_id: client_id.to_string(),
            expires_at: Utc::now() + self.ttl,
        };

        let mut codes = self.codes.write().unwrap();
        codes.insert(code.clone(), issued);
        code
    }

    /// Atomically check and consume a code.
    ///
    /// The entry is removed before any check, inside a single write-lock
    /// critical section: two concurrent redemptions of the same code yield
    /// exactly one success. A mismatched client also burns the code, which
    /// keeps a stolen value from being probed against other clients.
    pub fn redeem(&self, code: &str, client_id: &str) -> Result<(), RedeemError> {
        let mut codes = self.codes.write().unwrap();
        let issued = codes.remove(code).ok_or(RedeemError::NotFound)?;

        if issued.client_id != client_id {
            return Err(RedeemError::ClientMismatch);
        }
        if issued.expires_at <= Utc::now() {
            return Err(RedeemError::Expired);
        }
        Ok(())
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.codes.read().unwrap().len()
    }
}
