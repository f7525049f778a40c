//! Registered client lookup.
//!
//! A client is a `(client_id, redirect_uri)` pair checked by exact string
//! equality. The set is loaded from external configuration; there is no
//! wildcard or pattern matching.

use serde::{Deserialize, Serialize};

/// A registered OAuth client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredClient {
    pub client_id: String,
    pub redirect_uri: String,
}

/// Read-only registry of permitted `(client_id, redirect_uri)` pairs
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: Vec<RegisteredClient>,
}

impl ClientRegistry {
    pub fn new(clients: Vec<RegisteredClient>) -> Self {
        Self { clients }
    }

    /// Check whether the pair matches a registered client. No side effects;
    /// callers decide which error kind a `false` turns into.
    pub fn contains(&self, client_id: &str, redirect_uri: &str) -> bool {
        self.clients
            .iter()
            .any(|c| c.client_id == client_id && c.redirect_uri == redirect_uri)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
