//! OAuth2 error taxonomy shared by the authorize and token flows.

use serde::Serialize;
use thiserror::Error;

/// Wire-level error categories from RFC 6749, plus `server_error` for the
/// only internal failures this core can hit (randomness or signing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidRequest,
    UnsupportedResponseType,
    UnsupportedGrantType,
    InvalidClient,
    InvalidGrant,
    ServerError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::UnsupportedResponseType => "unsupported_response_type",
            ErrorKind::UnsupportedGrantType => "unsupported_grant_type",
            ErrorKind::InvalidClient => "invalid_client",
            ErrorKind::InvalidGrant => "invalid_grant",
            ErrorKind::ServerError => "server_error",
        }
    }

    /// Everything except `server_error` is the client's fault and
    /// non-retryable without correcting the request.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ErrorKind::ServerError)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured OAuth error, serialized as `{error, error_description}`.
#[derive(Debug, Clone, Error, Serialize)]
#[error("{kind}: {description}")]
pub struct OAuthError {
    #[serde(rename = "error")]
    pub kind: ErrorKind,
    #[serde(rename = "error_description")]
    pub description: String,
}

impl OAuthError {
    fn new(kind: ErrorKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
        }
    }

    pub fn invalid_request(description: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRequest, description)
    }

    pub fn unsupported_response_type(description: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedResponseType, description)
    }

    pub fn unsupported_grant_type(description: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedGrantType, description)
    }

    pub fn invalid_client(description: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidClient, description)
    }

    pub fn invalid_grant(description: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidGrant, description)
    }

    pub fn server_error(description: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServerError, description)
    }
}
