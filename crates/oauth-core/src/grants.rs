//! Grant orchestration for the authorize and token flows.
//!
//! The processor owns the client registry, both credential stores, and the
//! token issuer, and composes them into the two supported OAuth2 grants:
//! `authorization_code` and `refresh_token`. All state is request-scoped;
//! every failure branch is terminal with no partial effects.

use serde::{Deserialize, Serialize};

use crate::clients::ClientRegistry;
use crate::codes::AuthCodeStore;
use crate::error::OAuthError;
use crate::refresh::RefreshTokenStore;
use crate::tokens::AccessTokenIssuer;

/// Authorization endpoint parameters.
///
/// Every field is optional at the type level so that a missing parameter
/// surfaces as a structured `invalid_request` error instead of a
/// deserialization rejection in the HTTP layer.
#[derive(Debug, Deserialize)]
pub struct AuthorizeRequest {
    #[serde(default)]
    pub response_type: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub redirect_uri: Option<String>,
    /// Client state, passed through to the redirect untouched
    #[serde(default)]
    pub state: Option<String>,
}

/// Token endpoint parameters (form-encoded).
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    /// Grant type: "authorization_code" or "refresh_token"
    #[serde(default)]
    pub grant_type: Option<String>,

    /// Authorization code (for authorization_code grant)
    #[serde(default)]
    pub code: Option<String>,

    /// Redirect URI (for authorization_code grant, must match registration)
    #[serde(default)]
    pub redirect_uri: Option<String>,

    /// Client ID
    #[serde(default)]
    pub client_id: Option<String>,

    /// Refresh token (for refresh_token grant)
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Successful token response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub token_type: String,
    pub expires_in: u64,
}

/// Where the authorize flow sends the resource owner's user agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectTarget {
    pub location: String,
}

/// Composes the registry, stores, and issuer into the two grant flows.
pub struct GrantProcessor {
    registry: ClientRegistry,
    codes: AuthCodeStore,
    refresh_tokens: RefreshTokenStore,
    issuer: AccessTokenIssuer,
}

impl GrantProcessor {
    pub fn new(
        registry: ClientRegistry,
        codes: AuthCodeStore,
        refresh_tokens: RefreshTokenStore,
        issuer: AccessTokenIssuer,
    ) -> Self {
        Self {
            registry,
            codes,
            refresh_tokens,
            issuer,
        }
    }

    /// Authorize flow: validate the request shape and client, then issue a
    /// one-time code and build the redirect target.
    pub fn authorize(&self, request: &AuthorizeRequest) -> Result<RedirectTarget, OAuthError> {
        let (Some(response_type), Some(client_id), Some(redirect_uri)) = (
            request.response_type.as_deref(),
            request.client_id.as_deref(),
            request.redirect_uri.as_deref(),
        ) else {
            return Err(OAuthError::invalid_request("Missing required parameters"));
        };

        if response_type != "code" {
            return Err(OAuthError::unsupported_response_type(
                "Only 'code' response type is supported",
            ));
        }

        if !self.registry.contains(client_id, redirect_uri) {
            return Err(OAuthError::invalid_client(
                "Invalid client_id or redirect_uri",
            ));
        }

        let code = self.codes.issue(client_id);
        tracing::info!("Generated authorization code for client: {}", client_id);

        let mut location = format!("{}?code={}", redirect_uri, code);
        if let Some(state) = &request.state {
            location.push_str(&format!("&state={}", urlencoding::encode(state)));
        }

        Ok(RedirectTarget { location })
    }

    /// Token flow, dispatched on `grant_type`.
    pub async fn token(&self, request: &TokenRequest) -> Result<TokenResponse, OAuthError> {
        match request.grant_type.as_deref() {
            Some("authorization_code") => self.exchange_code(request).await,
            Some("refresh_token") => self.refresh(request).await,
            _ => Err(OAuthError::unsupported_grant_type("Invalid grant_type.")),
        }
    }

    /// Exchange a one-time authorization code for an access token plus a
    /// fresh refresh token.
    async fn exchange_code(&self, request: &TokenRequest) -> Result<TokenResponse, OAuthError> {
        let Some(code) = request.code.as_deref() else {
            return Err(OAuthError::invalid_request("code is required"));
        };
        let Some(client_id) = request.client_id.as_deref() else {
            return Err(OAuthError::invalid_request("client_id is required"));
        };
        let Some(redirect_uri) = request.redirect_uri.as_deref() else {
            return Err(OAuthError::invalid_request("redirect_uri is required"));
        };

        // Client validation comes first: a request that fails it must not
        // consume the code.
        if !self.registry.contains(client_id, redirect_uri) {
            return Err(OAuthError::invalid_client(
                "Invalid client_id or redirect_uri",
            ));
        }

        self.codes.redeem(code, client_id).map_err(|err| {
            tracing::warn!("Rejected authorization code for client {}: {}", client_id, err);
            OAuthError::invalid_grant("Invalid or expired authorization code.")
        })?;

        let access_token = self.mint(client_id).await?;
        let refresh_token = self.refresh_tokens.issue(client_id);
        tracing::info!("Issued new access token for client {}", client_id);

        Ok(TokenResponse {
            access_token,
            refresh_token: Some(refresh_token),
            token_type: "bearer".to_string(),
            expires_in: self.issuer.lifetime().num_seconds() as u64,
        })
    }

    /// Trade a still-valid refresh token for a new access token. The
    /// refresh token itself is left in place and stays usable until it
    /// expires.
    async fn refresh(&self, request: &TokenRequest) -> Result<TokenResponse, OAuthError> {
        let Some(refresh_token) = request.refresh_token.as_deref() else {
            return Err(OAuthError::invalid_request("refresh_token is required"));
        };
        let Some(client_id) = request.client_id.as_deref() else {
            return Err(OAuthError::invalid_request("client_id is required"));
        };

        self.refresh_tokens
            .validate(refresh_token, client_id)
            .map_err(|err| {
                tracing::warn!("Rejected refresh token for client {}: {}", client_id, err);
                OAuthError::invalid_grant("Invalid or expired refresh token.")
            })?;

        let access_token = self.mint(client_id).await?;
        tracing::info!("Refreshed access token for client {}", client_id);

        Ok(TokenResponse {
            access_token,
            refresh_token: None,
            token_type: "bearer".to_string(),
            expires_in: self.issuer.lifetime().num_seconds() as u64,
        })
    }

    async fn mint(&self, client_id: &str) -> Result<String, OAuthError> {
        self.issuer.mint(client_id).await.map_err(|err| {
            tracing::error!("Failed to sign access token for client {}: {}", client_id, err);
            OAuthError::server_error("Failed to generate token")
        })
    }
}

mod urlencoding {
    pub fn encode(s: &str) -> String {
        url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::clients::RegisteredClient;
    use crate::error::ErrorKind;

    const CLIENT_ID: &str = "upfirst";
    const REDIRECT_URI: &str = "http://localhost:8081/process";

    fn processor() -> GrantProcessor {
        processor_with_ttls(Duration::minutes(5), Duration::days(7))
    }

    fn processor_with_ttls(code_ttl: Duration, refresh_ttl: Duration) -> GrantProcessor {
        let registry = ClientRegistry::new(vec![RegisteredClient {
            client_id: CLIENT_ID.to_string(),
            redirect_uri: REDIRECT_URI.to_string(),
        }]);
        GrantProcessor::new(
            registry,
            AuthCodeStore::new(code_ttl),
            RefreshTokenStore::new(refresh_ttl),
            AccessTokenIssuer::new("test-signing-secret", Duration::hours(1)),
        )
    }

    fn authorize_request() -> AuthorizeRequest {
        AuthorizeRequest {
            response_type: Some("code".to_string()),
            client_id: Some(CLIENT_ID.to_string()),
            redirect_uri: Some(REDIRECT_URI.to_string()),
            state: None,
        }
    }

    /// Run the authorize flow and pull the issued code out of the redirect.
    fn issue_code(processor: &GrantProcessor) -> String {
        let target = processor.authorize(&authorize_request()).unwrap();
        let (_, code) = target.location.split_once("?code=").unwrap();
        code.to_string()
    }

    fn exchange_request(code: &str) -> TokenRequest {
        TokenRequest {
            grant_type: Some("authorization_code".to_string()),
            code: Some(code.to_string()),
            redirect_uri: Some(REDIRECT_URI.to_string()),
            client_id: Some(CLIENT_ID.to_string()),
            refresh_token: None,
        }
    }

    fn refresh_request(refresh_token: &str) -> TokenRequest {
        TokenRequest {
            grant_type: Some("refresh_token".to_string()),
            code: None,
            redirect_uri: None,
            client_id: Some(CLIENT_ID.to_string()),
            refresh_token: Some(refresh_token.to_string()),
        }
    }

    #[test]
    fn test_authorize_redirects_with_code() {
        let target = processor().authorize(&authorize_request()).unwrap();
        let (base, code) = target.location.split_once("?code=").unwrap();

        assert_eq!(base, REDIRECT_URI);
        assert_eq!(code.len(), 32);
        assert!(code.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_authorize_echoes_state() {
        let mut request = authorize_request();
        request.state = Some("abc123".to_string());

        let target = processor().authorize(&request).unwrap();
        assert!(target.location.ends_with("&state=abc123"));
    }

    #[test]
    fn test_authorize_rejects_missing_parameters() {
        let mut request = authorize_request();
        request.redirect_uri = None;

        let err = processor().authorize(&request).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidRequest);
    }

    #[test]
    fn test_authorize_rejects_non_code_response_type() {
        let mut request = authorize_request();
        request.response_type = Some("token".to_string());

        let err = processor().authorize(&request).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedResponseType);
    }

    #[test]
    fn test_authorize_rejects_unregistered_client() {
        let mut request = authorize_request();
        request.client_id = Some("intruder".to_string());

        let err = processor().authorize(&request).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidClient);
    }

    #[tokio::test]
    async fn test_code_exchange_returns_both_tokens() {
        let processor = processor();
        let code = issue_code(&processor);

        let response = processor.token(&exchange_request(&code)).await.unwrap();

        assert_eq!(response.access_token.split('.').count(), 3);
        let refresh_token = response.refresh_token.unwrap();
        assert_eq!(refresh_token.len(), 64);
        assert_eq!(response.token_type, "bearer");
        assert_eq!(response.expires_in, 3600);
    }

    #[tokio::test]
    async fn test_code_replay_is_rejected() {
        let processor = processor();
        let code = issue_code(&processor);

        processor.token(&exchange_request(&code)).await.unwrap();
        let err = processor.token(&exchange_request(&code)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidGrant);
    }

    #[tokio::test]
    async fn test_expired_code_is_rejected() {
        let processor = processor_with_ttls(Duration::seconds(-1), Duration::days(7));
        let code = issue_code(&processor);

        let err = processor.token(&exchange_request(&code)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidGrant);
    }

    #[tokio::test]
    async fn test_failed_client_check_does_not_consume_code() {
        let processor = processor();
        let code = issue_code(&processor);

        let mut bad = exchange_request(&code);
        bad.redirect_uri = Some("http://localhost:8081/elsewhere".to_string());
        let err = processor.token(&bad).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidClient);

        // The code survived the rejected request and still redeems
        assert!(processor.token(&exchange_request(&code)).await.is_ok());
    }

    #[tokio::test]
    async fn test_exchange_rejects_missing_code() {
        let mut request = exchange_request("ignored");
        request.code = None;

        let err = processor().token(&request).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidRequest);
    }

    #[tokio::test]
    async fn test_refresh_grant_reuses_token() {
        let processor = processor();
        let code = issue_code(&processor);
        let exchange = processor.token(&exchange_request(&code)).await.unwrap();
        let refresh_token = exchange.refresh_token.unwrap();

        let first = processor.token(&refresh_request(&refresh_token)).await.unwrap();
        assert_eq!(first.access_token.split('.').count(), 3);
        assert!(first.refresh_token.is_none());

        // Same refresh token keeps working; no rotation on use
        let second = processor.token(&refresh_request(&refresh_token)).await.unwrap();
        assert!(second.refresh_token.is_none());
    }

    #[tokio::test]
    async fn test_refresh_rejects_unknown_token() {
        let err = processor()
            .token(&refresh_request("not-a-real-token"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidGrant);
    }

    #[tokio::test]
    async fn test_refresh_rejects_missing_parameters() {
        let mut request = refresh_request("ignored");
        request.refresh_token = None;

        let err = processor().token(&request).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidRequest);
    }

    #[tokio::test]
    async fn test_unknown_grant_type_is_rejected() {
        let request = TokenRequest {
            grant_type: Some("password".to_string()),
            code: None,
            redirect_uri: None,
            client_id: Some(CLIENT_ID.to_string()),
            refresh_token: None,
        };

        let err = processor().token(&request).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedGrantType);
    }
}
