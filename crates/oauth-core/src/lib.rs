//! oauth-core: Credential lifecycle core for the OAuth2 authorization-code grant.
//!
//! This crate provides the core functionality for:
//! - Issuing and redeeming single-use authorization codes
//! - Issuing and validating reusable refresh tokens
//! - Minting signed, self-contained access tokens
//! - Orchestrating the `authorization_code` and `refresh_token` grant flows
//!
//! HTTP routing, rate limiting, and configuration loading live in the
//! `oauth-service` crate; this crate has no knowledge of the transport.

pub mod clients;
pub mod codes;
pub mod error;
pub mod grants;
pub mod refresh;
mod secret;
pub mod tokens;

pub use clients::{ClientRegistry, RegisteredClient};
pub use codes::{AuthCodeStore, RedeemError};
pub use error::{ErrorKind, OAuthError};
pub use grants::{AuthorizeRequest, GrantProcessor, RedirectTarget, TokenRequest, TokenResponse};
pub use refresh::{RefreshTokenStore, ValidateError};
pub use tokens::{AccessTokenClaims, AccessTokenIssuer, MintError};
