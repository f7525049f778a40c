//! OAuth2 credential service
//!
//! Provides:
//! - Authorization code flow (`GET /oauth/authorize`)
//! - Token exchange and refresh (`POST /oauth/token`)
//! - RFC 8414 OAuth metadata discovery
//! - Fixed-window rate limiting on the token endpoint

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use oauth_core::{
    AccessTokenIssuer, AuthCodeStore, ClientRegistry, GrantProcessor, RefreshTokenStore,
};
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use oauth_service::config::Config;
use oauth_service::rate_limit::RateLimiter;
use oauth_service::{AppState, http};

#[derive(Parser, Debug)]
#[command(name = "oauth-service")]
#[command(about = "OAuth2 authorization-code and refresh-token grant service")]
struct Cli {
    /// Port to listen on
    #[arg(long, default_value_t = 8080, env = "OAUTH_PORT")]
    port: u16,

    /// Address to bind to
    #[arg(long, default_value = "0.0.0.0", env = "OAUTH_BIND")]
    bind: String,

    /// Path to config directory
    #[arg(long, default_value = "/config", env = "OAUTH_CONFIG_PATH")]
    config_path: String,

    /// Public URL for this service (used in OAuth metadata)
    #[arg(long, env = "OAUTH_PUBLIC_URL")]
    public_url: Option<String>,

    /// Symmetric signing secret for access tokens (overrides the config file)
    #[arg(long, env = "OAUTH_SIGNING_SECRET")]
    signing_secret: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "oauth_service=info,oauth_core=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config_path)?;

    // A missing signing secret is fatal; tokens must never be signed with
    // a baked-in fallback value.
    let signing_secret = cli
        .signing_secret
        .clone()
        .or_else(|| config.signing_secret.clone())
        .filter(|secret| !secret.is_empty());
    let Some(signing_secret) = signing_secret else {
        anyhow::bail!(
            "no signing secret configured: set signing_secret in config.json \
             or pass --signing-secret / OAUTH_SIGNING_SECRET"
        );
    };

    let registry = ClientRegistry::new(config.clients.clone());
    if registry.is_empty() {
        tracing::warn!("No registered clients in config; every authorize request will be rejected");
    } else {
        tracing::info!("Loaded {} registered clients", registry.len());
    }

    let grants = GrantProcessor::new(
        registry,
        AuthCodeStore::new(chrono::Duration::seconds(
            config.tokens.auth_code_lifetime_secs as i64,
        )),
        RefreshTokenStore::new(chrono::Duration::seconds(
            config.tokens.refresh_token_lifetime_secs as i64,
        )),
        AccessTokenIssuer::new(
            &signing_secret,
            chrono::Duration::seconds(config.tokens.access_token_lifetime_secs as i64),
        ),
    );

    let limiter = RateLimiter::new(
        Duration::from_secs(config.rate_limit.window_secs),
        config.rate_limit.max_requests,
    );

    let public_url = cli
        .public_url
        .clone()
        .unwrap_or_else(|| format!("http://localhost:{}", cli.port));

    let state = Arc::new(AppState {
        grants,
        limiter,
        public_url: public_url.clone(),
    });

    let app = http::router(state);

    // Parse bind address
    let addr: SocketAddr = format!("{}:{}", cli.bind, cli.port).parse()?;

    tracing::info!("Starting oauth-service on {}", addr);
    tracing::info!("Public URL: {}", public_url);

    // Start server; connect info feeds the per-IP rate limiter
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("OAuth service shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
