//! Configuration loading and management

use std::path::Path;

use anyhow::{Context, Result};
use oauth_core::RegisteredClient;
use serde::{Deserialize, Serialize};

/// Main configuration for the OAuth service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Registered OAuth clients, matched by exact (client_id, redirect_uri) pair
    #[serde(default)]
    pub clients: Vec<RegisteredClient>,

    /// Symmetric secret used to sign access tokens.
    /// May instead be supplied via --signing-secret / OAUTH_SIGNING_SECRET;
    /// startup fails if neither source provides one.
    #[serde(default)]
    pub signing_secret: Option<String>,

    /// Credential lifetimes
    #[serde(default)]
    pub tokens: TokenConfig,

    /// Token endpoint rate limiting
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Access token lifetime in seconds (default: 1 hour)
    #[serde(default = "default_access_token_lifetime")]
    pub access_token_lifetime_secs: u64,

    /// Refresh token lifetime in seconds (default: 7 days)
    #[serde(default = "default_refresh_token_lifetime")]
    pub refresh_token_lifetime_secs: u64,

    /// Authorization code lifetime in seconds (default: 5 minutes)
    #[serde(default = "default_auth_code_lifetime")]
    pub auth_code_lifetime_secs: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_token_lifetime_secs: default_access_token_lifetime(),
            refresh_token_lifetime_secs: default_refresh_token_lifetime(),
            auth_code_lifetime_secs: default_auth_code_lifetime(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Window length in seconds (default: 60)
    #[serde(default = "default_rate_limit_window")]
    pub window_secs: u64,

    /// Requests allowed per caller per window (default: 5)
    #[serde(default = "default_rate_limit_max")]
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: default_rate_limit_window(),
            max_requests: default_rate_limit_max(),
        }
    }
}

fn default_access_token_lifetime() -> u64 {
    3600 // 1 hour
}

fn default_refresh_token_lifetime() -> u64 {
    7 * 24 * 3600 // 7 days
}

fn default_auth_code_lifetime() -> u64 {
    300 // 5 minutes
}

fn default_rate_limit_window() -> u64 {
    60
}

fn default_rate_limit_max() -> u32 {
    5
}

impl Config {
    /// Load configuration from the config directory
    pub fn load(config_path: &str) -> Result<Self> {
        let config_file = Path::new(config_path).join("config.json");

        if config_file.exists() {
            let content = std::fs::read_to_string(&config_file)
                .with_context(|| format!("Failed to read config file: {:?}", config_file))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| "Failed to parse config.json")?;
            tracing::info!("Loaded configuration from {:?}", config_file);
            Ok(config)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_file);
            let config = Config::default();

            // Create config directory if it doesn't exist
            std::fs::create_dir_all(config_path)
                .with_context(|| format!("Failed to create config directory: {}", config_path))?;

            // Write default config for reference
            let content = serde_json::to_string_pretty(&config)?;
            std::fs::write(&config_file, content)
                .with_context(|| format!("Failed to write default config: {:?}", config_file))?;
            tracing::info!("Created default config at {:?}", config_file);

            Ok(config)
        }
    }
}
