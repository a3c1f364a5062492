//! Configuration loading and management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tollgate_auth::DEFAULT_PUBLIC_PATHS;
use tracing::{info, warn};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Users seeded into the in-memory store at start-up
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

/// Authentication configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC signing secret; at least 32 bytes
    #[serde(default)]
    pub jwt_secret: String,
    /// Token lifetime in milliseconds
    #[serde(default = "default_token_expiry_ms")]
    pub token_expiry_ms: i64,
    /// Upper bound on one identity lookup
    #[serde(default = "default_lookup_timeout_ms")]
    pub lookup_timeout_ms: u64,
    /// Paths served without an identity (exact, or prefix ending in `/**`)
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_expiry_ms", &self.token_expiry_ms)
            .field("lookup_timeout_ms", &self.lookup_timeout_ms)
            .field("public_paths", &self.public_paths)
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_expiry_ms: default_token_expiry_ms(),
            lookup_timeout_ms: default_lookup_timeout_ms(),
            public_paths: default_public_paths(),
        }
    }
}

impl AuthConfig {
    /// Token lifetime; tokens carry whole seconds, so a sub-second
    /// remainder is dropped
    pub fn token_expiry(&self) -> chrono::Duration {
        if self.token_expiry_ms % 1000 != 0 {
            warn!(
                "token_expiry_ms {} is not a whole number of seconds, truncating",
                self.token_expiry_ms
            );
        }
        chrono::Duration::milliseconds(self.token_expiry_ms)
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "pretty" or "json"
    #[serde(default)]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: "pretty".to_string(),
        }
    }
}

/// A user seeded from configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    pub username: String,
    /// Argon2 PHC string, e.g. from `tollgate --hash-password`
    pub password_hash: String,
    #[serde(default)]
    pub authorities: Vec<String>,
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

fn default_token_expiry_ms() -> i64 {
    86_400_000 // 24 hours
}

fn default_lookup_timeout_ms() -> u64 {
    2_000
}

fn default_public_paths() -> Vec<String> {
    DEFAULT_PUBLIC_PATHS.iter().map(|p| p.to_string()).collect()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &str) -> Result<Self> {
        let config_path = Path::new(path);

        // Check if config file exists
        if !config_path.exists() {
            info!("Config file not found at {}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        info!("Loaded configuration from {}", path);
        Ok(config)
    }
}
