//! Tollgate - bearer-token authentication service

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::{Config, LoggingConfig, UserConfig};
use tollgate_api::{AppState, create_router};
use tollgate_auth::{AccessPolicy, Argon2Verifier, TokenCodec};
use tollgate_store::{NewUser, UserStore};

/// Tollgate - issues and validates signed bearer tokens
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "TOLLGATE_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "TOLLGATE_PORT")]
    port: Option<u16>,

    /// JWT signing secret, overrides the config file
    #[arg(long, env = "TOLLGATE_JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,

    /// Print an Argon2 hash of the given password and exit
    #[arg(long, value_name = "PASSWORD")]
    hash_password: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    if let Some(password) = args.hash_password.as_deref() {
        println!("{}", tollgate_auth::hash_password(password)?);
        return Ok(());
    }

    // Load configuration
    let mut config = Config::load(&args.config)?;
    if let Some(secret) = args.jwt_secret {
        config.auth.jwt_secret = secret;
    }

    // Initialize logging
    init_logging(&config.logging);

    info!("Starting Tollgate v{}", env!("CARGO_PKG_VERSION"));

    // Signing key; the process refuses to start without a usable one
    let codec = Arc::new(
        TokenCodec::new(config.auth.jwt_secret.as_bytes(), config.auth.token_expiry())
            .context("Invalid token signing configuration")?,
    );
    info!("Token lifetime: {}s", codec.expiry().num_seconds());

    // Seed the user store
    let users = UserStore::new();
    seed_users(&users, &config.users)?;
    if !users.has_users() {
        warn!("No users configured; every login will be rejected");
    }

    // Initialize metrics
    let metrics_handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    // Create application state
    let state = AppState::new(
        users,
        codec,
        Arc::new(Argon2Verifier),
        AccessPolicy::new(config.auth.public_paths.clone()),
        config.auth.lookup_timeout(),
    );

    // Create router
    let app = create_router(state, Some(Arc::new(metrics_handle)))
        .layer(TraceLayer::new_for_http());

    // Determine bind address
    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port).parse()?;

    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Insert configured users, rejecting malformed password hashes up front
fn seed_users(store: &UserStore, users: &[UserConfig]) -> Result<()> {
    for user in users {
        tollgate_auth::validate_hash(&user.password_hash)
            .with_context(|| format!("Invalid password hash for user '{}'", user.username))?;

        store
            .insert_user(NewUser {
                username: user.username.clone(),
                password_hash: user.password_hash.clone(),
                authorities: user.authorities.clone(),
            })
            .with_context(|| format!("Failed to load user '{}'", user.username))?;
    }

    info!("Loaded {} user(s)", users.len());
    Ok(())
}

/// Initialize logging
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
