pub mod api;
pub mod auth;
pub mod cleanup;
pub mod cli;
pub mod db;
pub mod jwt;
pub mod rate_limit;

use api::{RefreshCheck, create_api_router};
use axum::Router;
use db::Database;
use jwt::{TokenConfig, TokenError, TokenProvider};
use rate_limit::RateLimitConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct ServerConfig {
    /// Database connection (cloneable, uses connection pool internally)
    pub db: Database,
    /// JWT secret for signing tokens
    pub jwt_secret: Vec<u8>,
    /// Access and refresh token lifetimes
    pub token_config: TokenConfig,
    /// Whether refresh requires a live registry entry
    pub refresh_check: RefreshCheck,
    /// Read client IPs from X-Forwarded-For (requires running behind a proxy)
    pub trust_forwarded_for: bool,
    /// Refresh requests allowed per minute per client IP
    pub refresh_rate_per_minute: u32,
}

/// Create the application router with the given configuration.
///
/// Fails when the secret is too short or a token lifetime is zero.
pub fn create_app(config: &ServerConfig) -> Result<Router, TokenError> {
    let tokens = Arc::new(TokenProvider::with_config(
        &config.jwt_secret,
        config.token_config,
    )?);

    let rate_limit_config = Arc::new(RateLimitConfig::new(
        config.refresh_rate_per_minute,
        config.trust_forwarded_for,
    ));

    let api_router = create_api_router(
        config.db.clone(),
        tokens,
        config.refresh_check,
        rate_limit_config,
    );

    Ok(Router::new().nest("/api", api_router))
}

/// Run cleanup tasks and spawn background scheduler.
/// Call this before starting the server.
pub async fn init_cleanup(db: &Database) {
    cleanup::run_cleanup(db).await;
    cleanup::spawn_cleanup_scheduler(db.clone());
}

/// Run the server on the given listener. This function blocks until the server exits.
/// Call `init_cleanup` before this to run cleanup on startup.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config).map_err(std::io::Error::other)?;
    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, make_service).await
}

/// Start the server on the given port in a background task. Use port 0 to let the OS choose a random port.
/// Returns the actual address the server is listening on.
/// Note: For production use, prefer `run_server` directly in main.
pub async fn start_server(
    config: ServerConfig,
    port: u16,
) -> Result<(tokio::task::JoinHandle<()>, SocketAddr), std::io::Error> {
    // Run cleanup tasks on startup
    init_cleanup(&config.db).await;

    let addr = format!("127.0.0.1:{}", port);
    let listener = TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = run_server(config, listener).await {
            tracing::error!(error = %e, "Server error");
        }
    });

    Ok((handle, local_addr))
}
