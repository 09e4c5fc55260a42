//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use crate::api::RefreshCheck;
use crate::db::{Database, UserRole};
use crate::jwt::{
    ACCESS_TOKEN_DURATION_SECS, MAX_TTL_SECS, MIN_SECRET_LENGTH, REFRESH_TOKEN_DURATION_SECS,
    TokenConfig, TokenProvider,
};
use crate::rate_limit::DEFAULT_REFRESH_PER_MINUTE;
use clap::Parser;
use tracing::{error, info};

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "tollgate",
    about = "Signed session tokens and bearer authentication"
)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "7291", env = "TOLLGATE_PORT")]
    pub port: u16,

    /// Path to SQLite database file
    #[arg(short, long, default_value = "tollgate.db", env = "TOLLGATE_DATABASE")]
    pub database: String,

    /// Path to file containing JWT secret. Prefer using JWT_SECRET env var instead
    #[arg(long)]
    pub jwt_secret_file: Option<String>,

    /// Access token lifetime in seconds
    #[arg(long, default_value_t = ACCESS_TOKEN_DURATION_SECS,
        value_parser = clap::value_parser!(u64).range(1..=MAX_TTL_SECS))]
    pub access_ttl: u64,

    /// Refresh token lifetime in seconds
    #[arg(long, default_value_t = REFRESH_TOKEN_DURATION_SECS,
        value_parser = clap::value_parser!(u64).range(1..=MAX_TTL_SECS))]
    pub refresh_ttl: u64,

    /// Only accept refresh tokens that are still present in the refresh registry
    #[arg(long)]
    pub require_refresh_registry: bool,

    /// Refresh requests allowed per minute per client IP
    #[arg(long, default_value_t = DEFAULT_REFRESH_PER_MINUTE)]
    pub refresh_rate_limit: u32,

    /// Take the client IP from X-Forwarded-For (only behind a trusted proxy)
    #[arg(long)]
    pub trust_forwarded_for: bool,

    /// Create an admin user with this email on startup (promotes an existing user)
    #[arg(long, value_name = "EMAIL")]
    pub create_admin: Option<String>,

    /// Print a fresh access/refresh token pair for this user and exit
    #[arg(long, value_name = "EMAIL")]
    pub issue_tokens: Option<String>,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Load JWT secret from environment variable or file.
/// Returns None and logs an error if the secret cannot be loaded.
pub fn load_jwt_secret(jwt_secret_file: Option<&str>) -> Option<String> {
    let secret = if let Ok(secret) = std::env::var("JWT_SECRET") {
        // Clear the environment variable to prevent leaking
        // SAFETY: We're single-threaded at this point during startup,
        // and no other code is reading this environment variable.
        unsafe { std::env::remove_var("JWT_SECRET") };
        secret
    } else if let Some(path) = jwt_secret_file {
        match std::fs::read_to_string(path) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read JWT secret file");
                return None;
            }
        }
    } else {
        error!(
            "JWT secret is required. Set JWT_SECRET environment variable (recommended) or use --jwt-secret-file"
        );
        return None;
    };

    if secret.len() < MIN_SECRET_LENGTH {
        error!(
            "JWT secret is shorter than {} characters. Use a longer secret",
            MIN_SECRET_LENGTH
        );
        return None;
    }

    Some(secret)
}

/// Display name for a new account: the local part of its email.
fn default_display_name(email: &str) -> &str {
    email.split('@').next().filter(|s| !s.is_empty()).unwrap_or(email)
}

/// Handle the --create-admin flag: create the admin, or promote an existing user.
pub async fn handle_create_admin(db: &Database, email: &str) {
    match db.users().get_by_email(email).await {
        Ok(Some(existing)) if existing.role == UserRole::Admin => {
            println!();
            println!("Admin already exists: {}", existing.email);
            println!();
        }
        Ok(Some(existing)) => match db.users().set_role(existing.id, UserRole::Admin).await {
            Ok(_) => {
                info!(email = %existing.email, "User promoted to admin");
                println!();
                println!("User promoted to admin: {}", existing.email);
                println!();
            }
            Err(e) => {
                error!(error = %e, "Failed to promote user");
                std::process::exit(1);
            }
        },
        Ok(None) => {
            let display_name = default_display_name(email);
            match db.users().create(email, display_name, UserRole::Admin).await {
                Ok(_) => {
                    info!(email = %email, "Admin user created");
                    println!();
                    println!("Admin user created: {} ({})", email, display_name);
                    println!();
                }
                Err(e) => {
                    error!(error = %e, "Failed to create admin user");
                    std::process::exit(1);
                }
            }
        }
        Err(e) => {
            error!(error = %e, "Failed to check for existing user");
            std::process::exit(1);
        }
    }
}

/// Handle the --issue-tokens flag: print a token pair for an existing user.
/// The refresh token is recorded in the registry like any other.
pub async fn handle_issue_tokens(db: &Database, tokens: &TokenProvider, email: &str) {
    let user = match db.users().get_by_email(email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            error!(email = %email, "No such user");
            std::process::exit(1);
        }
        Err(e) => {
            error!(error = %e, "Failed to look up user");
            std::process::exit(1);
        }
    };

    match crate::auth::issue_session(tokens, db, &user).await {
        Ok(session) => {
            println!();
            println!("Access token:  {}", session.access.token);
            if let Some(refresh) = session.refresh {
                println!("Refresh token: {}", refresh.token);
            }
            println!();
        }
        Err(e) => {
            error!(error = %e, "Failed to issue tokens");
            std::process::exit(1);
        }
    }
}

/// Build ServerConfig from validated arguments.
pub fn build_config(args: &Args, db: Database, jwt_secret: String) -> ServerConfig {
    let refresh_check = if args.require_refresh_registry {
        RefreshCheck::Registry
    } else {
        RefreshCheck::Signature
    };

    ServerConfig {
        db,
        jwt_secret: jwt_secret.into_bytes(),
        token_config: TokenConfig {
            access_ttl: args.access_ttl,
            refresh_ttl: args.refresh_ttl,
        },
        refresh_check,
        trust_forwarded_for: args.trust_forwarded_for,
        refresh_rate_per_minute: args.refresh_rate_limit,
    }
}

/// Open the database, logging errors if it fails.
pub async fn open_database(path: &str) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => {
            info!(path = %path, "Database opened");
            Some(db)
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}
