use std::net::SocketAddr;

use clap::Parser;
use tollgate::cli::{
    Args, build_config, handle_create_admin, handle_issue_tokens, init_logging, load_jwt_secret,
    open_database,
};
use tollgate::jwt::TokenProvider;
use tollgate::{create_app, init_cleanup};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(&args.log_format);

    let Some(jwt_secret) = load_jwt_secret(args.jwt_secret_file.as_deref()) else {
        std::process::exit(1);
    };

    let Some(db) = open_database(&args.database).await else {
        std::process::exit(1);
    };

    if let Some(email) = args.create_admin.as_deref() {
        handle_create_admin(&db, email).await;
    }

    let config = build_config(&args, db, jwt_secret);

    if let Some(email) = args.issue_tokens.as_deref() {
        let tokens = TokenProvider::with_config(&config.jwt_secret, config.token_config)
            .unwrap_or_else(|e| {
                error!(error = %e, "Invalid token configuration");
                std::process::exit(1);
            });
        handle_issue_tokens(&config.db, &tokens, email).await;
        return;
    }

    let app = create_app(&config).unwrap_or_else(|e| {
        error!(error = %e, "Invalid token configuration");
        std::process::exit(1);
    });

    init_cleanup(&config.db).await;

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            error!(address = %addr, error = %e, "Failed to bind");
            std::process::exit(1);
        });

    match listener.local_addr() {
        Ok(local_addr) => info!(address = %local_addr, "Listening"),
        Err(e) => info!(address = %addr, error = %e, "Listening"),
    }

    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    if let Err(e) = axum::serve(listener, make_service).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
