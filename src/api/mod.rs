mod error;
mod tokens;
mod users;

use axum::{Router, middleware};
use std::sync::Arc;

use crate::auth::{AuthState, authenticate};
use crate::db::Database;
use crate::jwt::TokenProvider;
use crate::rate_limit::RateLimitConfig;

pub use error::{ApiError, ResultExt};
pub use tokens::{RefreshCheck, TokensState};
pub use users::UsersState;

/// Create the API router.
///
/// Everything except token refresh and logout runs behind the authenticator.
pub fn create_api_router(
    db: Database,
    tokens: Arc<TokenProvider>,
    refresh_check: RefreshCheck,
    rate_limit_config: Arc<RateLimitConfig>,
) -> Router {
    let auth_state = AuthState {
        tokens: tokens.clone(),
        db: db.clone(),
    };

    let tokens_state = TokensState {
        db: db.clone(),
        tokens,
        refresh_check,
        rate_limit_config,
    };

    let users_state = UsersState { db };

    let protected = Router::new()
        .nest("/users", users::router(users_state))
        .merge(tokens::protected_router())
        .layer(middleware::from_fn_with_state(
            auth_state,
            authenticate::<AuthState>,
        ));

    Router::new()
        .nest("/tokens", tokens::public_router(tokens_state))
        .merge(protected)
}
