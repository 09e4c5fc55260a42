//! Token management API endpoints.
//!
//! - POST `/refresh` - Exchange the refresh cookie for a new access token
//! - POST `/logout` - Drop the refresh registry entry and clear the cookie
//! - GET `/verify` - Check that the current access token is still accepted

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::error::{ApiError, ResultExt};
use crate::auth::{Auth, IssuedSession, clear_refresh_cookie, get_refresh_token};
use crate::db::Database;
use crate::jwt::{RefreshRegistry, TokenError, TokenProvider};
use crate::rate_limit::{RateLimitConfig, rate_limit_refresh};

/// How a presented refresh token is judged valid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RefreshCheck {
    /// Signature, expiry and type only
    #[default]
    Signature,
    /// Additionally require a live refresh registry entry owned by the token's subject
    Registry,
}

#[derive(Clone)]
pub struct TokensState {
    pub db: Database,
    pub tokens: Arc<TokenProvider>,
    pub refresh_check: RefreshCheck,
    pub rate_limit_config: Arc<RateLimitConfig>,
}

/// Routes reachable without an access token.
///
/// Renewal has to work exactly when the access token has expired, so these
/// routes sit outside the authenticator.
pub fn public_router(state: TokensState) -> Router {
    let refresh_router = Router::new()
        .route("/refresh", post(refresh_token))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(
            state.rate_limit_config.clone(),
            rate_limit_refresh,
        ));

    let logout_router = Router::new()
        .route("/logout", post(logout))
        .with_state(state);

    Router::new().merge(refresh_router).merge(logout_router)
}

/// Routes behind the authenticator, mounted with their full `/tokens` prefix.
pub fn protected_router() -> Router {
    Router::new().route("/tokens/verify", get(verify_token))
}

#[derive(Serialize)]
struct VerifyResponse {
    valid: bool,
    email: String,
}

/// Verify that the current access token is still valid.
/// Returns 200 if valid, 401 if not.
async fn verify_token(Auth(identity): Auth) -> impl IntoResponse {
    Json(VerifyResponse {
        valid: true,
        email: identity.email,
    })
}

fn invalid_refresh() -> ApiError {
    ApiError::unauthorized("INVALID_REFRESH_TOKEN", "Invalid refresh token")
}

/// Issue a new access token for a valid refresh cookie.
///
/// The user record is reloaded so the new token carries the current role and
/// display name. The refresh token itself is not rotated.
async fn refresh_token(
    State(state): State<TokensState>,
    headers: HeaderMap,
) -> Result<IssuedSession, ApiError> {
    let token = get_refresh_token(&headers).ok_or_else(invalid_refresh)?;

    let claims = state.tokens.verify_refresh_token(&token).map_err(|e| {
        debug!(error = %e, "Refresh token rejected");
        match e {
            TokenError::Expired => {
                ApiError::unauthorized("EXPIRED_REFRESH_TOKEN", "Refresh token has expired")
            }
            _ => invalid_refresh(),
        }
    })?;

    if state.refresh_check == RefreshCheck::Registry {
        let owner = state
            .db
            .lookup(&token)
            .await
            .db_err("Failed to check refresh registry")?;
        if owner.as_deref() != Some(claims.email.as_str()) {
            debug!(email = %claims.email, "Refresh token not in registry");
            return Err(invalid_refresh());
        }
    }

    let user = state
        .db
        .users()
        .get_by_email(&claims.email)
        .await
        .db_err("Failed to get user")?
        .ok_or_else(|| {
            warn!(email = %claims.email, "Refresh token for unknown user");
            invalid_refresh()
        })?;

    let access = state
        .tokens
        .create_access_token(&user.email, user.role, &user.display_name)
        .map_err(|e| {
            error!("Failed to generate access token: {}", e);
            ApiError::internal("Failed to generate token")
        })?;

    Ok(IssuedSession {
        access,
        refresh: None,
    })
}

/// Logout - drop the refresh registry entry and clear the cookie.
async fn logout(State(state): State<TokensState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = get_refresh_token(&headers) {
        match state.db.remove(&token).await {
            Ok(removed) => debug!(removed, "Refresh token dropped on logout"),
            Err(e) => warn!("Failed to remove refresh token: {}", e),
        }
    }

    (
        StatusCode::OK,
        [(SET_COOKIE, clear_refresh_cookie())],
        Json(serde_json::json!({ "success": true })),
    )
}
