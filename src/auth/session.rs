//! Session issuance: the response a login or refresh handler sends back.

use axum::{
    Json,
    http::{
        HeaderValue, StatusCode,
        header::{AUTHORIZATION, SET_COOKIE},
    },
    response::{IntoResponse, Response},
};
use serde::Serialize;

use super::cookie::refresh_cookie;
use crate::db::User;
use crate::jwt::{AccessTokenResult, RefreshRegistry, RefreshTokenResult, TokenError, TokenProvider};

/// Freshly minted tokens for one user.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub access: AccessTokenResult,
    /// Present at login; absent when only the access token was renewed
    pub refresh: Option<RefreshTokenResult>,
}

#[derive(Serialize)]
struct SessionBody<'a> {
    access_token: &'a str,
    token_type: &'static str,
    expires_in: u64,
}

impl IntoResponse for IssuedSession {
    fn into_response(self) -> Response {
        let mut response = (
            StatusCode::OK,
            Json(SessionBody {
                access_token: &self.access.token,
                token_type: "Bearer",
                expires_in: self.access.duration,
            }),
        )
            .into_response();

        let headers = response.headers_mut();
        if let Ok(value) = HeaderValue::from_str(&self.access.token) {
            headers.insert(AUTHORIZATION, value);
        }
        if let Some(refresh) = &self.refresh {
            if let Ok(value) = HeaderValue::from_str(&refresh_cookie(&refresh.token, refresh.duration)) {
                headers.append(SET_COOKIE, value);
            }
        }

        response
    }
}

/// Issue an access token and a registered refresh token for a verified user.
///
/// Call after the user's credentials have been checked.
pub async fn issue_session<R>(
    tokens: &TokenProvider,
    registry: &R,
    user: &User,
) -> Result<IssuedSession, TokenError>
where
    R: RefreshRegistry + Sync,
{
    let access = tokens.create_access_token(&user.email, user.role, &user.display_name)?;
    let refresh = tokens
        .create_refresh_token(registry, &user.email, user.role, &user.display_name)
        .await?;

    tracing::info!(email = %user.email, "Session issued");

    Ok(IssuedSession {
        access,
        refresh: Some(refresh),
    })
}
