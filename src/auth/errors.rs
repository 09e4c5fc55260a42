//! Authentication error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::jwt::TokenError;

/// Internal reason an access token was refused. Logged, never sent to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    Malformed,
    InvalidSignature,
    Expired,
    WrongType,
    IdentityResolutionFailure,
}

impl From<&TokenError> for AuthErrorKind {
    fn from(e: &TokenError) -> Self {
        match e {
            TokenError::InvalidSignature => Self::InvalidSignature,
            TokenError::Expired => Self::Expired,
            TokenError::WrongType { .. } => Self::WrongType,
            _ => Self::Malformed,
        }
    }
}

/// Client-facing authentication failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// Access token expired, forged or unreadable
    ExpiredAccessToken,
    /// Access token of the wrong type, or its user could not be resolved
    InvalidAccessToken,
    /// Endpoint requires an identity and none was attached
    NotAuthenticated,
    /// Identity lacks the required role
    InsufficientRole,
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ExpiredAccessToken => "EXPIRED_ACCESS_TOKEN",
            Self::InvalidAccessToken => "INVALID_ACCESS_TOKEN",
            Self::NotAuthenticated => "UNAUTHENTICATED",
            Self::InsufficientRole => "INSUFFICIENT_ROLE",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ExpiredAccessToken | Self::InvalidAccessToken | Self::NotAuthenticated => {
                StatusCode::UNAUTHORIZED
            }
            Self::InsufficientRole => StatusCode::FORBIDDEN,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::ExpiredAccessToken => "Access token is expired or invalid",
            Self::InvalidAccessToken => "Invalid access token",
            Self::NotAuthenticated => "Not authenticated",
            Self::InsufficientRole => "Insufficient permissions",
        }
    }
}

impl From<AuthErrorKind> for AuthError {
    fn from(kind: AuthErrorKind) -> Self {
        match kind {
            AuthErrorKind::Malformed | AuthErrorKind::InvalidSignature | AuthErrorKind::Expired => {
                Self::ExpiredAccessToken
            }
            AuthErrorKind::WrongType | AuthErrorKind::IdentityResolutionFailure => {
                Self::InvalidAccessToken
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        write_failure(self.message(), self.code(), self.status_code())
    }
}

#[derive(Serialize)]
struct ErrorResponse<'a> {
    error: &'a str,
    code: &'a str,
}

/// Structured failure body shared by every rejection in the API.
pub fn write_failure(message: &str, code: &str, status: StatusCode) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message,
            code,
        }),
    )
        .into_response()
}
