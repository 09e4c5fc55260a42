//! Bearer-token authenticator.
//!
//! Runs once per request in front of the protected API routes. A request without a
//! bearer token passes through anonymously; a request with a bad token is
//! answered here and never reaches its handler.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use super::errors::{AuthError, AuthErrorKind};
use super::state::{HasAuthBackend, UserLookup};
use super::types::{AuthenticationPass, Identity};
use crate::jwt::{TokenType, extract_bearer_token, now_secs};

/// Decision reached for a single request.
#[derive(Debug)]
pub enum AuthOutcome {
    /// No bearer token: continue without an identity
    Anonymous,
    /// Token accepted and user resolved: continue with this identity
    Authenticated(Identity),
    /// Stop the pipeline with this failure
    Rejected(AuthError),
}

fn reject(kind: AuthErrorKind) -> AuthOutcome {
    debug!(reason = ?kind, "Access token rejected");
    AuthOutcome::Rejected(AuthError::from(kind))
}

/// Run the authentication state machine against the request headers.
pub async fn authenticate_request<S>(state: &S, headers: &HeaderMap) -> AuthOutcome
where
    S: HasAuthBackend + Sync,
{
    let Some(token) = extract_bearer_token(headers) else {
        return AuthOutcome::Anonymous;
    };

    // One signature check; expiry and type are read from the verified claims.
    let claims = match state.tokens().parse_claims(token) {
        Ok(claims) => claims,
        Err(e) => return reject(AuthErrorKind::from(&e)),
    };

    match now_secs() {
        Ok(now) if !claims.is_expired_at(now) => {}
        Ok(_) => return reject(AuthErrorKind::Expired),
        Err(e) => {
            error!(error = %e, "Failed to read system time");
            return reject(AuthErrorKind::Expired);
        }
    }

    if claims.token_type != TokenType::Access {
        return reject(AuthErrorKind::WrongType);
    }

    match state.users().load_user_by_email(&claims.email).await {
        Ok(user) => AuthOutcome::Authenticated(Identity::from(user)),
        Err(e) => {
            error!(email = %claims.email, error = %e, "Failed to resolve identity");
            AuthOutcome::Rejected(AuthError::from(AuthErrorKind::IdentityResolutionFailure))
        }
    }
}

/// Middleware attaching an [`Identity`] to authenticated requests.
///
/// Install with `axum::middleware::from_fn_with_state(state, authenticate::<S>)`.
pub async fn authenticate<S>(State(state): State<S>, mut request: Request, next: Next) -> Response
where
    S: HasAuthBackend + Clone + Send + Sync + 'static,
{
    if request.extensions().get::<AuthenticationPass>().is_some() {
        return next.run(request).await;
    }
    request.extensions_mut().insert(AuthenticationPass);

    match authenticate_request(&state, request.headers()).await {
        AuthOutcome::Anonymous => next.run(request).await,
        AuthOutcome::Authenticated(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        AuthOutcome::Rejected(err) => err.into_response(),
    }
}
