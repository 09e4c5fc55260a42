//! Rate limiting for the token refresh endpoint.
//!
//! Uses a token bucket algorithm with per-IP tracking so a stolen or guessed
//! refresh cookie can't be hammered against the server.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use governor::{Quota, RateLimiter, clock::DefaultClock, state::keyed::DefaultKeyedStateStore};
use std::{num::NonZeroU32, sync::Arc};

use crate::auth::{extract_client_ip, write_failure};

/// Default refresh requests allowed per minute per IP.
pub const DEFAULT_REFRESH_PER_MINUTE: u32 = 30;

/// Per-IP rate limiter.
pub type IpLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Rate limiting configuration for token endpoints.
#[derive(Clone)]
pub struct RateLimitConfig {
    /// Per-IP limiter for the refresh endpoint
    pub refresh: Arc<IpLimiter>,
    /// Read the client IP from `X-Forwarded-For` instead of the socket
    pub trust_forwarded_for: bool,
}

impl RateLimitConfig {
    /// A zero rate is treated as one request per minute.
    pub fn new(refresh_per_minute: u32, trust_forwarded_for: bool) -> Self {
        let per_minute = NonZeroU32::new(refresh_per_minute).unwrap_or(NonZeroU32::MIN);
        Self {
            refresh: Arc::new(RateLimiter::keyed(Quota::per_minute(per_minute))),
            trust_forwarded_for,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_PER_MINUTE, false)
    }
}

/// Middleware for rate limiting the refresh endpoint.
pub async fn rate_limit_refresh(
    State(config): State<Arc<RateLimitConfig>>,
    request: Request,
    next: Next,
) -> Response {
    let ip = match extract_client_ip(&request, config.trust_forwarded_for) {
        Ok(ip) => ip,
        Err(reason) => {
            tracing::warn!(reason, "Refusing refresh without client IP");
            return write_failure(
                "Unable to determine client IP.",
                "FORBIDDEN",
                StatusCode::FORBIDDEN,
            );
        }
    };

    match config.refresh.check_key(&ip) {
        Ok(_) => next.run(request).await,
        Err(_) => {
            tracing::debug!(%ip, "Refresh rate limit exceeded");
            write_failure(
                "Too many refresh attempts. Please wait before trying again.",
                "RATE_LIMITED",
                StatusCode::TOO_MANY_REQUESTS,
            )
        }
    }
}
