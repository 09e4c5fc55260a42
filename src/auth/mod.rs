//! Bearer-token authentication.
//!
//! Dual-token system: short-lived access tokens (1 hour, stateless) sent in
//! the `Authorization` header, and long-lived refresh tokens (7 days)
//! delivered as a cookie and recorded in the refresh registry. The
//! authenticator middleware verifies the access token once per request and
//! attaches an [`Identity`] for the extractors downstream.

mod cookie;
mod errors;
mod extractors;
mod ip;
mod middleware;
mod session;
mod state;
mod types;

pub use cookie::{
    REFRESH_COOKIE_NAME, clear_refresh_cookie, decode_cookie_value, encode_cookie_value,
    get_cookie, get_refresh_token, refresh_cookie,
};
pub use errors::{AuthError, AuthErrorKind, write_failure};
pub use extractors::{AdminOnly, Auth, OptionalAuth};
pub use ip::{HasHeadersAndExtensions, extract_client_ip};
pub use middleware::{AuthOutcome, authenticate, authenticate_request};
pub use session::{IssuedSession, issue_session};
pub use state::{AuthState, HasAuthBackend, LookupError, UserLookup};
pub use types::{AuthenticationPass, Identity};
