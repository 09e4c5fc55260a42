//! Authentication state traits and macro.

use std::future::Future;
use std::sync::Arc;

use crate::db::{Database, User};
use crate::jwt::TokenProvider;

/// Failure to load the user behind a verified token.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("user not found")]
    NotFound,
    #[error("user lookup failed: {0}")]
    Backend(String),
}

/// Loads the full user record for a verified subject email.
pub trait UserLookup {
    fn load_user_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<User, LookupError>> + Send;
}

/// Trait for state types that provide the token codec and user lookup.
pub trait HasAuthBackend {
    type Users: UserLookup + Send + Sync;

    fn tokens(&self) -> &TokenProvider;
    fn users(&self) -> &Self::Users;
}

/// State handed to the authenticator middleware.
#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<TokenProvider>,
    pub db: Database,
}

/// Macro to implement `HasAuthBackend` for state structs with the standard fields.
///
/// The struct must have these fields:
/// - `tokens: Arc<TokenProvider>`
/// - `db: Database`
///
/// # Example
/// ```ignore
/// use crate::impl_has_auth_backend;
///
/// #[derive(Clone)]
/// pub struct MyState {
///     pub db: Database,
///     pub tokens: Arc<TokenProvider>,
///     // ... other fields
/// }
///
/// impl_has_auth_backend!(MyState);
/// ```
#[macro_export]
macro_rules! impl_has_auth_backend {
    ($state_type:ty) => {
        impl $crate::auth::HasAuthBackend for $state_type {
            type Users = $crate::db::Database;

            fn tokens(&self) -> &$crate::jwt::TokenProvider {
                &self.tokens
            }
            fn users(&self) -> &$crate::db::Database {
                &self.db
            }
        }
    };
}

crate::impl_has_auth_backend!(AuthState);
