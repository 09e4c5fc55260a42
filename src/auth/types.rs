//! Authentication user types.

use serde::Serialize;

use crate::db::{User, UserRole};

/// Identity resolved for the current request.
///
/// Lives in the request's extensions from the moment the authenticator
/// accepts the access token until the request ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub email: String,
    pub display_name: String,
    pub role: UserRole,
    pub authorities: Vec<String>,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a == authority)
    }
}

impl From<User> for Identity {
    fn from(user: User) -> Self {
        Self {
            authorities: user.role.authorities(),
            email: user.email,
            display_name: user.display_name,
            role: user.role,
        }
    }
}

/// Marks a request the authenticator has already processed.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticationPass;
