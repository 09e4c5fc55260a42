//! User endpoints.
//!
//! - GET `/me` - The identity attached to the current request
//! - GET `/` - All users (admin only)

use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use serde::Serialize;

use super::error::{ApiError, ResultExt};
use crate::auth::{AdminOnly, Auth};
use crate::db::{Database, User};

#[derive(Clone)]
pub struct UsersState {
    pub db: Database,
}

pub fn router(state: UsersState) -> Router {
    Router::new()
        .route("/", get(list_users))
        .route("/me", get(me))
        .with_state(state)
}

async fn me(Auth(identity): Auth) -> impl IntoResponse {
    Json(identity)
}

#[derive(Serialize)]
struct ListUsersResponse {
    users: Vec<User>,
}

async fn list_users(
    State(state): State<UsersState>,
    AdminOnly(admin): AdminOnly,
) -> Result<impl IntoResponse, ApiError> {
    let users = state.db.users().list().await.db_err("Failed to list users")?;
    tracing::debug!(admin = %admin.email, count = users.len(), "Listed users");

    Ok(Json(ListUsersResponse { users }))
}
