//! Refresh registry storage.
//!
//! Maps each issued refresh token to its owning email with a time-to-live.
//! Expired rows are invisible to lookups and purged by the cleanup task.
//! Access tokens are stateless and never stored.

use std::time::Duration;

use sqlx::sqlite::SqlitePool;

use super::Database;
use crate::jwt::{RefreshRegistry, RegistryError, now_secs};

/// A refresh registry record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshEntry {
    pub token: String,
    pub email: String,
    /// Expiry in Unix seconds
    pub expires_at: i64,
    pub created_at: String,
}

#[derive(sqlx::FromRow)]
struct RefreshEntryRow {
    token: String,
    email: String,
    expires_at: i64,
    created_at: String,
}

impl From<RefreshEntryRow> for RefreshEntry {
    fn from(row: RefreshEntryRow) -> Self {
        Self {
            token: row.token,
            email: row.email,
            expires_at: row.expires_at,
            created_at: row.created_at,
        }
    }
}

/// Store for the refresh registry.
pub struct RefreshTokenStore {
    pool: SqlitePool,
}

impl RefreshTokenStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or overwrite the entry for a token.
    pub async fn insert(&self, token: &str, email: &str, expires_at: i64) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO refresh_tokens (token, email, expires_at) VALUES (?, ?, ?)
             ON CONFLICT(token) DO UPDATE SET email = excluded.email, expires_at = excluded.expires_at",
        )
        .bind(token)
        .bind(email)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Get an entry regardless of expiry.
    pub async fn get(&self, token: &str) -> Result<Option<RefreshEntry>, sqlx::Error> {
        let row: Option<RefreshEntryRow> = sqlx::query_as(
            "SELECT token, email, expires_at, created_at FROM refresh_tokens WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(RefreshEntry::from))
    }

    /// Owning email of a token whose entry has not expired at `now`.
    pub async fn get_live_email(&self, token: &str, now: i64) -> Result<Option<String>, sqlx::Error> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT email FROM refresh_tokens WHERE token = ? AND expires_at > ?")
                .bind(token)
                .bind(now)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|r| r.0))
    }

    /// Delete an entry (revoke).
    pub async fn delete(&self, token: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete all entries that expired at or before `now`.
    pub async fn delete_expired(&self, now: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

impl From<sqlx::Error> for RegistryError {
    fn from(e: sqlx::Error) -> Self {
        RegistryError(e.to_string())
    }
}

/// Unix seconds as stored in `expires_at`, saturating at `i64::MAX`.
pub(crate) fn to_db_timestamp(secs: u64) -> i64 {
    i64::try_from(secs).unwrap_or(i64::MAX)
}

fn registry_now() -> Result<i64, RegistryError> {
    let now = now_secs().map_err(|e| RegistryError(e.to_string()))?;
    Ok(to_db_timestamp(now))
}

impl RefreshRegistry for Database {
    async fn store(&self, token: &str, email: &str, ttl: Duration) -> Result<(), RegistryError> {
        let ttl = to_db_timestamp(ttl.as_secs());
        let expires_at = registry_now()?.saturating_add(ttl);
        self.refresh_tokens().insert(token, email, expires_at).await?;
        Ok(())
    }

    async fn lookup(&self, token: &str) -> Result<Option<String>, RegistryError> {
        let now = registry_now()?;
        Ok(self.refresh_tokens().get_live_email(token, now).await?)
    }

    async fn remove(&self, token: &str) -> Result<bool, RegistryError> {
        Ok(self.refresh_tokens().delete(token).await?)
    }
}
