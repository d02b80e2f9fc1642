//! Refresh token repository for cubby.
//!
//! A refresh token is valid exactly as long as its row exists; there is no
//! expiry column and no revocation marker.

use sqlx::SqlitePool;

use crate::Result;

/// Refresh token entity.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshToken {
    /// Token ID.
    pub id: i64,
    /// Owning user ID.
    pub user_id: i64,
    /// Token string (unique across all live tokens).
    pub token: String,
    /// Creation timestamp.
    pub created_at: String,
}

/// New refresh token for creation.
pub struct NewRefreshToken {
    /// Owning user ID.
    pub user_id: i64,
    /// Token string.
    pub token: String,
}

/// Repository for refresh token operations.
pub struct RefreshTokenRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> RefreshTokenRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new refresh token row.
    pub async fn create(&self, new_token: &NewRefreshToken) -> Result<RefreshToken> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO refresh_tokens (user_id, token) VALUES (?, ?) RETURNING id",
        )
        .bind(new_token.user_id)
        .bind(&new_token.token)
        .fetch_one(self.pool)
        .await?;

        let token = sqlx::query_as::<_, RefreshToken>(
            "SELECT id, user_id, token, created_at FROM refresh_tokens WHERE id = ?",
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?;

        Ok(token)
    }

    /// Get a refresh token row by exact token value.
    pub async fn get_by_token(&self, token: &str) -> Result<Option<RefreshToken>> {
        let result = sqlx::query_as::<_, RefreshToken>(
            "SELECT id, user_id, token, created_at FROM refresh_tokens WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        Ok(result)
    }

    /// Delete a refresh token by value.
    ///
    /// Returns true if a row was removed, letting the caller distinguish
    /// "already logged out" from "logged out now".
    pub async fn delete_by_token(&self, token: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE token = ?")
            .bind(token)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
