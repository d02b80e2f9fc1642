//! User model and repository for cubby.

use sqlx::SqlitePool;

use crate::{CubbyError, Result};

/// User entity representing a registered account.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: i64,
    /// Email address (optional; unique when present).
    pub email: Option<String>,
    /// Phone number (optional).
    pub phone: Option<String>,
    /// Password hash (Argon2). Never exposed to callers.
    pub password_hash: String,
    /// Account creation timestamp.
    pub created_at: String,
}

impl User {
    /// The caller-facing identity: email when present, phone otherwise.
    pub fn identity(&self) -> String {
        self.email
            .clone()
            .or_else(|| self.phone.clone())
            .unwrap_or_default()
    }
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Email address (optional).
    pub email: Option<String>,
    /// Phone number (optional).
    pub phone: Option<String>,
    /// Password hash (pre-hashed with Argon2).
    pub password_hash: String,
}

/// Repository for user operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user.
    ///
    /// Enforces the write-time invariant that at least one of email/phone
    /// is non-empty.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let has_email = new_user.email.as_deref().is_some_and(|e| !e.is_empty());
        let has_phone = new_user.phone.as_deref().is_some_and(|p| !p.is_empty());
        if !has_email && !has_phone {
            return Err(CubbyError::Validation(
                "email and phone cannot both be empty".to_string(),
            ));
        }

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (email, phone, password_hash) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(&new_user.email)
        .bind(&new_user.phone)
        .bind(&new_user.password_hash)
        .fetch_one(self.pool)
        .await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| CubbyError::NotFound("user".to_string()))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, phone, password_hash, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user whose email or phone matches the given identifier.
    pub async fn get_by_email_or_phone(&self, identifier: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, phone, password_hash, created_at
             FROM users WHERE email = ? OR phone = ?",
        )
        .bind(identifier)
        .bind(identifier)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }
}
