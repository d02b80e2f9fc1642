//! Access and refresh token lifecycle for cubby.
//!
//! Access tokens are stateless signed JWTs with a short expiry; verification
//! never touches the store. Refresh tokens are signed JWTs without an expiry
//! whose validity is whatever the refresh_tokens table currently says,
//! checked on every redemption.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;

use crate::config::SecurityConfig;
use crate::db::{NewRefreshToken, RefreshTokenRepository};
use crate::CubbyError;

/// Token-related errors.
#[derive(Error, Debug)]
pub enum TokenError {
    /// Signature mismatch, expiry, or malformed input.
    #[error("token verification failed")]
    Invalid,

    /// No stored refresh token matches the presented value.
    #[error("refresh token not found")]
    NotFound,

    /// Token encoding failed.
    #[error("token creation failed: {0}")]
    Creation(String),

    /// Underlying store failure.
    #[error(transparent)]
    Store(#[from] CubbyError),
}

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessClaims {
    /// User identifier.
    pub user_id: i64,
    /// Issued-at timestamp.
    pub iat: u64,
    /// Expiration timestamp.
    pub exp: u64,
}

/// Claims carried by a refresh token. No expiry is encoded; validity is
/// tracked server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshClaims {
    /// User identifier.
    pub user_id: i64,
    /// Issued-at timestamp.
    pub iat: u64,
}

/// Issues and verifies access tokens; issues, redeems, and invalidates
/// refresh tokens via the store.
#[derive(Clone)]
pub struct TokenService {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    access_validation: Validation,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    refresh_validation: Validation,
    access_expiry_secs: u64,
}

impl TokenService {
    /// Create a token service from the security configuration.
    pub fn new(config: &SecurityConfig) -> Self {
        let access_validation = Validation::default();

        // Refresh tokens carry no exp claim
        let mut refresh_validation = Validation::default();
        refresh_validation.validate_exp = false;
        refresh_validation.required_spec_claims.clear();

        Self {
            access_encoding: EncodingKey::from_secret(config.access_token_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_token_secret.as_bytes()),
            access_validation,
            refresh_encoding: EncodingKey::from_secret(config.refresh_token_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_token_secret.as_bytes()),
            refresh_validation,
            access_expiry_secs: config.access_token_expiry_secs,
        }
    }

    /// Issue a short-lived access token for a user.
    pub fn issue_access(&self, user_id: i64) -> Result<String, TokenError> {
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = AccessClaims {
            user_id,
            iat: now,
            exp: now + self.access_expiry_secs,
        };

        encode(&Header::default(), &claims, &self.access_encoding)
            .map_err(|e| TokenError::Creation(e.to_string()))
    }

    /// Verify an access token, returning the encoded user identifier.
    ///
    /// Stateless: signature and expiry are checked without any store lookup,
    /// so access tokens cannot be revoked before they expire.
    pub fn verify_access(&self, token: &str) -> Result<i64, TokenError> {
        let data = decode::<AccessClaims>(token, &self.access_decoding, &self.access_validation)
            .map_err(|_| TokenError::Invalid)?;
        Ok(data.claims.user_id)
    }

    /// Issue a refresh token for a user and persist it.
    pub async fn issue_refresh(&self, pool: &SqlitePool, user_id: i64) -> Result<String, TokenError> {
        let claims = RefreshClaims {
            user_id,
            iat: chrono::Utc::now().timestamp() as u64,
        };

        let token = encode(&Header::default(), &claims, &self.refresh_encoding)
            .map_err(|e| TokenError::Creation(e.to_string()))?;

        RefreshTokenRepository::new(pool)
            .create(&NewRefreshToken {
                user_id,
                token: token.clone(),
            })
            .await?;

        Ok(token)
    }

    /// Redeem a refresh token for a fresh access token.
    ///
    /// The token must exist in the store (NotFound otherwise) and carry a
    /// valid signature (Invalid otherwise). The refresh token itself is not
    /// rotated; it stays valid until explicitly invalidated.
    pub async fn redeem(&self, pool: &SqlitePool, token: &str) -> Result<String, TokenError> {
        let stored = RefreshTokenRepository::new(pool)
            .get_by_token(token)
            .await?
            .ok_or(TokenError::NotFound)?;

        let data = decode::<RefreshClaims>(token, &self.refresh_decoding, &self.refresh_validation)
            .map_err(|_| TokenError::Invalid)?;

        debug_assert_eq!(stored.user_id, data.claims.user_id);

        self.issue_access(data.claims.user_id)
    }

    /// Invalidate a refresh token.
    ///
    /// Returns whether a stored token was found and removed.
    pub async fn invalidate(&self, pool: &SqlitePool, token: &str) -> Result<bool, TokenError> {
        Ok(RefreshTokenRepository::new(pool)
            .delete_by_token(token)
            .await?)
    }

    /// Access token lifetime in seconds.
    pub fn access_expiry_secs(&self) -> u64 {
        self.access_expiry_secs
    }
}
