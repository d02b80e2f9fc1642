//! Request DTOs for the cubby API.

use serde::Deserialize;
use validator::Validate;

/// Sign-up request.
#[derive(Debug, Deserialize, Validate)]
pub struct SignUpRequest {
    /// Email address (optional; at least one contact method is required).
    #[serde(default)]
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    /// Phone number (optional).
    #[serde(default)]
    pub phone: Option<String>,
    /// Password.
    pub password: String,
}

impl SignUpRequest {
    /// The identity the account will be addressed by: email when present,
    /// phone otherwise.
    pub fn identity(&self) -> Option<&str> {
        self.email
            .as_deref()
            .filter(|e| !e.is_empty())
            .or_else(|| self.phone.as_deref().filter(|p| !p.is_empty()))
    }
}

/// Sign-in request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    /// Email or phone identifying the account.
    #[validate(length(min = 1, message = "must not be empty"))]
    pub email_or_phone: String,
    /// Password.
    #[validate(length(min = 1, message = "must not be empty"))]
    pub password: String,
}

/// Query parameters for fetching a single file.
#[derive(Debug, Deserialize)]
pub struct GetFileQuery {
    /// Non-zero requests the raw bytes instead of metadata.
    #[serde(default)]
    pub download: Option<i64>,
}

impl GetFileQuery {
    /// Whether the raw bytes were requested.
    pub fn wants_download(&self) -> bool {
        self.download.is_some_and(|d| d != 0)
    }
}

/// Query parameters for listing files.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilesQuery {
    /// Page number, starting at 1.
    #[serde(default)]
    pub page: Option<u32>,
    /// Page size; required, bounded by the configured maximum.
    #[serde(default)]
    pub list_size: Option<u32>,
}
