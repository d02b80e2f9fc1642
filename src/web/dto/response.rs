//! Response DTOs for the cubby API.

use serde::Serialize;

use crate::db::FileRecord;

/// Access token response, returned by signup, signin, and token refresh.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    /// Access token (JWT).
    pub access_token: String,
}

/// Caller identity response for GET /info.
#[derive(Debug, Serialize)]
pub struct UserInfoResponse {
    /// Email-or-phone identifier of the caller.
    pub id: String,
}

/// Upload/replace result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileUploadResponse {
    /// Stored size in bytes.
    pub size_bytes: i64,
    /// Assigned system name.
    pub name: String,
}

/// Sanitized file metadata. The internal storage path is never exposed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadataResponse {
    /// Randomized system name.
    pub system_name: String,
    /// Original client-supplied name.
    pub original_name: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// MIME type.
    pub mime: String,
    /// File extension.
    pub extension: String,
    /// Owning user ID.
    pub user_id: i64,
}

impl From<FileRecord> for FileMetadataResponse {
    fn from(record: FileRecord) -> Self {
        Self {
            system_name: record.system_name,
            original_name: record.original_name,
            size_bytes: record.size_bytes,
            mime: record.mime,
            extension: record.extension,
            user_id: record.user_id,
        }
    }
}
