//! File handlers: upload, metadata/download, list, replace, delete.

use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::file::Upload;
use crate::web::dto::{FileMetadataResponse, FileUploadResponse, GetFileQuery, ListFilesQuery};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;
use crate::CubbyError;

/// Check that a path parameter has the shape of a system name.
fn validate_system_name(id: &str, expected_len: usize) -> Result<(), ApiError> {
    if id.len() != expected_len || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ApiError::bad_request("invalid_file_id"));
    }
    Ok(())
}

/// Read the single `userFile` part out of a multipart body and enforce the
/// MIME whitelist and size cap.
async fn read_upload(state: &AppState, mut multipart: Multipart) -> Result<Upload, ApiError> {
    let mut upload: Option<Upload> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::debug!("multipart read failed: {}", e);
        ApiError::bad_request("invalid_multipart_body")
    })? {
        if field.name() != Some("userFile") {
            continue;
        }

        let original_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError::bad_request("file_name_missing"))?;

        let mime = match field.content_type() {
            Some(mime) => mime.to_string(),
            None => mime_guess::from_path(&original_name)
                .first_or_octet_stream()
                .to_string(),
        };

        let content = field
            .bytes()
            .await
            .map_err(|e| {
                tracing::debug!("multipart read failed: {}", e);
                ApiError::bad_request("invalid_multipart_body")
            })?
            .to_vec();

        upload = Some(Upload {
            original_name,
            mime,
            content,
        });
    }

    let upload = upload.ok_or_else(|| ApiError::bad_request("file_missing"))?;

    if !state
        .limits
        .acceptable_mime_types
        .iter()
        .any(|m| m == &upload.mime)
    {
        return Err(ApiError::bad_request("mime_type_not_acceptable"));
    }

    if upload.content.len() as u64 > state.limits.max_upload_size_bytes {
        return Err(ApiError::bad_request("file_too_large"));
    }

    Ok(upload)
}

/// Map a storage-manager failure, logging internal causes under the given
/// operation name.
fn file_error(operation: &'static str, err: CubbyError) -> ApiError {
    match err {
        CubbyError::NotFound(_) => ApiError::not_found("file_not_found"),
        other => {
            tracing::error!("{}: {}", operation, other);
            ApiError::internal(operation)
        }
    }
}

/// POST /file - Store a new upload.
pub async fn create_file(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    multipart: Multipart,
) -> Result<Json<FileUploadResponse>, ApiError> {
    let upload = read_upload(&state, multipart).await?;

    let record = state
        .files
        .create(state.db.pool(), user_id, upload)
        .await
        .map_err(|e| file_error("create_file_failed", e))?;

    Ok(Json(FileUploadResponse {
        size_bytes: record.size_bytes,
        name: record.system_name,
    }))
}

/// GET /file/:fileId - Metadata by default, raw bytes with ?download=1.
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    AuthUser(_user_id): AuthUser,
    Path(file_id): Path<String>,
    Query(query): Query<GetFileQuery>,
) -> Result<Response, ApiError> {
    validate_system_name(&file_id, state.system_name_length)?;

    if query.wants_download() {
        let (record, content) = state
            .files
            .download(state.db.pool(), &file_id)
            .await
            .map_err(|e| file_error("get_file_failed", e))?;

        let response = Response::builder()
            .header(header::CONTENT_TYPE, record.mime)
            .header(header::CONTENT_LENGTH, content.len())
            .body(Body::from(content))
            .map_err(|e| {
                tracing::error!("get_file_failed: {}", e);
                ApiError::internal("get_file_failed")
            })?;

        return Ok(response);
    }

    let record = state
        .files
        .metadata(state.db.pool(), &file_id)
        .await
        .map_err(|e| file_error("get_file_failed", e))?;

    Ok(Json(FileMetadataResponse::from(record)).into_response())
}

/// GET /file?page=&listSize= - Paginated metadata list.
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    AuthUser(_user_id): AuthUser,
    Query(query): Query<ListFilesQuery>,
) -> Result<Json<Vec<FileMetadataResponse>>, ApiError> {
    let list_size = query
        .list_size
        .ok_or_else(|| ApiError::bad_request("invalid_list_size"))?;
    if list_size == 0 || list_size > state.limits.max_files_list {
        return Err(ApiError::bad_request("invalid_list_size"));
    }

    let page = query.page.unwrap_or(1);
    if page == 0 {
        return Err(ApiError::bad_request("invalid_page"));
    }

    let offset = (page as i64 - 1) * list_size as i64;

    let records = state
        .files
        .list(state.db.pool(), offset, list_size as i64)
        .await
        .map_err(|e| file_error("list_files_failed", e))?;

    Ok(Json(
        records.into_iter().map(FileMetadataResponse::from).collect(),
    ))
}

/// PUT /file/:fileId - Replace an existing file with a new upload.
pub async fn update_file(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(file_id): Path<String>,
    multipart: Multipart,
) -> Result<Json<FileUploadResponse>, ApiError> {
    validate_system_name(&file_id, state.system_name_length)?;

    let upload = read_upload(&state, multipart).await?;

    let record = state
        .files
        .replace(state.db.pool(), user_id, &file_id, upload)
        .await
        .map_err(|e| file_error("update_file_failed", e))?;

    Ok(Json(FileUploadResponse {
        size_bytes: record.size_bytes,
        name: record.system_name,
    }))
}

/// DELETE /file/:fileId - Remove a file and its metadata.
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    AuthUser(_user_id): AuthUser,
    Path(file_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    validate_system_name(&file_id, state.system_name_length)?;

    state
        .files
        .delete(state.db.pool(), &file_id)
        .await
        .map_err(|e| file_error("delete_file_failed", e))?;

    Ok(StatusCode::OK)
}
