//! Router configuration for the cubby API.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::error::ApiError;
use super::handlers::{
    create_file, delete_file, get_file, info, list_files, log_out, sign_in, sign_up, token,
    update_file, AppState,
};
use super::middleware::{create_cors_layer, token_auth};

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let tokens = app_state.tokens.clone();

    // Leave headroom over the upload cap so oversize uploads reach the
    // handler's own size check instead of a bare 413
    let body_limit = (app_state.limits.max_upload_size_bytes as usize).saturating_mul(2);

    Router::new()
        .route("/signup", post(sign_up))
        .route("/signin", post(sign_in))
        .route("/token", post(token))
        .route("/logout", get(log_out))
        .route("/info", get(info))
        .route("/file", post(create_file).get(list_files))
        .route(
            "/file/:file_id",
            get(get_file).put(update_file).delete(delete_file),
        )
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(DefaultBodyLimit::max(body_limit))
                .layer(middleware::from_fn(move |req, next| {
                    let tokens = tokens.clone();
                    token_auth(tokens, req, next)
                })),
        )
        .with_state(app_state)
}

/// Fallback handler for unmatched routes.
async fn not_found() -> ApiError {
    ApiError::not_found("page_not_found")
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_health_router() {
        let _router = create_health_router();
    }
}
