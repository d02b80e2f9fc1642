//! Bearer-token authentication guard.
//!
//! Extracts and verifies the access token before a protected handler runs.
//! A missing or garbled credential is 401; a present-but-rejected credential
//! is 403. Verification is stateless - no store access.

use axum::{
    async_trait,
    body::Body,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::auth::TokenService;
use crate::web::error::ApiError;

/// Extractor for authenticated requests.
///
/// Carries the user identifier resolved from a verified access token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("authorization_header_empty"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthorized("authorization_header_empty"))?;

        if token.is_empty() {
            return Err(ApiError::unauthorized("token_empty"));
        }

        // Token service is injected into extensions by the auth middleware
        let tokens = parts
            .extensions
            .get::<Arc<TokenService>>()
            .ok_or_else(|| ApiError::internal("token service not configured"))?;

        let user_id = tokens.verify_access(token).map_err(|e| {
            tracing::debug!("access token rejected: {}", e);
            ApiError::forbidden("jwt_verification_failed")
        })?;

        Ok(AuthUser(user_id))
    }
}

/// Middleware function injecting the token service into request extensions.
pub async fn token_auth(
    tokens: Arc<TokenService>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    request.extensions_mut().insert(tokens);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecurityConfig;
    use axum::http::Request as HttpRequest;

    fn service() -> Arc<TokenService> {
        Arc::new(TokenService::new(&SecurityConfig {
            access_token_secret: "guard-secret".to_string(),
            ..Default::default()
        }))
    }

    fn parts_with(auth: Option<&str>, tokens: Option<Arc<TokenService>>) -> Parts {
        let mut builder = HttpRequest::builder().uri("/info");
        if let Some(value) = auth {
            builder = builder.header(AUTHORIZATION, value);
        }
        let request = builder.body(()).unwrap();
        let (mut parts, _) = request.into_parts();
        if let Some(tokens) = tokens {
            parts.extensions.insert(tokens);
        }
        parts
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let mut parts = parts_with(None, Some(service()));
        let result = AuthUser::from_request_parts(&mut parts, &()).await;
        let err = result.unwrap_err();
        assert_eq!(err.code(), crate::web::error::ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn test_non_bearer_scheme_is_unauthorized() {
        let mut parts = parts_with(Some("Basic dXNlcjpwdw=="), Some(service()));
        let result = AuthUser::from_request_parts(&mut parts, &()).await;
        let err = result.unwrap_err();
        assert_eq!(err.code(), crate::web::error::ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn test_empty_token_is_unauthorized() {
        let mut parts = parts_with(Some("Bearer "), Some(service()));
        let result = AuthUser::from_request_parts(&mut parts, &()).await;
        let err = result.unwrap_err();
        assert_eq!(err.code(), crate::web::error::ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn test_bad_token_is_forbidden() {
        let mut parts = parts_with(Some("Bearer not.a.jwt"), Some(service()));
        let result = AuthUser::from_request_parts(&mut parts, &()).await;
        let err = result.unwrap_err();
        assert_eq!(err.code(), crate::web::error::ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn test_valid_token_resolves_user() {
        let tokens = service();
        let access = tokens.issue_access(42).unwrap();
        let mut parts = parts_with(Some(&format!("Bearer {}", access)), Some(tokens));

        let AuthUser(user_id) = AuthUser::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(user_id, 42);
    }
}
