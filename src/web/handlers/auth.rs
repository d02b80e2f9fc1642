//! Account handlers: signup, signin, token refresh, logout, info.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use std::sync::Arc;

use crate::auth::TokenError;
use crate::db::{NewUser, UserRepository};
use crate::web::dto::{AccessTokenResponse, SignInRequest, SignUpRequest, UserInfoResponse, ValidatedJson};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// Build the refresh-token cookie.
fn refresh_cookie(name: &str, value: String) -> Cookie<'static> {
    Cookie::build((name.to_string(), value))
        .http_only(true)
        .secure(true)
        .path("/")
        .build()
}

/// Issue both tokens for a user and persist the refresh token.
async fn issue_token_pair(state: &AppState, user_id: i64) -> Result<(String, String), ApiError> {
    let access = state.tokens.issue_access(user_id).map_err(|e| {
        tracing::error!("token_creation_failed: {}", e);
        ApiError::internal("token_creation_failed")
    })?;

    let refresh = state
        .tokens
        .issue_refresh(state.db.pool(), user_id)
        .await
        .map_err(|e| {
            tracing::error!("token_creation_failed: {}", e);
            ApiError::internal("token_creation_failed")
        })?;

    Ok((access, refresh))
}

/// POST /signup - Create an account.
pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<SignUpRequest>,
) -> Result<(CookieJar, Json<AccessTokenResponse>), ApiError> {
    let identity = req
        .identity()
        .ok_or_else(|| ApiError::bad_request("contact_method_required"))?
        .to_string();

    crate::auth::validate_password(&req.password)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let repo = UserRepository::new(state.db.pool());

    let taken = repo.get_by_email_or_phone(&identity).await.map_err(|e| {
        tracing::error!("signup_failed: {}", e);
        ApiError::internal("signup_failed")
    })?;
    if taken.is_some() {
        return Err(ApiError::conflict("identity_not_available"));
    }

    let password_hash = crate::auth::hash_password(&req.password).map_err(|e| {
        tracing::error!("signup_failed: {}", e);
        ApiError::internal("signup_failed")
    })?;

    let user = repo
        .create(&NewUser {
            email: req.email.clone().filter(|e| !e.is_empty()),
            phone: req.phone.clone().filter(|p| !p.is_empty()),
            password_hash,
        })
        .await
        .map_err(|e| {
            tracing::error!("signup_failed: {}", e);
            ApiError::internal("signup_failed")
        })?;

    let (access, refresh) = issue_token_pair(&state, user.id).await?;

    let jar = jar.add(refresh_cookie(&state.refresh_cookie_name, refresh));
    Ok((jar, Json(AccessTokenResponse { access_token: access })))
}

/// POST /signin - Authenticate with an existing account.
pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<SignInRequest>,
) -> Result<(CookieJar, Json<AccessTokenResponse>), ApiError> {
    let user = UserRepository::new(state.db.pool())
        .get_by_email_or_phone(&req.email_or_phone)
        .await
        .map_err(|e| {
            tracing::error!("signin_failed: {}", e);
            ApiError::internal("signin_failed")
        })?
        .ok_or_else(|| ApiError::forbidden("wrong_password_or_user_not_found"))?;

    crate::auth::verify_password(&req.password, &user.password_hash)
        .map_err(|_| ApiError::forbidden("wrong_password_or_user_not_found"))?;

    let (access, refresh) = issue_token_pair(&state, user.id).await?;

    let jar = jar.add(refresh_cookie(&state.refresh_cookie_name, refresh));
    Ok((jar, Json(AccessTokenResponse { access_token: access })))
}

/// POST /token - Redeem the refresh cookie for a new access token.
pub async fn token(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Json<AccessTokenResponse>, ApiError> {
    let refresh = jar
        .get(&state.refresh_cookie_name)
        .map(|c| c.value().to_string())
        .ok_or_else(|| ApiError::unauthorized("refresh_token_empty"))?;

    let access = state
        .tokens
        .redeem(state.db.pool(), &refresh)
        .await
        .map_err(|e| match e {
            TokenError::NotFound => ApiError::unauthorized("refresh_token_not_found"),
            TokenError::Invalid => ApiError::forbidden("jwt_verification_failed"),
            other => {
                tracing::error!("get_new_access_token_failed: {}", other);
                ApiError::internal("get_new_access_token_failed")
            }
        })?;

    Ok(Json(AccessTokenResponse { access_token: access }))
}

/// GET /logout - Invalidate the stored refresh token and clear its cookie.
///
/// The removal cookie is attached even on the error path, mirroring the
/// clear-before-check order callers rely on.
pub async fn log_out(
    State(state): State<Arc<AppState>>,
    AuthUser(_user_id): AuthUser,
    jar: CookieJar,
) -> Response {
    let refresh = jar
        .get(&state.refresh_cookie_name)
        .map(|c| c.value().to_string());

    let jar = jar.remove(refresh_cookie(&state.refresh_cookie_name, String::new()));

    if let Some(refresh) = refresh {
        match state.tokens.invalidate(state.db.pool(), &refresh).await {
            Ok(true) => {}
            Ok(false) => {
                return (jar, ApiError::forbidden("refresh_token_not_found")).into_response();
            }
            Err(e) => {
                tracing::error!("logout_failed: {}", e);
                return (jar, ApiError::internal("logout_failed")).into_response();
            }
        }
    }

    (jar, StatusCode::OK).into_response()
}

/// GET /info - Return the caller's email-or-phone identifier.
pub async fn info(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserInfoResponse>, ApiError> {
    let user = UserRepository::new(state.db.pool())
        .get_by_id(user_id)
        .await
        .map_err(|e| {
            tracing::error!("get_user_info_failed: {}", e);
            ApiError::internal("get_user_info_failed")
        })?
        .ok_or_else(|| ApiError::not_found("user_not_found"))?;

    Ok(Json(UserInfoResponse {
        id: user.identity(),
    }))
}
