use std::sync::Arc;

use axum::{
    extract::{Extension, Json, State},
    http::{HeaderMap, StatusCode},
};
use serde_json::json;
use tracing::debug;

use shared_config::AppConfig;
use shared_models::auth::{TokenResponse, User, UserSummary};
use shared_models::error::AppError;
use shared_utils::extract::ApiJson;
use shared_utils::extractor::extract_bearer_token;
use shared_utils::jwt;

use crate::models::{AuthError, AuthResponse, LoginRequest, RegisterRequest};
use crate::services::AccountService;

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmailTaken(_) => AppError::Conflict(err.to_string()),
            AuthError::InvalidCredentials => AppError::Auth(err.to_string()),
            AuthError::Validation(msg) => AppError::ValidationError(msg),
            AuthError::Token(msg) => AppError::Internal(msg),
            AuthError::Database(msg) => AppError::Database(msg),
        }
    }
}

#[axum::debug_handler]
pub async fn register(
    State(config): State<Arc<AppConfig>>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let service = AccountService::new(&config);
    let session = service.register(request).await?;

    Ok((StatusCode::CREATED, Json(session)))
}

#[axum::debug_handler]
pub async fn login(
    State(config): State<Arc<AppConfig>>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let service = AccountService::new(&config);
    let session = service.login(request).await?;

    Ok(Json(session))
}

pub async fn validate_token(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, AppError> {
    debug!("Validating token");

    let token = extract_bearer_token(&headers)?;
    let claims = jwt::validate_token(token, &config.jwt_secret)
        .map_err(AppError::Auth)?;

    Ok(Json(TokenResponse {
        valid: true,
        user_id: claims.sub,
        email: claims.email,
        role: claims.role,
    }))
}

pub async fn verify_token(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Json<serde_json::Value> {
    debug!("Verifying token");

    let valid = extract_bearer_token(&headers)
        .ok()
        .map(|token| jwt::validate_token(token, &config.jwt_secret).is_ok())
        .unwrap_or(false);

    Json(json!({ "valid": valid }))
}

pub async fn get_current_user(Extension(user): Extension<User>) -> Json<User> {
    Json(user)
}

pub async fn list_doctors(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<UserSummary>>, AppError> {
    debug!("Listing doctors for {}", user.id);

    let service = AccountService::new(&config);
    let doctors = service.list_doctors().await?;

    Ok(Json(doctors))
}
