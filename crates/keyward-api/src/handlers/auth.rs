//! Auth handlers: register, login, logout, validate.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use keyward_core::error::AppError;

use crate::dto::request::{LoginRequest, RegisterRequest, ValidateRequest};
use crate::dto::response::{LoginResponse, RegisterResponse, ValidateResponse};
use crate::error::ApiError;
use crate::extractors::{BearerToken, Ctx, ValidatedJson};
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ctx: Ctx,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let user_id = state
        .auth
        .register(&ctx, &req.email, &req.password, req.profile())
        .await?;

    Ok((StatusCode::CREATED, Json(RegisterResponse { user_id })))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ctx: Ctx,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let issued = state.auth.login(&ctx, &req.email, &req.password).await?;

    Ok(Json(LoginResponse {
        token: issued.token,
        user_id: issued.user_id,
        expires_at: issued.expires_at,
    }))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    ctx: Ctx,
    BearerToken(token): BearerToken,
) -> Result<StatusCode, ApiError> {
    state.auth.logout(&ctx, &token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/auth/validate
///
/// Signature and expiry only; a logged-out token still validates here.
pub async fn validate(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ValidateRequest>,
) -> Result<Json<ValidateResponse>, ApiError> {
    let user_id = state
        .auth
        .validate_token(&req.token)
        .ok_or_else(|| AppError::invalid_token("Token is invalid or expired"))?;

    Ok(Json(ValidateResponse { user_id }))
}
