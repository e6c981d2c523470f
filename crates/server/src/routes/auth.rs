//! Auth route handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::Response;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use lotkeeper_core::{Email, UserId, UserRole};

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::middleware::auth::{clear_session, set_current_user};
use crate::models::CurrentUser;
use crate::response;
use crate::services::auth::AuthService;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub tax_id: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub user_id: UserId,
    pub email: Email,
    pub role: UserRole,
    pub full_name: String,
}

/// POST /api/auth/register - create a driver account and log it in.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<RegisterRequest>,
) -> Result<Response> {
    if req.full_name.trim().is_empty() {
        return Err(AppError::Validation("full_name is required".to_owned()));
    }

    let service = AuthService::new(state.pool());
    let user = service
        .register(
            &req.email,
            &req.password,
            req.full_name.trim(),
            req.phone.as_deref(),
            req.tax_id.as_deref(),
        )
        .await?;

    let current = CurrentUser {
        id: user.id,
        email: user.email.clone(),
        role: user.role,
        full_name: user.full_name.clone(),
    };
    set_current_user(&session, &current)
        .await
        .map_err(|e| AppError::Internal(format!("failed to write session: {e}")))?;

    tracing::info!(user_id = %user.id, "user registered");

    Ok(response::created(AuthResponse {
        user_id: user.id,
        email: user.email,
        role: user.role,
        full_name: user.full_name,
    }))
}

/// POST /api/auth/login - establish a session.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<LoginRequest>,
) -> Result<Response> {
    let service = AuthService::new(state.pool());
    let user = service.login(&req.email, &req.password).await?;

    // Rotate the session id on privilege change
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::Internal(format!("failed to cycle session: {e}")))?;

    let current = CurrentUser {
        id: user.id,
        email: user.email.clone(),
        role: user.role,
        full_name: user.full_name.clone(),
    };
    set_current_user(&session, &current)
        .await
        .map_err(|e| AppError::Internal(format!("failed to write session: {e}")))?;

    Ok(response::success(AuthResponse {
        user_id: user.id,
        email: user.email,
        role: user.role,
        full_name: user.full_name,
    }))
}

/// POST /api/auth/logout - destroy the session.
pub async fn logout(RequireAuth(_user): RequireAuth, session: Session) -> Result<Response> {
    clear_session(&session)
        .await
        .map_err(|e| AppError::Internal(format!("failed to clear session: {e}")))?;

    Ok(response::message("Logged out"))
}

/// GET /api/auth/me - identity of the current session.
pub async fn me(RequireAuth(user): RequireAuth) -> Response {
    response::success(user)
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// POST /api/auth/forgot-password - start a password reset.
///
/// Always answers the same message whether or not the email is registered.
/// The reset URL is logged instead of mailed; there is no mail service.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Response> {
    let service = AuthService::new(state.pool());

    if let Some(reset_url) = service
        .start_password_reset(&req.email, &state.config().base_url)
        .await?
    {
        tracing::info!(email = %req.email, %reset_url, "password reset requested");
    }

    Ok(response::message(
        "If the email is registered, reset instructions have been sent",
    ))
}

#[derive(Serialize)]
pub struct ResetTokenResponse {
    pub email: Email,
}

/// GET /api/auth/reset-token/{token} - check a reset token.
pub async fn verify_reset_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Response> {
    let service = AuthService::new(state.pool());
    let email = service.verify_reset_token(&token).await?;

    Ok(response::success(ResetTokenResponse { email }))
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

/// POST /api/auth/reset-password - complete a password reset.
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Response> {
    let service = AuthService::new(state.pool());
    service.reset_password(&req.token, &req.new_password).await?;

    Ok(response::message("Password updated"))
}
