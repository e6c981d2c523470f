//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`; the JSON error envelope is built in
//! [`crate::response`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use lotkeeper_core::billing::BillingError;

use crate::db::RepositoryError;
use crate::response;
use crate::services::auth::AuthError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Fee computation failed (misconfigured lot).
    #[error("Billing error: {0}")]
    Billing(#[from] BillingError),

    /// Malformed or missing input, rejected before any state mutation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but lacks the required role or ownership.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code for the error envelope.
    const fn code(&self) -> &'static str {
        match self {
            Self::Database(err) => match err {
                RepositoryError::Conflict(_) => "CONFLICT",
                RepositoryError::LotFull => "LOT_FULL",
                _ => "DATABASE_ERROR",
            },
            Self::Auth(_) => "AUTH_ERROR",
            Self::Billing(_) => "BILLING_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    const fn status(&self) -> StatusCode {
        match self {
            Self::Database(err) => match err {
                RepositoryError::Conflict(_) | RepositoryError::LotFull => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::AccountInactive => StatusCode::FORBIDDEN,
                AuthError::EmailTaken => StatusCode::CONFLICT,
                AuthError::WeakPassword(_)
                | AuthError::InvalidEmail(_)
                | AuthError::InvalidResetToken => StatusCode::BAD_REQUEST,
                AuthError::Repository(_) | AuthError::PasswordHash(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Billing(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to expose to the client.
    fn public_message(&self) -> String {
        match self {
            // Don't expose internal error details to clients
            Self::Database(err) => match err {
                RepositoryError::Conflict(msg) => msg.clone(),
                RepositoryError::LotFull => "Parking lot is full".to_string(),
                _ => "Internal server error".to_string(),
            },
            Self::Internal(_) => "Internal server error".to_string(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid credentials".to_string(),
                AuthError::AccountInactive => {
                    "Account is inactive. Contact an administrator".to_string()
                }
                AuthError::EmailTaken => {
                    "An account with this email already exists".to_string()
                }
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
                AuthError::InvalidResetToken => "Invalid or expired reset token".to_string(),
                AuthError::Repository(_) | AuthError::PasswordHash(_) => {
                    "Authentication error".to_string()
                }
            },
            Self::Billing(err) => err.to_string(),
            Self::Validation(msg) | Self::NotFound(msg) | Self::Forbidden(msg) => msg.clone(),
            Self::Unauthorized(_) => "Authentication required".to_string(),
        }
    }

    const fn is_server_error(&self) -> bool {
        matches!(self.status(), StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        response::error(self.code(), self.public_message(), self.status())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            status_of(AppError::NotFound("lot 9".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Validation("missing plate".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Unauthorized("no session".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AppError::Forbidden("admin only".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(AppError::Internal("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_conflict_and_capacity_map_to_409() {
        assert_eq!(
            status_of(AppError::Database(RepositoryError::Conflict(
                "session is not active".to_string()
            ))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::Database(RepositoryError::LotFull)),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_billing_misconfiguration_maps_to_422() {
        assert_eq!(
            status_of(AppError::Billing(BillingError::UnconfiguredRate)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = AppError::Internal("connection pool exhausted at 10.0.0.3".to_string());
        assert_eq!(err.public_message(), "Internal server error");
    }
}
