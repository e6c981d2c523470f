//! Authentication error type.

use lotkeeper_core::EmailError;

use crate::db::RepositoryError;

/// Errors from registration, login and password-reset flows.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Email/password pair does not match an account.
    ///
    /// Deliberately covers both "no such user" and "wrong password" so the
    /// response does not reveal which emails are registered.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account exists but has been deactivated.
    #[error("account is inactive")]
    AccountInactive,

    /// Registration attempted with an email that is already registered.
    #[error("email already registered")]
    EmailTaken,

    /// Password failed the strength requirements.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// Email failed structural validation.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Password-reset token is unknown or expired.
    #[error("invalid or expired reset token")]
    InvalidResetToken,

    /// Password hashing or verification failed unexpectedly.
    #[error("password hash error: {0}")]
    PasswordHash(String),

    /// Underlying repository failure.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}
