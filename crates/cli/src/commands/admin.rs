//! Admin user bootstrap command.

use lotkeeper_core::{Email, UserRole};
use lotkeeper_server::services::auth::hash_password;

use super::{CliError, connect};

/// Create an admin account, or promote/rehash an existing one.
///
/// # Errors
///
/// Returns `CliError` on invalid input or database failure.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<(), CliError> {
    let email =
        Email::parse(email).map_err(|e| CliError::InvalidInput(format!("email: {e}")))?;
    if password.len() < 8 {
        return Err(CliError::InvalidInput(
            "password must be at least 8 characters".to_owned(),
        ));
    }
    if name.trim().is_empty() {
        return Err(CliError::InvalidInput("name is required".to_owned()));
    }

    let password_hash =
        hash_password(password).map_err(|e| CliError::InvalidInput(e.to_string()))?;

    let pool = connect().await?;

    sqlx::query(
        "INSERT INTO users (email, password_hash, role, full_name) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (email) DO UPDATE \
         SET role = EXCLUDED.role, password_hash = EXCLUDED.password_hash, updated_at = now()",
    )
    .bind(email.as_str())
    .bind(&password_hash)
    .bind(UserRole::Admin.to_string())
    .bind(name.trim())
    .execute(&pool)
    .await?;

    tracing::info!(email = %email, "admin user ready");
    Ok(())
}
