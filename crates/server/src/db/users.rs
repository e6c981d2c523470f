//! User repository.
//!
//! Password hashes and reset tokens are only ever read by the dedicated
//! credential methods; the row-to-domain mapping never includes them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use lotkeeper_core::{Email, PlanPurchaseId, PlanTier, UserId, UserRole, UserStatus};

use super::{RepositoryError, parse_stored};
use crate::models::User;

/// Columns selected for the domain [`User`] (credentials excluded).
const USER_COLUMNS: &str = "id, email, role, status, full_name, phone, tax_id, \
     current_plan, plan_discount, last_login_at, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    role: String,
    status: String,
    full_name: String,
    phone: Option<String>,
    tax_id: Option<String>,
    current_plan: Option<String>,
    plan_discount: Decimal,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_domain(self) -> Result<User, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let current_plan = self
            .current_plan
            .as_deref()
            .map(|p| parse_stored::<PlanTier>(p, "plan tier"))
            .transpose()?;

        Ok(User {
            id: UserId::new(self.id),
            email,
            role: parse_stored(&self.role, "user role")?,
            status: parse_stored(&self.status, "user status")?,
            full_name: self.full_name,
            phone: self.phone,
            tax_id: self.tax_id,
            current_plan,
            plan_discount: self.plan_discount,
            last_login_at: self.last_login_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_domain).transpose()
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_domain).transpose()
    }

    /// Get a user together with their password hash, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else { return Ok(None) };

        let (hash,): (String,) =
            sqlx::query_as("SELECT password_hash FROM users WHERE id = $1")
                .bind(row.id)
                .fetch_one(self.pool)
                .await?;

        Ok(Some((row.into_domain()?, hash)))
    }

    /// Create a new driver account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    pub async fn create(
        &self,
        email: &Email,
        password_hash: &str,
        full_name: &str,
        phone: Option<&str>,
        tax_id: Option<&str>,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (email, password_hash, full_name, phone, tax_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(email.as_str())
        .bind(password_hash)
        .bind(full_name)
        .bind(phone)
        .bind(tax_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.into_domain()
    }

    /// Update the caller-editable profile fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_profile(
        &self,
        id: UserId,
        full_name: &str,
        phone: Option<&str>,
        tax_id: Option<&str>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE users SET full_name = $2, phone = $3, tax_id = $4, updated_at = now() \
             WHERE id = $1",
        )
        .bind(id.as_i64())
        .bind(full_name)
        .bind(phone)
        .bind(tax_id)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Stamp a successful login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn record_login(&self, id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE users SET last_login_at = now() WHERE id = $1")
            .bind(id.as_i64())
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Store a password-reset token hash with its expiry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_reset_token(
        &self,
        id: UserId,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE users SET reset_token_hash = $2, reset_token_expires_at = $3 WHERE id = $1",
        )
        .bind(id.as_i64())
        .bind(token_hash)
        .bind(expires_at)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Find the user holding a still-valid reset token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_reset_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE reset_token_hash = $1 AND reset_token_expires_at > now()"
        ))
        .bind(token_hash)
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_domain).transpose()
    }

    /// Replace the password hash and clear any outstanding reset token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn reset_password(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE users SET password_hash = $2, reset_token_hash = NULL, \
             reset_token_expires_at = NULL, updated_at = now() WHERE id = $1",
        )
        .bind(id.as_i64())
        .bind(password_hash)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Record a plan purchase and update the user's current tier.
    ///
    /// Both writes happen in one transaction; the purchase row snapshots the
    /// catalog price and discount at purchase time.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn purchase_plan(
        &self,
        id: UserId,
        tier: PlanTier,
    ) -> Result<PlanPurchaseId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let (purchase_id,): (i64,) = sqlx::query_as(
            "INSERT INTO plan_purchases (user_id, plan, price, discount_percent) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(id.as_i64())
        .bind(tier.to_string())
        .bind(tier.monthly_price())
        .bind(tier.discount_percent())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE users SET current_plan = $2, plan_discount = $3, updated_at = now() \
             WHERE id = $1",
        )
        .bind(id.as_i64())
        .bind(tier.to_string())
        .bind(tier.discount_percent())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(PlanPurchaseId::new(purchase_id))
    }

    /// List users with optional role/status/search filters (admin).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        role: Option<UserRole>,
        status: Option<UserStatus>,
        search: Option<&str>,
    ) -> Result<Vec<User>, RepositoryError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users WHERE 1=1"));

        if let Some(role) = role {
            builder.push(" AND role = ").push_bind(role.to_string());
        }
        if let Some(status) = status {
            builder.push(" AND status = ").push_bind(status.to_string());
        }
        if let Some(search) = search {
            let pattern = format!("%{search}%");
            builder
                .push(" AND (email ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR full_name ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        builder.push(" ORDER BY created_at DESC");

        let rows: Vec<UserRow> = builder.build_query_as().fetch_all(self.pool).await?;
        rows.into_iter().map(UserRow::into_domain).collect()
    }

    /// Change a user's role (admin).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_role(&self, id: UserId, role: UserRole) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE users SET role = $2, updated_at = now() WHERE id = $1")
            .bind(id.as_i64())
            .bind(role.to_string())
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Change a user's account status (admin).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_status(&self, id: UserId, status: UserStatus) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE users SET status = $2, updated_at = now() WHERE id = $1")
            .bind(id.as_i64())
            .bind(status.to_string())
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
