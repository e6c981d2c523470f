//! User domain type.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use lotkeeper_core::{Email, PlanTier, UserId, UserRole, UserStatus};

/// A Lotkeeper account (driver or administrator).
///
/// The password hash and reset-token fields never leave the repository
/// layer; this type is safe to serialize into API responses.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub role: UserRole,
    pub status: UserStatus,
    pub full_name: String,
    pub phone: Option<String>,
    /// Tax identifier for invoicing, if provided.
    pub tax_id: Option<String>,
    /// Current subscription tier; `None` means pay-as-you-go.
    pub current_plan: Option<PlanTier>,
    /// Percentage discount applied to session fees.
    pub plan_discount: Decimal,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
