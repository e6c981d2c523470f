//! Status and role enums for Lotkeeper entities.
//!
//! All enums serialize as snake_case strings and are stored as TEXT in
//! PostgreSQL; repositories convert through `Display`/`FromStr`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a parking session.
///
/// The legal progression is `active -> paid -> finalized`; an `active`
/// session may also be cancelled by an administrator. `finalized` and
/// `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Vehicle is parked; no payment yet.
    Active,
    /// Payment recorded; awaiting exit validation.
    Paid,
    /// Exit validated; session closed.
    Finalized,
    /// Cancelled by an administrator before payment.
    Cancelled,
}

impl SessionStatus {
    /// Whether `self -> next` is a legal lifecycle transition.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Active, Self::Paid | Self::Cancelled) | (Self::Paid, Self::Finalized)
        )
    }

    /// Whether the session still occupies a parking space.
    ///
    /// Both `active` and `paid` sessions count toward lot occupancy; the
    /// space frees up only when the exit is validated or the session is
    /// cancelled.
    #[must_use]
    pub const fn occupies_space(self) -> bool {
        matches!(self, Self::Active | Self::Paid)
    }

    /// Whether the session has reached a terminal state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finalized | Self::Cancelled)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::Paid => "paid",
            Self::Finalized => "finalized",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "paid" => Ok(Self::Paid),
            "finalized" => Ok(Self::Finalized),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid session status: {s}")),
        }
    }
}

/// Parking lot availability status.
///
/// Lots are never hard-deleted; deactivation flips this to `Inactive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LotStatus {
    #[default]
    Active,
    Inactive,
}

impl std::fmt::Display for LotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
        }
    }
}

impl std::str::FromStr for LotStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(format!("invalid lot status: {s}")),
        }
    }
}

/// User role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Regular driver account.
    #[default]
    Driver,
    /// Full access to the admin API.
    Admin,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Driver => write!(f, "driver"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "driver" => Ok(Self::Driver),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

/// User account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
        }
    }
}

impl std::str::FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(format!("invalid user status: {s}")),
        }
    }
}

/// Payment method selected by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Card,
    Wallet,
    Transfer,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Card => write!(f, "card"),
            Self::Wallet => write!(f, "wallet"),
            Self::Transfer => write!(f, "transfer"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card" => Ok(Self::Card),
            "wallet" => Ok(Self::Wallet),
            "transfer" => Ok(Self::Transfer),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

/// Outcome of a payment attempt.
///
/// Only successful attempts are recorded today; the enum leaves room for
/// recording provider declines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Succeeded,
    Failed,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "succeeded" => Ok(Self::Succeeded),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("invalid payment status: {s}")),
        }
    }
}

/// Subscription plan tier.
///
/// The catalog is server-side: price and discount are attributes of the
/// tier, never accepted from the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    Basic,
    Premium,
    Enterprise,
}

impl PlanTier {
    /// Monthly price of the tier.
    #[must_use]
    pub fn monthly_price(self) -> Decimal {
        match self {
            Self::Basic => Decimal::from(99u32),
            Self::Premium => Decimal::from(199u32),
            Self::Enterprise => Decimal::from(399u32),
        }
    }

    /// Percentage discount applied to session fees for this tier.
    #[must_use]
    pub fn discount_percent(self) -> Decimal {
        match self {
            Self::Basic => Decimal::ZERO,
            Self::Premium => Decimal::from(10u32),
            Self::Enterprise => Decimal::from(15u32),
        }
    }
}

impl std::fmt::Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Basic => write!(f, "basic"),
            Self::Premium => write!(f, "premium"),
            Self::Enterprise => write!(f, "enterprise"),
        }
    }
}

impl std::str::FromStr for PlanTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(Self::Basic),
            "premium" => Ok(Self::Premium),
            "enterprise" => Ok(Self::Enterprise),
            _ => Err(format!("invalid plan tier: {s}")),
        }
    }
}

/// Support ticket category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TicketCategory {
    Technical,
    Billing,
    Commercial,
    #[default]
    Other,
}

impl std::fmt::Display for TicketCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Technical => write!(f, "technical"),
            Self::Billing => write!(f, "billing"),
            Self::Commercial => write!(f, "commercial"),
            Self::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for TicketCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "technical" => Ok(Self::Technical),
            "billing" => Ok(Self::Billing),
            "commercial" => Ok(Self::Commercial),
            "other" => Ok(Self::Other),
            _ => Err(format!("invalid ticket category: {s}")),
        }
    }
}

/// Support ticket priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl std::fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for TicketPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("invalid ticket priority: {s}")),
        }
    }
}

/// Support ticket status.
///
/// Progression: `open -> in_progress -> resolved -> closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Resolved => write!(f, "resolved"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            _ => Err(format!("invalid ticket status: {s}")),
        }
    }
}

/// Who wrote a ticket message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketAuthor {
    /// The ticket's owner.
    User,
    /// A support administrator.
    Support,
}

impl std::fmt::Display for TicketAuthor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Support => write!(f, "support"),
        }
    }
}

impl std::str::FromStr for TicketAuthor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "support" => Ok(Self::Support),
            _ => Err(format!("invalid ticket author: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_session_transition_matrix() {
        use SessionStatus::{Active, Cancelled, Finalized, Paid};

        assert!(Active.can_transition_to(Paid));
        assert!(Active.can_transition_to(Cancelled));
        assert!(Paid.can_transition_to(Finalized));

        // Everything else is illegal.
        assert!(!Active.can_transition_to(Finalized));
        assert!(!Active.can_transition_to(Active));
        assert!(!Paid.can_transition_to(Paid));
        assert!(!Paid.can_transition_to(Cancelled));
        assert!(!Paid.can_transition_to(Active));
        assert!(!Finalized.can_transition_to(Paid));
        assert!(!Finalized.can_transition_to(Active));
        assert!(!Cancelled.can_transition_to(Paid));
        assert!(!Cancelled.can_transition_to(Finalized));
    }

    #[test]
    fn test_session_occupies_space() {
        assert!(SessionStatus::Active.occupies_space());
        assert!(SessionStatus::Paid.occupies_space());
        assert!(!SessionStatus::Finalized.occupies_space());
        assert!(!SessionStatus::Cancelled.occupies_space());
    }

    #[test]
    fn test_session_terminal_states() {
        assert!(SessionStatus::Finalized.is_terminal());
        assert!(SessionStatus::Cancelled.is_terminal());
        assert!(!SessionStatus::Active.is_terminal());
        assert!(!SessionStatus::Paid.is_terminal());
    }

    #[test]
    fn test_status_string_roundtrips() {
        for status in [
            SessionStatus::Active,
            SessionStatus::Paid,
            SessionStatus::Finalized,
            SessionStatus::Cancelled,
        ] {
            assert_eq!(status.to_string().parse::<SessionStatus>().unwrap(), status);
        }

        assert_eq!("in_progress".parse::<TicketStatus>().unwrap(), TicketStatus::InProgress);
        assert!("abierto".parse::<TicketStatus>().is_err());
    }

    #[test]
    fn test_plan_catalog() {
        assert_eq!(PlanTier::Basic.discount_percent(), Decimal::ZERO);
        assert_eq!(PlanTier::Premium.discount_percent(), Decimal::from(10u32));
        assert_eq!(PlanTier::Enterprise.discount_percent(), Decimal::from(15u32));
        assert!(PlanTier::Basic.monthly_price() < PlanTier::Enterprise.monthly_price());
    }

    #[test]
    fn test_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&TicketStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(
            serde_json::from_str::<SessionStatus>("\"paid\"").unwrap(),
            SessionStatus::Paid
        );
    }
}
