//! Database access for the Lotkeeper `PostgreSQL` schema.
//!
//! One repository struct per aggregate, each borrowing the shared [`PgPool`].
//! Queries are runtime-checked (`sqlx::query_as`) against the canonical
//! schema in `crates/server/migrations/`.
//!
//! ## Tables
//!
//! - `users` - Accounts, roles, plans, password-reset tokens
//! - `parking_lots` - Lots with capacity, rate and occupancy
//! - `parking_sessions` - One row per parking stay (append-only)
//! - `payments` - Immutable payment records
//! - `plan_purchases` - Subscription purchases
//! - `support_tickets` / `ticket_messages` - Ticket threads
//! - tower-sessions store table (managed by the session layer)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p lotkeeper-cli -- migrate
//! ```

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub mod lots;
pub mod payments;
pub mod sessions;
pub mod stats;
pub mod tickets;
pub mod users;

pub use lots::LotRepository;
pub use payments::PaymentRepository;
pub use sessions::SessionRepository;
pub use stats::StatsRepository;
pub use tickets::TicketRepository;
pub use users::UserRepository;

/// Errors surfaced by the repository layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A uniqueness or state precondition was violated.
    ///
    /// In particular, every session lifecycle transition is a conditional
    /// update gated on the expected current status; the losing side of a
    /// concurrent race lands here instead of silently overwriting state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The parking lot has no free spaces (or is no longer active).
    #[error("parking lot is full")]
    LotFull,

    /// A stored value failed to map back into its domain type.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Parse a stored enum string into its domain type.
///
/// Stored values are written through `Display`, so a parse failure means the
/// row was corrupted outside the application.
pub(crate) fn parse_stored<T>(value: &str, what: &str) -> Result<T, RepositoryError>
where
    T: std::str::FromStr,
{
    value
        .parse::<T>()
        .map_err(|_| RepositoryError::DataCorruption(format!("invalid {what} in database: {value}")))
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
