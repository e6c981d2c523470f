//! Admin route handlers. Every handler takes [`RequireAdmin`].
//!
//! [`RequireAdmin`]: crate::middleware::RequireAdmin

pub mod analytics;
pub mod lots;
pub mod sessions;
pub mod tickets;
pub mod users;
