//! Session-stored identity.

use serde::{Deserialize, Serialize};

use lotkeeper_core::{Email, UserId, UserRole};

/// Minimal identity stored in the cookie session for the logged-in user.
///
/// The role is re-read from the database on privileged operations; the copy
/// here only routes requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// User's role at login time.
    pub role: UserRole,
    /// Display name.
    pub full_name: String,
}

/// Session keys for authentication data.
pub mod session_keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
