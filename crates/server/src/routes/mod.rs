//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//! GET  /health/ready                - Readiness check (DB round trip)
//! GET  /api/stats                   - Public landing-page counters
//!
//! # Auth
//! POST /api/auth/register           - Create a driver account + login
//! POST /api/auth/login              - Login
//! POST /api/auth/logout             - Logout
//! GET  /api/auth/me                 - Current session identity
//! POST /api/auth/forgot-password    - Start a password reset
//! GET  /api/auth/reset-token/{token} - Check a reset token
//! POST /api/auth/reset-password     - Complete a password reset
//!
//! # Parking lots
//! GET  /api/lots                    - Active lots
//! GET  /api/lots/nearby             - Active lots near a point
//! GET  /api/lots/{id}               - One lot
//!
//! # Parking sessions
//! GET  /api/sessions                - Caller's sessions
//! POST /api/sessions                - Open a session (capacity-gated)
//! GET  /api/sessions/{id}           - One session + rate
//! POST /api/sessions/{id}/pay       - Pay (active -> paid)
//! POST /api/sessions/{id}/validate-exit - Validate exit (paid -> finalized)
//!
//! # Payments
//! GET  /api/payments                - Caller's payments (?session_id=)
//! GET  /api/payments/{id}           - Receipt detail
//!
//! # Users & plans
//! GET  /api/users/me/profile        - Profile
//! PUT  /api/users/me/profile        - Update profile
//! GET  /api/users/me/history        - Recent sessions
//! POST /api/users/me/plan           - Buy a subscription plan
//!
//! # Support
//! GET  /api/support/tickets         - Caller's tickets
//! POST /api/support/tickets         - Open a ticket
//! GET  /api/support/tickets/{id}    - Ticket + thread
//! PUT  /api/support/tickets/{id}    - Reply and/or set status
//!
//! # Dashboard
//! GET  /api/dashboard/overview      - Per-user stats and chart series
//!
//! # Admin (role-gated)
//! GET    /api/admin/analytics
//! GET    /api/admin/lots            POST /api/admin/lots
//! PUT    /api/admin/lots/{id}       DELETE /api/admin/lots/{id}
//! GET    /api/admin/users
//! PUT    /api/admin/users/{id}/role PUT /api/admin/users/{id}/status
//! GET    /api/admin/sessions/active
//! POST   /api/admin/sessions/{id}/cancel
//! GET    /api/admin/reports/revenue
//! GET    /api/admin/revenue/monthly
//! GET    /api/admin/plans/month     GET /api/admin/plans/distribution
//! GET    /api/admin/tickets         GET /api/admin/tickets/stats
//! POST   /api/admin/tickets/{id}/reply
//! PUT    /api/admin/tickets/{id}/status
//! ```

pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod lots;
pub mod payments;
pub mod sessions;
pub mod stats;
pub mod support;
pub mod users;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-token/{token}", get(auth::verify_reset_token))
        .route("/reset-password", post(auth::reset_password))
}

/// Create the parking lot routes router.
pub fn lot_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(lots::index))
        .route("/nearby", get(lots::nearby))
        .route("/{id}", get(lots::show))
}

/// Create the parking session routes router.
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(sessions::index).post(sessions::create))
        .route("/{id}", get(sessions::show))
        .route("/{id}/pay", post(sessions::pay))
        .route("/{id}/validate-exit", post(sessions::validate_exit))
}

/// Create the payment routes router.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(payments::index))
        .route("/{id}", get(payments::show))
}

/// Create the user/plan routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/me/profile",
            get(users::profile).put(users::update_profile),
        )
        .route("/me/history", get(users::history))
        .route("/me/plan", post(users::purchase_plan))
}

/// Create the support routes router.
pub fn support_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tickets",
            get(support::index).post(support::create),
        )
        .route(
            "/tickets/{id}",
            get(support::show).put(support::update),
        )
}

/// Create the admin routes router (every handler requires the admin role).
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/analytics", get(admin::analytics::overview))
        .route(
            "/lots",
            get(admin::lots::index).post(admin::lots::create),
        )
        .route(
            "/lots/{id}",
            put(admin::lots::update).delete(admin::lots::deactivate),
        )
        .route("/users", get(admin::users::index))
        .route("/users/{id}/role", put(admin::users::set_role))
        .route("/users/{id}/status", put(admin::users::set_status))
        .route("/sessions/active", get(admin::sessions::active))
        .route("/sessions/{id}/cancel", post(admin::sessions::cancel))
        .route("/reports/revenue", get(admin::analytics::revenue_report))
        .route("/revenue/monthly", get(admin::analytics::monthly_revenue))
        .route("/plans/month", get(admin::analytics::plans_month))
        .route(
            "/plans/distribution",
            get(admin::analytics::plans_distribution),
        )
        .route(
            "/tickets",
            get(admin::tickets::index),
        )
        .route("/tickets/stats", get(admin::tickets::stats))
        .route("/tickets/{id}/reply", post(admin::tickets::reply))
        .route("/tickets/{id}/status", put(admin::tickets::set_status))
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/stats", get(stats::public_stats))
        .nest("/api/auth", auth_routes())
        .nest("/api/lots", lot_routes())
        .nest("/api/sessions", session_routes())
        .nest("/api/payments", payment_routes())
        .nest("/api/users", user_routes())
        .nest("/api/support", support_routes())
        .route("/api/dashboard/overview", get(dashboard::overview))
        .nest("/api/admin", admin_routes())
}
