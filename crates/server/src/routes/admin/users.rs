//! Admin user management.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::Response;
use serde::Deserialize;

use lotkeeper_core::{UserId, UserRole, UserStatus};

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::response;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UsersQuery {
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    pub search: Option<String>,
}

/// GET /api/admin/users - list users with optional filters.
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<UsersQuery>,
) -> Result<Response> {
    let users = UserRepository::new(state.pool())
        .list(query.role, query.status, query.search.as_deref())
        .await?;

    Ok(response::success(users))
}

#[derive(Deserialize)]
pub struct SetRoleRequest {
    pub role: UserRole,
}

/// PUT /api/admin/users/{id}/role - change a user's role.
pub async fn set_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i64>,
    Json(req): Json<SetRoleRequest>,
) -> Result<Response> {
    let target = UserId::new(id);
    if target == admin.id {
        return Err(AppError::Validation(
            "you cannot change your own role".to_owned(),
        ));
    }

    let repo = UserRepository::new(state.pool());
    if repo.get_by_id(target).await?.is_none() {
        return Err(AppError::NotFound(format!("user {id} not found")));
    }

    repo.set_role(target, req.role).await?;
    tracing::info!(user_id = %target, role = %req.role, "user role changed");

    Ok(response::message("Role updated"))
}

#[derive(Deserialize)]
pub struct SetStatusRequest {
    pub status: UserStatus,
}

/// PUT /api/admin/users/{id}/status - activate or deactivate an account.
pub async fn set_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i64>,
    Json(req): Json<SetStatusRequest>,
) -> Result<Response> {
    let target = UserId::new(id);
    if target == admin.id {
        return Err(AppError::Validation(
            "you cannot deactivate your own account".to_owned(),
        ));
    }

    let repo = UserRepository::new(state.pool());
    if repo.get_by_id(target).await?.is_none() {
        return Err(AppError::NotFound(format!("user {id} not found")));
    }

    repo.set_status(target, req.status).await?;
    tracing::info!(user_id = %target, status = %req.status, "user status changed");

    Ok(response::message("Status updated"))
}
