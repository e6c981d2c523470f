//! Admin session management.

use axum::extract::{Path, State};
use axum::response::Response;

use lotkeeper_core::SessionId;

use crate::db::SessionRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::response;
use crate::state::AppState;

/// GET /api/admin/sessions/active - all open sessions with owner and lot.
pub async fn active(State(state): State<AppState>, RequireAdmin(_admin): RequireAdmin) -> Result<Response> {
    let sessions = SessionRepository::new(state.pool())
        .list_open_with_details()
        .await?;

    Ok(response::success(sessions))
}

/// POST /api/admin/sessions/{id}/cancel - admin override,
/// `active -> cancelled`, freeing the space.
pub async fn cancel(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i64>,
) -> Result<Response> {
    let session_id = SessionId::new(id);
    let repo = SessionRepository::new(state.pool());

    if repo.get(session_id).await?.is_none() {
        return Err(AppError::NotFound(format!("session {id} not found")));
    }

    let session = repo.cancel(session_id).await?;
    tracing::info!(session_id = %session_id, admin_id = %admin.id, "session cancelled");

    Ok(response::success(session))
}
