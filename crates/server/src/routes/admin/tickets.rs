//! Admin support ticket management.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::Response;
use serde::Deserialize;

use lotkeeper_core::{TicketAuthor, TicketId, TicketPriority, TicketStatus};

use crate::db::{StatsRepository, TicketRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::response;
use crate::state::AppState;

/// Shortest acceptable support reply.
const MIN_REPLY_LENGTH: usize = 10;

#[derive(Deserialize)]
pub struct TicketsQuery {
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

const fn default_limit() -> i64 {
    50
}

/// GET /api/admin/tickets - tickets across all users.
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<TicketsQuery>,
) -> Result<Response> {
    let limit = query.limit.clamp(1, 500);
    let tickets = TicketRepository::new(state.pool())
        .list_admin(query.status, query.priority, limit)
        .await?;

    Ok(response::success(tickets))
}

/// GET /api/admin/tickets/stats - ticket counts along every axis.
pub async fn stats(State(state): State<AppState>, RequireAdmin(_admin): RequireAdmin) -> Result<Response> {
    let stats = StatsRepository::new(state.pool()).ticket_stats().await?;
    Ok(response::success(stats))
}

#[derive(Deserialize)]
pub struct ReplyRequest {
    pub message: String,
    pub status: Option<TicketStatus>,
}

/// POST /api/admin/tickets/{id}/reply - answer a ticket.
///
/// Without an explicit status the ticket moves to `in_progress`: an
/// answered ticket is no longer merely open.
pub async fn reply(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i64>,
    Json(req): Json<ReplyRequest>,
) -> Result<Response> {
    let message = req.message.trim();
    if message.len() < MIN_REPLY_LENGTH {
        return Err(AppError::Validation(format!(
            "reply must be at least {MIN_REPLY_LENGTH} characters"
        )));
    }

    let repo = TicketRepository::new(state.pool());
    let ticket_id = TicketId::new(id);

    if repo.get(ticket_id).await?.is_none() {
        return Err(AppError::NotFound(format!("ticket {id} not found")));
    }

    repo.append_message(ticket_id, TicketAuthor::Support, Some(admin.id), message)
        .await?;

    let status = req.status.unwrap_or(TicketStatus::InProgress);
    repo.update_state(ticket_id, Some(status), None).await?;

    Ok(response::message("Reply sent"))
}

#[derive(Deserialize)]
pub struct UpdateStateRequest {
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
}

/// PUT /api/admin/tickets/{id}/status - set status and/or priority.
pub async fn set_status(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i64>,
    Json(req): Json<UpdateStateRequest>,
) -> Result<Response> {
    if req.status.is_none() && req.priority.is_none() {
        return Err(AppError::Validation(
            "provide a status and/or a priority".to_owned(),
        ));
    }

    let found = TicketRepository::new(state.pool())
        .update_state(TicketId::new(id), req.status, req.priority)
        .await?;
    if !found {
        return Err(AppError::NotFound(format!("ticket {id} not found")));
    }

    Ok(response::message("Ticket updated"))
}
