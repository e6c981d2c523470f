//! Support ticket route handlers (driver-facing).

use axum::Json;
use axum::extract::{Path, State};
use axum::response::Response;
use serde::{Deserialize, Serialize};

use lotkeeper_core::{LotId, TicketAuthor, TicketCategory, TicketId, TicketStatus, UserRole};

use crate::db::TicketRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{SupportTicket, TicketMessage};
use crate::response;
use crate::state::AppState;

/// GET /api/support/tickets - the caller's tickets, newest first.
pub async fn index(State(state): State<AppState>, RequireAuth(user): RequireAuth) -> Result<Response> {
    let tickets = TicketRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(response::success(tickets))
}

#[derive(Deserialize)]
pub struct CreateTicketRequest {
    pub category: TicketCategory,
    pub subject: String,
    pub description: String,
    pub lot_id: Option<i64>,
}

#[derive(Serialize)]
pub struct CreateTicketResponse {
    pub ticket_id: TicketId,
    pub ticket_number: String,
}

/// POST /api/support/tickets - open a ticket with its first message.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<CreateTicketRequest>,
) -> Result<Response> {
    if req.subject.trim().is_empty() {
        return Err(AppError::Validation("subject is required".to_owned()));
    }
    if req.description.trim().is_empty() {
        return Err(AppError::Validation("description is required".to_owned()));
    }

    let ticket = TicketRepository::new(state.pool())
        .create(
            user.id,
            req.lot_id.map(LotId::new),
            req.category,
            req.subject.trim(),
            req.description.trim(),
        )
        .await?;

    tracing::info!(ticket = %ticket.ticket_number, "support ticket opened");

    Ok(response::created(CreateTicketResponse {
        ticket_number: ticket.ticket_number.clone(),
        ticket_id: ticket.id,
    }))
}

#[derive(Serialize)]
pub struct TicketThread {
    #[serde(flatten)]
    pub ticket: SupportTicket,
    pub messages: Vec<TicketMessage>,
}

/// GET /api/support/tickets/{id} - a ticket and its message thread.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i64>,
) -> Result<Response> {
    let repo = TicketRepository::new(state.pool());
    let ticket_id = TicketId::new(id);

    let ticket = repo
        .get(ticket_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("ticket {id} not found")))?;

    if ticket.user_id != user.id && user.role != UserRole::Admin {
        return Err(AppError::Forbidden(
            "you do not have access to this ticket".to_owned(),
        ));
    }

    let messages = repo.messages(ticket_id).await?;
    Ok(response::success(TicketThread { ticket, messages }))
}

#[derive(Deserialize)]
pub struct UpdateTicketRequest {
    pub status: Option<TicketStatus>,
    pub message: Option<String>,
}

/// PUT /api/support/tickets/{id} - append a user message and/or set status.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTicketRequest>,
) -> Result<Response> {
    if req.status.is_none() && req.message.is_none() {
        return Err(AppError::Validation(
            "provide a status and/or a message".to_owned(),
        ));
    }

    let repo = TicketRepository::new(state.pool());
    let ticket_id = TicketId::new(id);

    let ticket = repo
        .get(ticket_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("ticket {id} not found")))?;

    if ticket.user_id != user.id && user.role != UserRole::Admin {
        return Err(AppError::Forbidden(
            "you do not have access to this ticket".to_owned(),
        ));
    }

    if let Some(message) = req.message.as_deref() {
        let message = message.trim();
        if message.is_empty() {
            return Err(AppError::Validation("message cannot be empty".to_owned()));
        }
        repo.append_message(ticket_id, TicketAuthor::User, Some(user.id), message)
            .await?;
    }

    if req.status.is_some() {
        repo.update_state(ticket_id, req.status, None).await?;
    }

    Ok(response::message("Ticket updated"))
}
