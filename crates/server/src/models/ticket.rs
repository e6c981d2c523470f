//! Support ticket domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use lotkeeper_core::{
    LotId, TicketAuthor, TicketCategory, TicketId, TicketMessageId, TicketPriority, TicketStatus,
    UserId,
};

/// A support ticket.
#[derive(Debug, Clone, Serialize)]
pub struct SupportTicket {
    pub id: TicketId,
    /// Human-facing reference, e.g. `TKT-2025-00042`.
    pub ticket_number: String,
    pub user_id: UserId,
    /// Lot the ticket is about, if any.
    pub lot_id: Option<LotId>,
    pub category: TicketCategory,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    pub subject: String,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub sla_deadline: DateTime<Utc>,
}

/// A ticket joined with its owner's display fields, for the admin queue.
#[derive(Debug, Clone, Serialize)]
pub struct TicketWithUser {
    #[serde(flatten)]
    pub ticket: SupportTicket,
    pub user_name: String,
    pub user_email: String,
}

/// One turn in a ticket's message thread.
#[derive(Debug, Clone, Serialize)]
pub struct TicketMessage {
    pub id: TicketMessageId,
    pub ticket_id: TicketId,
    pub author: TicketAuthor,
    /// The admin who wrote a support reply, when known.
    pub author_user_id: Option<UserId>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}
