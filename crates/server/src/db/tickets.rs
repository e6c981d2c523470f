//! Support ticket repository.

use chrono::{DateTime, Datelike, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use lotkeeper_core::{
    LotId, TicketAuthor, TicketCategory, TicketId, TicketMessageId, TicketPriority, TicketStatus,
    UserId,
};

use super::{RepositoryError, parse_stored};
use crate::models::ticket::TicketWithUser;
use crate::models::{SupportTicket, TicketMessage};

/// How long support has to answer a new ticket.
const SLA_HOURS: i64 = 2;

const TICKET_COLUMNS: &str = "id, ticket_number, user_id, lot_id, category, priority, status, \
     subject, created_at, resolved_at, sla_deadline";

#[derive(sqlx::FromRow)]
struct TicketRow {
    id: i64,
    ticket_number: String,
    user_id: i64,
    lot_id: Option<i64>,
    category: String,
    priority: String,
    status: String,
    subject: String,
    created_at: DateTime<Utc>,
    resolved_at: Option<DateTime<Utc>>,
    sla_deadline: DateTime<Utc>,
}

impl TicketRow {
    fn into_domain(self) -> Result<SupportTicket, RepositoryError> {
        Ok(SupportTicket {
            id: TicketId::new(self.id),
            ticket_number: self.ticket_number,
            user_id: UserId::new(self.user_id),
            lot_id: self.lot_id.map(LotId::new),
            category: parse_stored(&self.category, "ticket category")?,
            priority: parse_stored(&self.priority, "ticket priority")?,
            status: parse_stored(&self.status, "ticket status")?,
            subject: self.subject,
            created_at: self.created_at,
            resolved_at: self.resolved_at,
            sla_deadline: self.sla_deadline,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TicketWithUserRow {
    #[sqlx(flatten)]
    ticket: TicketRow,
    user_name: String,
    user_email: String,
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: i64,
    ticket_id: i64,
    author: String,
    author_user_id: Option<i64>,
    body: String,
    created_at: DateTime<Utc>,
}

impl MessageRow {
    fn into_domain(self) -> Result<TicketMessage, RepositoryError> {
        Ok(TicketMessage {
            id: TicketMessageId::new(self.id),
            ticket_id: TicketId::new(self.ticket_id),
            author: parse_stored(&self.author, "ticket author")?,
            author_user_id: self.author_user_id.map(UserId::new),
            body: self.body,
            created_at: self.created_at,
        })
    }
}

/// Repository for support ticket database operations.
pub struct TicketRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TicketRepository<'a> {
    /// Create a new ticket repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A user's tickets, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<SupportTicket>, RepositoryError> {
        let rows = sqlx::query_as::<_, TicketRow>(&format!(
            "SELECT {TICKET_COLUMNS} FROM support_tickets \
             WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TicketRow::into_domain).collect()
    }

    /// Open a new ticket with its first message.
    ///
    /// The ticket number is derived from the row id (`TKT-YYYY-NNNNN`) so
    /// concurrent creations can never collide, unlike a count-based scheme.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn create(
        &self,
        user_id: UserId,
        lot_id: Option<LotId>,
        category: TicketCategory,
        subject: &str,
        description: &str,
    ) -> Result<SupportTicket, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let (id, created_at): (i64, DateTime<Utc>) = sqlx::query_as(
            "INSERT INTO support_tickets \
             (ticket_number, user_id, lot_id, category, priority, subject, sla_deadline) \
             VALUES ('', $1, $2, $3, $4, $5, now() + make_interval(hours => $6::int)) \
             RETURNING id, created_at",
        )
        .bind(user_id.as_i64())
        .bind(lot_id.as_ref().map(LotId::as_i64))
        .bind(category.to_string())
        .bind(TicketPriority::Medium.to_string())
        .bind(subject)
        .bind(SLA_HOURS)
        .fetch_one(&mut *tx)
        .await?;

        let ticket_number = format!("TKT-{}-{:05}", created_at.year(), id);

        let row = sqlx::query_as::<_, TicketRow>(&format!(
            "UPDATE support_tickets SET ticket_number = $2 WHERE id = $1 \
             RETURNING {TICKET_COLUMNS}"
        ))
        .bind(id)
        .bind(&ticket_number)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO ticket_messages (ticket_id, author, author_user_id, body) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(id)
        .bind(TicketAuthor::User.to_string())
        .bind(user_id.as_i64())
        .bind(description)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        row.into_domain()
    }

    /// Get a ticket by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: TicketId) -> Result<Option<SupportTicket>, RepositoryError> {
        let row = sqlx::query_as::<_, TicketRow>(&format!(
            "SELECT {TICKET_COLUMNS} FROM support_tickets WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(TicketRow::into_domain).transpose()
    }

    /// A ticket's message thread, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn messages(&self, id: TicketId) -> Result<Vec<TicketMessage>, RepositoryError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            "SELECT id, ticket_id, author, author_user_id, body, created_at \
             FROM ticket_messages WHERE ticket_id = $1 ORDER BY created_at",
        )
        .bind(id.as_i64())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(MessageRow::into_domain).collect()
    }

    /// Append a message to a ticket's thread.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn append_message(
        &self,
        id: TicketId,
        author: TicketAuthor,
        author_user_id: Option<UserId>,
        body: &str,
    ) -> Result<TicketMessage, RepositoryError> {
        let row = sqlx::query_as::<_, MessageRow>(
            "INSERT INTO ticket_messages (ticket_id, author, author_user_id, body) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, ticket_id, author, author_user_id, body, created_at",
        )
        .bind(id.as_i64())
        .bind(author.to_string())
        .bind(author_user_id.as_ref().map(UserId::as_i64))
        .bind(body)
        .fetch_one(self.pool)
        .await?;

        row.into_domain()
    }

    /// Update a ticket's status and/or priority.
    ///
    /// Moving to `resolved` stamps `resolved_at`. Returns `false` when the
    /// ticket does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_state(
        &self,
        id: TicketId,
        status: Option<TicketStatus>,
        priority: Option<TicketPriority>,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE support_tickets SET \
                 status = COALESCE($2, status), \
                 priority = COALESCE($3, priority), \
                 resolved_at = CASE WHEN $2 = 'resolved' THEN now() ELSE resolved_at END \
             WHERE id = $1",
        )
        .bind(id.as_i64())
        .bind(status.map(|s| s.to_string()))
        .bind(priority.map(|p| p.to_string()))
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Tickets across all users with optional filters (admin queue).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_admin(
        &self,
        status: Option<TicketStatus>,
        priority: Option<TicketPriority>,
        limit: i64,
    ) -> Result<Vec<TicketWithUser>, RepositoryError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT t.id, t.ticket_number, t.user_id, t.lot_id, t.category, t.priority, \
                    t.status, t.subject, t.created_at, t.resolved_at, t.sla_deadline, \
                    u.full_name AS user_name, u.email AS user_email \
             FROM support_tickets t \
             JOIN users u ON u.id = t.user_id \
             WHERE 1=1",
        );

        if let Some(status) = status {
            builder.push(" AND t.status = ").push_bind(status.to_string());
        }
        if let Some(priority) = priority {
            builder
                .push(" AND t.priority = ")
                .push_bind(priority.to_string());
        }
        builder
            .push(" ORDER BY t.created_at DESC LIMIT ")
            .push_bind(limit);

        let rows: Vec<TicketWithUserRow> = builder.build_query_as().fetch_all(self.pool).await?;

        rows.into_iter()
            .map(|row| {
                Ok(TicketWithUser {
                    ticket: row.ticket.into_domain()?,
                    user_name: row.user_name,
                    user_email: row.user_email,
                })
            })
            .collect()
    }
}
