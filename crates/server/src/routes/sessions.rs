//! Parking session route handlers: the session lifecycle.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::Response;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lotkeeper_core::billing;
use lotkeeper_core::{
    LotId, LotStatus, PaymentMethod, PlateNumber, SessionId, SessionStatus, UserId, UserRole,
};

use crate::db::sessions::NewPayment;
use crate::db::{LotRepository, SessionRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::response;
use crate::state::AppState;

/// GET /api/sessions - the caller's sessions, newest first.
pub async fn index(State(state): State<AppState>, RequireAuth(user): RequireAuth) -> Result<Response> {
    let sessions = SessionRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(response::success(sessions))
}

/// GET /api/sessions/{id} - one session with its lot's rate.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i64>,
) -> Result<Response> {
    let session = SessionRepository::new(state.pool())
        .get_with_lot(SessionId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("session {id} not found")))?;

    require_owner_or_admin(&user, session.session.user_id)?;
    Ok(response::success(session))
}

#[derive(Deserialize)]
pub struct CreateSessionRequest {
    pub lot_id: i64,
    pub plate: String,
}

#[derive(Serialize)]
pub struct CreateSessionResponse {
    pub session_id: SessionId,
    pub entry_code: Uuid,
    pub entry_time: chrono::DateTime<Utc>,
}

/// POST /api/sessions - open a session against a lot.
///
/// Validation happens before any state mutation; the capacity check and the
/// occupancy increment are atomic in the repository, so a full lot rejects
/// exactly the requests that would overflow it.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<CreateSessionRequest>,
) -> Result<Response> {
    let plate =
        PlateNumber::parse(&req.plate).map_err(|e| AppError::Validation(e.to_string()))?;

    let lot_id = LotId::new(req.lot_id);
    let lot = LotRepository::new(state.pool())
        .get(lot_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("parking lot {lot_id} not found")))?;

    if lot.status != LotStatus::Active {
        return Err(AppError::Validation("parking lot is not active".to_owned()));
    }
    if lot.hourly_rate <= Decimal::ZERO {
        // A session here could never be paid for; refuse it up front.
        return Err(AppError::Validation(
            "parking lot has no hourly rate configured".to_owned(),
        ));
    }

    let session = SessionRepository::new(state.pool())
        .create(user.id, lot_id, &plate, Uuid::new_v4())
        .await?;

    tracing::info!(session_id = %session.id, lot_id = %lot_id, "session opened");

    Ok(response::created(CreateSessionResponse {
        session_id: session.id,
        entry_code: session.entry_code,
        entry_time: session.entry_time,
    }))
}

#[derive(Deserialize, Default)]
pub struct PayRequest {
    #[serde(default)]
    pub method: Option<PaymentMethod>,
}

/// POST /api/sessions/{id}/pay - pay for a session (`active -> paid`).
///
/// Billable hours are counted from entry to now, rounded up, minimum one.
/// The fee applies the 16% tax and the caller's plan discount. The payment
/// insert and the status transition are one transaction; paying twice
/// concurrently leaves exactly one payment recorded.
pub async fn pay(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i64>,
    req: Option<Json<PayRequest>>,
) -> Result<Response> {
    let session_id = SessionId::new(id);
    let repo = SessionRepository::new(state.pool());

    let session = repo
        .get(session_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("session {id} not found")))?;

    require_owner_or_admin(&user, session.user_id)?;

    let rate = state
        .rates()
        .hourly_rate(state.pool(), session.lot_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("parking lot {} not found", session.lot_id)))?;

    let discount_percent = UserRepository::new(state.pool())
        .get_by_id(session.user_id)
        .await?
        .map_or(Decimal::ZERO, |owner| owner.plan_discount);

    let billed_hours = billing::billable_hours(session.entry_time, Utc::now());
    let fee = billing::quote(
        rate,
        billed_hours,
        billing::default_tax_rate(),
        discount_percent,
    )?
    .rounded();

    let method = req.and_then(|Json(r)| r.method).unwrap_or_default();
    let payment = repo
        .complete_payment(
            session_id,
            &NewPayment {
                user_id: session.user_id,
                transaction_ref: new_transaction_ref(),
                fee,
                method,
                billed_hours,
                hourly_rate: rate,
            },
        )
        .await?;

    tracing::info!(
        session_id = %session_id,
        payment_id = %payment.id,
        total = %payment.total,
        "session paid"
    );

    Ok(response::success(payment))
}

/// POST /api/sessions/{id}/validate-exit - validate the exit
/// (`paid -> finalized`), stamping the exit time and freeing the space.
pub async fn validate_exit(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i64>,
) -> Result<Response> {
    let session_id = SessionId::new(id);
    let repo = SessionRepository::new(state.pool());

    let session = repo
        .get(session_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("session {id} not found")))?;

    require_owner_or_admin(&user, session.user_id)?;

    let session = repo.finalize(session_id).await?;
    debug_assert_eq!(session.status, SessionStatus::Finalized);

    tracing::info!(session_id = %session_id, "exit validated");
    Ok(response::success(session))
}

/// Reject callers who neither own the resource nor hold the admin role.
fn require_owner_or_admin(user: &CurrentUser, owner: UserId) -> Result<()> {
    if user.id == owner || user.role == UserRole::Admin {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "you do not have access to this session".to_owned(),
        ))
    }
}

/// Build an external payment reference: `TXN-<unix seconds>-<8 hex chars>`.
fn new_transaction_ref() -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    let suffix = uuid.get(..8).unwrap_or("00000000");
    format!("TXN-{}-{suffix}", Utc::now().timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_ref_shape() {
        let txn = new_transaction_ref();
        let parts: Vec<&str> = txn.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts.first().copied(), Some("TXN"));
        assert!(parts.get(1).is_some_and(|p| p.parse::<i64>().is_ok()));
        assert!(
            parts
                .get(2)
                .is_some_and(|p| p.len() == 8 && p.chars().all(|c| c.is_ascii_hexdigit()))
        );
    }

    #[test]
    fn test_transaction_refs_are_unique() {
        assert_ne!(new_transaction_ref(), new_transaction_ref());
    }
}
