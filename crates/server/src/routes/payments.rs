//! Payment route handlers (driver-facing, read only).

use axum::extract::{Path, Query, State};
use axum::response::Response;
use serde::Deserialize;

use lotkeeper_core::{PaymentId, SessionId, UserRole};

use crate::db::PaymentRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::response;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct PaymentsQuery {
    pub session_id: Option<i64>,
}

/// GET /api/payments - the caller's payments, newest first.
///
/// With `?session_id=`, payments for that session instead (still limited to
/// the caller unless they are an admin).
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<PaymentsQuery>,
) -> Result<Response> {
    let repo = PaymentRepository::new(state.pool());

    let payments = match query.session_id {
        Some(session_id) => {
            let mut payments = repo.list_for_session(SessionId::new(session_id)).await?;
            if user.role != UserRole::Admin {
                payments.retain(|p| p.user_id == user.id);
            }
            payments
        }
        None => repo.list_for_user(user.id).await?,
    };

    Ok(response::success(payments))
}

/// GET /api/payments/{id} - receipt detail with lot and session context.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i64>,
) -> Result<Response> {
    let detail = PaymentRepository::new(state.pool())
        .get_detail(PaymentId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("payment {id} not found")))?;

    if detail.payment.user_id != user.id && user.role != UserRole::Admin {
        return Err(AppError::Forbidden(
            "you do not have access to this payment".to_owned(),
        ));
    }

    Ok(response::success(detail))
}
