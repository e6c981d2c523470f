//! User profile and plan route handlers.

use axum::Json;
use axum::extract::State;
use axum::response::Response;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use lotkeeper_core::{PlanPurchaseId, PlanTier};

use crate::db::{SessionRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::response;
use crate::state::AppState;

/// GET /api/users/me/profile - the caller's profile.
pub async fn profile(State(state): State<AppState>, RequireAuth(user): RequireAuth) -> Result<Response> {
    let profile = UserRepository::new(state.pool())
        .get_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_owned()))?;

    Ok(response::success(profile))
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: String,
    pub phone: Option<String>,
    pub tax_id: Option<String>,
}

/// PUT /api/users/me/profile - update the caller's profile.
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Response> {
    if req.full_name.trim().is_empty() {
        return Err(AppError::Validation("full_name is required".to_owned()));
    }

    UserRepository::new(state.pool())
        .update_profile(
            user.id,
            req.full_name.trim(),
            req.phone.as_deref(),
            req.tax_id.as_deref(),
        )
        .await?;

    Ok(response::message("Profile updated"))
}

/// GET /api/users/me/history - the caller's ten most recent sessions.
pub async fn history(State(state): State<AppState>, RequireAuth(user): RequireAuth) -> Result<Response> {
    let sessions = SessionRepository::new(state.pool())
        .recent_for_user(user.id, 10)
        .await?;

    Ok(response::success(sessions))
}

#[derive(Deserialize)]
pub struct PurchasePlanRequest {
    pub plan: PlanTier,
}

#[derive(Serialize)]
pub struct PurchasePlanResponse {
    pub purchase_id: PlanPurchaseId,
    pub plan: PlanTier,
    pub price: Decimal,
    pub discount_percent: Decimal,
}

/// POST /api/users/me/plan - buy a subscription plan.
///
/// Price and discount come from the server-side catalog; the client only
/// names the tier.
pub async fn purchase_plan(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<PurchasePlanRequest>,
) -> Result<Response> {
    let purchase_id = UserRepository::new(state.pool())
        .purchase_plan(user.id, req.plan)
        .await?;

    tracing::info!(user_id = %user.id, plan = %req.plan, "plan purchased");

    Ok(response::success(PurchasePlanResponse {
        purchase_id,
        plan: req.plan,
        price: req.plan.monthly_price(),
        discount_percent: req.plan.discount_percent(),
    }))
}
