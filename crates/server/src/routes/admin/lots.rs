//! Admin parking lot management.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::Response;
use rust_decimal::Decimal;
use serde::Serialize;

use lotkeeper_core::LotId;

use crate::db::LotRepository;
use crate::db::lots::LotInput;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::ParkingLot;
use crate::response;
use crate::state::AppState;

#[derive(Serialize)]
pub struct AdminLot {
    #[serde(flatten)]
    pub lot: ParkingLot,
    /// Open sessions (`active`/`paid`) counted live, which can disagree
    /// with the stored counter after manual data edits.
    pub live_sessions: i64,
    pub available_spots: i32,
}

/// GET /api/admin/lots - every lot with live occupancy.
pub async fn index(State(state): State<AppState>, RequireAdmin(_admin): RequireAdmin) -> Result<Response> {
    let repo = LotRepository::new(state.pool());
    let lots = repo.list_all().await?;
    let live = repo.open_session_counts().await?;

    let lots: Vec<AdminLot> = lots
        .into_iter()
        .map(|lot| {
            let live_sessions = live.get(&lot.id).copied().unwrap_or(0);
            let available_spots = lot.available_spots();
            AdminLot {
                lot,
                live_sessions,
                available_spots,
            }
        })
        .collect();

    Ok(response::success(lots))
}

fn validate_input(input: &LotInput) -> Result<()> {
    if input.name.trim().is_empty() {
        return Err(AppError::Validation("name is required".to_owned()));
    }
    if input.total_spots <= 0 {
        return Err(AppError::Validation(
            "total_spots must be positive".to_owned(),
        ));
    }
    if input.hourly_rate < Decimal::ZERO {
        return Err(AppError::Validation(
            "hourly_rate cannot be negative".to_owned(),
        ));
    }
    Ok(())
}

/// POST /api/admin/lots - create a lot.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<LotInput>,
) -> Result<Response> {
    validate_input(&input)?;

    let lot = LotRepository::new(state.pool()).create(&input).await?;
    tracing::info!(lot_id = %lot.id, name = %lot.name, "parking lot created");

    Ok(response::created(lot))
}

/// PUT /api/admin/lots/{id} - replace a lot's editable fields.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i64>,
    Json(input): Json<LotInput>,
) -> Result<Response> {
    validate_input(&input)?;

    let lot_id = LotId::new(id);
    let found = LotRepository::new(state.pool()).update(lot_id, &input).await?;
    if !found {
        return Err(AppError::NotFound(format!("parking lot {id} not found")));
    }

    // The rate may have changed; don't serve the old one for up to a minute.
    state.rates().invalidate(lot_id).await;

    Ok(response::message("Parking lot updated"))
}

/// DELETE /api/admin/lots/{id} - soft delete (status -> inactive).
pub async fn deactivate(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i64>,
) -> Result<Response> {
    let found = LotRepository::new(state.pool())
        .deactivate(LotId::new(id))
        .await?;
    if !found {
        return Err(AppError::NotFound(format!("parking lot {id} not found")));
    }

    Ok(response::message("Parking lot deactivated"))
}
