//! Parking lot route handlers (driver-facing).

use axum::extract::{Path, Query, State};
use axum::response::Response;
use serde::{Deserialize, Serialize};

use lotkeeper_core::LotId;

use crate::db::LotRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::ParkingLot;
use crate::response;
use crate::state::AppState;

/// GET /api/lots - active lots, name-sorted.
pub async fn index(State(state): State<AppState>, RequireAuth(_user): RequireAuth) -> Result<Response> {
    let lots = LotRepository::new(state.pool()).list_active().await?;
    Ok(response::success(lots))
}

/// GET /api/lots/{id} - one lot.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<i64>,
) -> Result<Response> {
    let lot = LotRepository::new(state.pool())
        .get(LotId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("parking lot {id} not found")))?;

    Ok(response::success(lot))
}

#[derive(Deserialize)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lng: f64,
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
}

const fn default_radius_km() -> f64 {
    5.0
}

#[derive(Serialize)]
pub struct NearbyLot {
    #[serde(flatten)]
    pub lot: ParkingLot,
    /// Distance from the query point, in kilometers.
    pub distance_km: f64,
}

#[derive(Serialize)]
pub struct NearbyResponse {
    pub lots: Vec<NearbyLot>,
    pub total: usize,
}

/// GET /api/lots/nearby?lat&lng&radius_km - active lots near a point,
/// nearest first.
pub async fn nearby(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Query(query): Query<NearbyQuery>,
) -> Result<Response> {
    if !(-90.0..=90.0).contains(&query.lat) || !(-180.0..=180.0).contains(&query.lng) {
        return Err(AppError::Validation("invalid coordinates".to_owned()));
    }
    if query.radius_km <= 0.0 || query.radius_km > 100.0 {
        return Err(AppError::Validation(
            "radius_km must be in (0, 100]".to_owned(),
        ));
    }

    let lots = LotRepository::new(state.pool())
        .nearby(query.lat, query.lng, query.radius_km)
        .await?;

    let lots: Vec<NearbyLot> = lots
        .into_iter()
        .map(|(lot, distance_km)| NearbyLot {
            lot,
            distance_km: (distance_km * 100.0).round() / 100.0,
        })
        .collect();

    let total = lots.len();
    Ok(response::success(NearbyResponse { lots, total }))
}
