//! Public stats route handler.

use axum::extract::State;
use axum::response::Response;

use crate::db::StatsRepository;
use crate::error::Result;
use crate::response;
use crate::state::AppState;

/// GET /api/stats - landing-page counters, no auth required.
pub async fn public_stats(State(state): State<AppState>) -> Result<Response> {
    let stats = StatsRepository::new(state.pool()).public_stats().await?;
    Ok(response::success(stats))
}
