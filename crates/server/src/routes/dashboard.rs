//! Driver dashboard route handler.

use axum::extract::State;
use axum::response::Response;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::{SessionRepository, StatsRepository};
use crate::db::stats::{AmountBucket, CountBucket, UserTotals};
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::response;
use crate::state::AppState;

#[derive(Serialize)]
pub struct RecentActivity {
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct DashboardOverview {
    pub user_name: String,
    #[serde(flatten)]
    pub totals: UserTotals,
    pub recent_activity: Vec<RecentActivity>,
    pub sessions_by_day: Vec<CountBucket>,
    pub sessions_by_status: Vec<CountBucket>,
    pub spending_by_month: Vec<AmountBucket>,
    pub lot_usage: Vec<CountBucket>,
}

/// GET /api/dashboard/overview - per-user stats and chart series.
pub async fn overview(State(state): State<AppState>, RequireAuth(user): RequireAuth) -> Result<Response> {
    let stats = StatsRepository::new(state.pool());

    let totals = stats.user_totals(user.id).await?;
    let sessions_by_day = stats.user_sessions_by_day(user.id).await?;
    let sessions_by_status = stats.user_sessions_by_status(user.id).await?;
    let spending_by_month = stats.user_spending_by_month(user.id).await?;
    let lot_usage = stats.user_lot_usage(user.id).await?;

    let recent_activity = SessionRepository::new(state.pool())
        .list_for_user(user.id)
        .await?
        .into_iter()
        .take(5)
        .map(|s| RecentActivity {
            description: format!("Stay at {} - {}", s.lot_name, s.session.status),
            timestamp: s.session.entry_time,
        })
        .collect();

    Ok(response::success(DashboardOverview {
        user_name: user.full_name,
        totals,
        recent_activity,
        sessions_by_day,
        sessions_by_status,
        spending_by_month,
        lot_usage,
    }))
}
