//! Admin analytics and report handlers.

use axum::extract::{Query, State};
use axum::response::Response;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::db::StatsRepository;
use crate::db::stats::{
    AdminSummary, CountBucket, LotRevenue, MethodBreakdown, PlanDistribution, RevenueReportRow,
    RevenueReportSummary,
};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::response;
use crate::state::AppState;

#[derive(Serialize)]
pub struct AnalyticsResponse {
    pub summary: AdminSummary,
    pub revenue_by_lot: Vec<LotRevenue>,
    pub sessions_by_day: Vec<CountBucket>,
    pub payment_methods: Vec<MethodBreakdown>,
    pub tickets_by_status: Vec<CountBucket>,
    pub plans_distribution: Vec<PlanDistribution>,
}

/// GET /api/admin/analytics - the admin dashboard payload.
pub async fn overview(State(state): State<AppState>, RequireAdmin(_admin): RequireAdmin) -> Result<Response> {
    let stats = StatsRepository::new(state.pool());

    Ok(response::success(AnalyticsResponse {
        summary: stats.admin_summary().await?,
        revenue_by_lot: stats.revenue_by_lot().await?,
        sessions_by_day: stats.sessions_by_day().await?,
        payment_methods: stats.payment_methods().await?,
        tickets_by_status: stats.tickets_by_status().await?,
        plans_distribution: stats.plans_distribution().await?,
    }))
}

#[derive(Deserialize)]
pub struct RevenueReportQuery {
    pub start: String,
    pub end: String,
}

#[derive(Serialize)]
pub struct RevenueReportResponse {
    pub details: Vec<RevenueReportRow>,
    pub summary: RevenueReportSummary,
}

/// GET /api/admin/reports/revenue?start&end - revenue in a window.
///
/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates; a date-only
/// `end` is inclusive of that whole day.
pub async fn revenue_report(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<RevenueReportQuery>,
) -> Result<Response> {
    let start = parse_window_bound(&query.start, false)
        .ok_or_else(|| AppError::Validation(format!("invalid start date: {}", query.start)))?;
    let end = parse_window_bound(&query.end, true)
        .ok_or_else(|| AppError::Validation(format!("invalid end date: {}", query.end)))?;

    if end < start {
        return Err(AppError::Validation("end must not precede start".to_owned()));
    }

    let (details, summary) = StatsRepository::new(state.pool())
        .revenue_report(start, end)
        .await?;

    Ok(response::success(RevenueReportResponse { details, summary }))
}

/// GET /api/admin/revenue/monthly - month-to-date revenue split.
pub async fn monthly_revenue(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Response> {
    let revenue = StatsRepository::new(state.pool()).monthly_revenue().await?;
    Ok(response::success(revenue))
}

/// GET /api/admin/plans/month - this month's plan purchases.
pub async fn plans_month(State(state): State<AppState>, RequireAdmin(_admin): RequireAdmin) -> Result<Response> {
    let plans = StatsRepository::new(state.pool()).plans_this_month().await?;
    Ok(response::success(plans))
}

/// GET /api/admin/plans/distribution - per-tier purchase counts.
pub async fn plans_distribution(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Response> {
    let distribution = StatsRepository::new(state.pool())
        .plans_distribution()
        .await?;
    Ok(response::success(distribution))
}

/// Parse a report window bound: RFC 3339, or `YYYY-MM-DD`.
///
/// A date-only value maps to midnight UTC; with `end_of_day` it maps to the
/// last instant of that day, so date-only windows are inclusive.
fn parse_window_bound(value: &str, end_of_day: bool) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?.and_utc();
    if end_of_day {
        Some(midnight + Duration::days(1) - Duration::milliseconds(1))
    } else {
        Some(midnight)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_window_bound_rfc3339() {
        let parsed = parse_window_bound("2025-03-01T12:30:00Z", false).unwrap();
        assert_eq!(parsed.to_rfc3339(), "2025-03-01T12:30:00+00:00");
    }

    #[test]
    fn test_parse_window_bound_date_only() {
        let start = parse_window_bound("2025-03-01", false).unwrap();
        let end = parse_window_bound("2025-03-01", true).unwrap();
        assert!(start < end);
        // Same calendar day, whole day covered.
        assert_eq!(start.date_naive(), end.date_naive());
    }

    #[test]
    fn test_parse_window_bound_rejects_garbage() {
        assert!(parse_window_bound("not-a-date", false).is_none());
        assert!(parse_window_bound("2025-13-40", false).is_none());
    }
}
