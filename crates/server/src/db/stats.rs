//! Aggregation queries backing the dashboard, analytics and report
//! endpoints.
//!
//! Row shapes here serialize straight into API responses; they are grouped
//! counts and sums, not domain entities.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use lotkeeper_core::UserId;

use super::RepositoryError;

/// Landing-page counters.
#[derive(Debug, Clone, Serialize)]
pub struct PublicStats {
    pub active_users: i64,
    pub active_lots: i64,
    pub today_sessions: i64,
}

/// A grouped count, e.g. sessions per day or tickets per status.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CountBucket {
    pub key: String,
    pub count: i64,
}

/// A grouped sum, e.g. spending per month.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AmountBucket {
    pub key: String,
    pub total: Decimal,
}

/// Per-method payment totals.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MethodBreakdown {
    pub method: String,
    pub count: i64,
    pub total: Decimal,
}

/// Per-lot revenue aggregate.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct LotRevenue {
    pub lot_id: i64,
    pub lot_name: String,
    pub total_revenue: Decimal,
    pub total_sessions: i64,
}

/// Per-user headline numbers for the driver dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct UserTotals {
    pub total_sessions: i64,
    pub active_sessions: i64,
    pub total_spent: Decimal,
    pub total_payments: i64,
}

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct AdminSummary {
    pub total_users: i64,
    pub total_lots: i64,
    pub today_sessions: i64,
    pub monthly_revenue: Decimal,
    pub active_sessions: i64,
}

/// One row of the revenue report: a lot on a day.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RevenueReportRow {
    pub day: String,
    pub lot_name: String,
    pub total_amount: Decimal,
    pub total_transactions: i64,
    pub avg_amount: Decimal,
}

/// Revenue report totals over the requested window.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RevenueReportSummary {
    pub total_revenue: Decimal,
    pub total_transactions: i64,
    pub avg_transaction: Decimal,
    pub total_tax: Decimal,
}

/// Month-to-date revenue split between session payments and plan sales.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyRevenue {
    pub payment_revenue: Decimal,
    pub plans_revenue: Decimal,
    pub total_revenue: Decimal,
}

/// A plan purchase with buyer details (admin listing).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PlanPurchaseOverview {
    pub id: i64,
    pub plan: String,
    pub price: Decimal,
    pub discount_percent: Decimal,
    pub purchased_at: DateTime<Utc>,
    pub user_name: String,
    pub user_email: String,
}

/// Per-tier purchase counts and revenue.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PlanDistribution {
    pub plan: String,
    pub count: i64,
    pub total_revenue: Decimal,
}

/// Ticket counts along each grouping axis.
#[derive(Debug, Clone, Serialize)]
pub struct TicketStats {
    pub by_status: Vec<CountBucket>,
    pub by_priority: Vec<CountBucket>,
    pub by_category: Vec<CountBucket>,
    pub total: i64,
}

/// Repository for aggregate statistics.
pub struct StatsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StatsRepository<'a> {
    /// Create a new stats repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    async fn count(&self, sql: &str) -> Result<i64, RepositoryError> {
        let (n,): (i64,) = sqlx::query_as(sql).fetch_one(self.pool).await?;
        Ok(n)
    }

    /// Landing-page counters: active users, active lots, sessions today.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn public_stats(&self) -> Result<PublicStats, RepositoryError> {
        Ok(PublicStats {
            active_users: self
                .count("SELECT COUNT(*) FROM users WHERE status = 'active'")
                .await?,
            active_lots: self
                .count("SELECT COUNT(*) FROM parking_lots WHERE status = 'active'")
                .await?,
            today_sessions: self
                .count(
                    "SELECT COUNT(*) FROM parking_sessions \
                     WHERE entry_time >= date_trunc('day', now())",
                )
                .await?,
        })
    }

    /// Headline numbers for one driver.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn user_totals(&self, user_id: UserId) -> Result<UserTotals, RepositoryError> {
        let (total_sessions,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM parking_sessions WHERE user_id = $1")
                .bind(user_id.as_i64())
                .fetch_one(self.pool)
                .await?;

        let (active_sessions,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM parking_sessions \
             WHERE user_id = $1 AND status IN ('active', 'paid')",
        )
        .bind(user_id.as_i64())
        .fetch_one(self.pool)
        .await?;

        let (total_spent, total_payments): (Decimal, i64) = sqlx::query_as(
            "SELECT COALESCE(SUM(total), 0), COUNT(*) FROM payments \
             WHERE user_id = $1 AND status = 'succeeded'",
        )
        .bind(user_id.as_i64())
        .fetch_one(self.pool)
        .await?;

        Ok(UserTotals {
            total_sessions,
            active_sessions,
            total_spent,
            total_payments,
        })
    }

    /// A driver's session count per day.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn user_sessions_by_day(
        &self,
        user_id: UserId,
    ) -> Result<Vec<CountBucket>, RepositoryError> {
        Ok(sqlx::query_as(
            "SELECT to_char(entry_time, 'YYYY-MM-DD') AS key, COUNT(*) AS count \
             FROM parking_sessions WHERE user_id = $1 \
             GROUP BY key ORDER BY key",
        )
        .bind(user_id.as_i64())
        .fetch_all(self.pool)
        .await?)
    }

    /// A driver's session count per lifecycle status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn user_sessions_by_status(
        &self,
        user_id: UserId,
    ) -> Result<Vec<CountBucket>, RepositoryError> {
        Ok(sqlx::query_as(
            "SELECT status AS key, COUNT(*) AS count \
             FROM parking_sessions WHERE user_id = $1 \
             GROUP BY status ORDER BY count DESC",
        )
        .bind(user_id.as_i64())
        .fetch_all(self.pool)
        .await?)
    }

    /// A driver's successful spending per month.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn user_spending_by_month(
        &self,
        user_id: UserId,
    ) -> Result<Vec<AmountBucket>, RepositoryError> {
        Ok(sqlx::query_as(
            "SELECT to_char(paid_at, 'YYYY-MM') AS key, SUM(total) AS total \
             FROM payments WHERE user_id = $1 AND status = 'succeeded' \
             GROUP BY key ORDER BY key",
        )
        .bind(user_id.as_i64())
        .fetch_all(self.pool)
        .await?)
    }

    /// The five lots a driver parks at most.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn user_lot_usage(
        &self,
        user_id: UserId,
    ) -> Result<Vec<CountBucket>, RepositoryError> {
        Ok(sqlx::query_as(
            "SELECT l.name AS key, COUNT(*) AS count \
             FROM parking_sessions s JOIN parking_lots l ON l.id = s.lot_id \
             WHERE s.user_id = $1 \
             GROUP BY l.name ORDER BY count DESC LIMIT 5",
        )
        .bind(user_id.as_i64())
        .fetch_all(self.pool)
        .await?)
    }

    /// Headline numbers for the admin dashboard.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn admin_summary(&self) -> Result<AdminSummary, RepositoryError> {
        let (monthly_revenue,): (Decimal,) = sqlx::query_as(
            "SELECT COALESCE(SUM(total), 0) FROM payments \
             WHERE status = 'succeeded' AND paid_at >= date_trunc('month', now())",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(AdminSummary {
            total_users: self
                .count("SELECT COUNT(*) FROM users WHERE status = 'active'")
                .await?,
            total_lots: self
                .count("SELECT COUNT(*) FROM parking_lots WHERE status = 'active'")
                .await?,
            today_sessions: self
                .count(
                    "SELECT COUNT(*) FROM parking_sessions \
                     WHERE entry_time >= date_trunc('day', now())",
                )
                .await?,
            monthly_revenue,
            active_sessions: self
                .count(
                    "SELECT COUNT(*) FROM parking_sessions WHERE status IN ('active', 'paid')",
                )
                .await?,
        })
    }

    /// Top 10 lots by successful-payment revenue.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn revenue_by_lot(&self) -> Result<Vec<LotRevenue>, RepositoryError> {
        Ok(sqlx::query_as(
            "SELECT l.id AS lot_id, l.name AS lot_name, \
                    SUM(p.total) AS total_revenue, COUNT(*) AS total_sessions \
             FROM payments p \
             JOIN parking_sessions s ON s.id = p.session_id \
             JOIN parking_lots l ON l.id = s.lot_id \
             WHERE p.status = 'succeeded' \
             GROUP BY l.id, l.name \
             ORDER BY total_revenue DESC LIMIT 10",
        )
        .fetch_all(self.pool)
        .await?)
    }

    /// Session counts per day over the last 30 days.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn sessions_by_day(&self) -> Result<Vec<CountBucket>, RepositoryError> {
        Ok(sqlx::query_as(
            "SELECT to_char(entry_time, 'YYYY-MM-DD') AS key, COUNT(*) AS count \
             FROM parking_sessions \
             WHERE entry_time >= date_trunc('day', now()) - interval '30 days' \
             GROUP BY key ORDER BY key",
        )
        .fetch_all(self.pool)
        .await?)
    }

    /// Successful payments grouped by method.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn payment_methods(&self) -> Result<Vec<MethodBreakdown>, RepositoryError> {
        Ok(sqlx::query_as(
            "SELECT method, COUNT(*) AS count, SUM(total) AS total \
             FROM payments WHERE status = 'succeeded' \
             GROUP BY method ORDER BY count DESC",
        )
        .fetch_all(self.pool)
        .await?)
    }

    /// Ticket counts per status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn tickets_by_status(&self) -> Result<Vec<CountBucket>, RepositoryError> {
        Ok(sqlx::query_as(
            "SELECT status AS key, COUNT(*) AS count FROM support_tickets \
             GROUP BY status ORDER BY count DESC",
        )
        .fetch_all(self.pool)
        .await?)
    }

    /// Ticket counts along every grouping axis (admin stats endpoint).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn ticket_stats(&self) -> Result<TicketStats, RepositoryError> {
        let by_status = self.tickets_by_status().await?;
        let by_priority: Vec<CountBucket> = sqlx::query_as(
            "SELECT priority AS key, COUNT(*) AS count FROM support_tickets \
             GROUP BY priority ORDER BY count DESC",
        )
        .fetch_all(self.pool)
        .await?;
        let by_category: Vec<CountBucket> = sqlx::query_as(
            "SELECT category AS key, COUNT(*) AS count FROM support_tickets \
             GROUP BY category ORDER BY count DESC",
        )
        .fetch_all(self.pool)
        .await?;
        let total = self.count("SELECT COUNT(*) FROM support_tickets").await?;

        Ok(TicketStats {
            by_status,
            by_priority,
            by_category,
            total,
        })
    }

    /// Per-day, per-lot revenue rows within a window.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn revenue_report(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<(Vec<RevenueReportRow>, RevenueReportSummary), RepositoryError> {
        let details: Vec<RevenueReportRow> = sqlx::query_as(
            "SELECT to_char(p.paid_at, 'YYYY-MM-DD') AS day, l.name AS lot_name, \
                    SUM(p.total) AS total_amount, COUNT(*) AS total_transactions, \
                    AVG(p.total) AS avg_amount \
             FROM payments p \
             JOIN parking_sessions s ON s.id = p.session_id \
             JOIN parking_lots l ON l.id = s.lot_id \
             WHERE p.status = 'succeeded' AND p.paid_at BETWEEN $1 AND $2 \
             GROUP BY day, l.name \
             ORDER BY day DESC",
        )
        .bind(start)
        .bind(end)
        .fetch_all(self.pool)
        .await?;

        let summary: RevenueReportSummary = sqlx::query_as(
            "SELECT COALESCE(SUM(total), 0) AS total_revenue, \
                    COUNT(*) AS total_transactions, \
                    COALESCE(AVG(total), 0) AS avg_transaction, \
                    COALESCE(SUM(tax), 0) AS total_tax \
             FROM payments \
             WHERE status = 'succeeded' AND paid_at BETWEEN $1 AND $2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(self.pool)
        .await?;

        Ok((details, summary))
    }

    /// Month-to-date revenue, split between session payments and plan sales.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn monthly_revenue(&self) -> Result<MonthlyRevenue, RepositoryError> {
        let (payment_revenue,): (Decimal,) = sqlx::query_as(
            "SELECT COALESCE(SUM(total), 0) FROM payments \
             WHERE status = 'succeeded' AND paid_at >= date_trunc('month', now())",
        )
        .fetch_one(self.pool)
        .await?;

        let (plans_revenue,): (Decimal,) = sqlx::query_as(
            "SELECT COALESCE(SUM(price), 0) FROM plan_purchases \
             WHERE purchased_at >= date_trunc('month', now())",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(MonthlyRevenue {
            payment_revenue,
            plans_revenue,
            total_revenue: payment_revenue + plans_revenue,
        })
    }

    /// This month's plan purchases with buyer details, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn plans_this_month(&self) -> Result<Vec<PlanPurchaseOverview>, RepositoryError> {
        Ok(sqlx::query_as(
            "SELECT pp.id, pp.plan, pp.price, pp.discount_percent, pp.purchased_at, \
                    u.full_name AS user_name, u.email AS user_email \
             FROM plan_purchases pp \
             JOIN users u ON u.id = pp.user_id \
             WHERE pp.purchased_at >= date_trunc('month', now()) \
             ORDER BY pp.purchased_at DESC",
        )
        .fetch_all(self.pool)
        .await?)
    }

    /// Purchase counts and revenue per plan tier, all time.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn plans_distribution(&self) -> Result<Vec<PlanDistribution>, RepositoryError> {
        Ok(sqlx::query_as(
            "SELECT plan, COUNT(*) AS count, SUM(price) AS total_revenue \
             FROM plan_purchases \
             GROUP BY plan ORDER BY count DESC",
        )
        .fetch_all(self.pool)
        .await?)
    }
}
