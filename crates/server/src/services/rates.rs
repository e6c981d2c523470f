//! Hourly-rate lookup with a short-lived cache.
//!
//! Fee computation reads a lot's rate on every payment; the rate changes
//! rarely (admin edits), so a small TTL cache in front of the repository
//! keeps the hot path to one lookup without serving stale rates for long.

use std::time::Duration;

use moka::future::Cache;
use rust_decimal::Decimal;
use sqlx::PgPool;

use lotkeeper_core::LotId;

use crate::db::{LotRepository, RepositoryError};

/// How long a cached rate may be served before re-reading it.
const RATE_TTL: Duration = Duration::from_secs(60);

/// Upper bound on cached entries; far above any realistic lot count.
const RATE_CACHE_CAPACITY: u64 = 10_000;

/// Cached hourly-rate lookup.
#[derive(Clone)]
pub struct RateCache {
    cache: Cache<LotId, Decimal>,
}

impl Default for RateCache {
    fn default() -> Self {
        Self::new()
    }
}

impl RateCache {
    /// Create an empty rate cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(RATE_CACHE_CAPACITY)
                .time_to_live(RATE_TTL)
                .build(),
        }
    }

    /// Resolve a lot's hourly rate, serving from cache when fresh.
    ///
    /// Returns `None` when the lot does not exist. A zero rate is returned
    /// as-is; rejecting it is the fee calculator's job.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the backing query fails.
    pub async fn hourly_rate(
        &self,
        pool: &PgPool,
        lot_id: LotId,
    ) -> Result<Option<Decimal>, RepositoryError> {
        if let Some(rate) = self.cache.get(&lot_id).await {
            return Ok(Some(rate));
        }

        let rate = LotRepository::new(pool).hourly_rate(lot_id).await?;
        if let Some(rate) = rate {
            self.cache.insert(lot_id, rate).await;
        }
        Ok(rate)
    }

    /// Drop a cached rate after an admin edits the lot.
    pub async fn invalidate(&self, lot_id: LotId) {
        self.cache.invalidate(&lot_id).await;
    }
}
