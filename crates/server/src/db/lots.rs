//! Parking lot repository.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;

use lotkeeper_core::{LotId, LotStatus};

use super::{RepositoryError, parse_stored};
use crate::models::ParkingLot;

const LOT_COLUMNS: &str = "id, name, address, latitude, longitude, total_spots, occupied_spots, \
     hourly_rate, open_time, close_time, amenities, status, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct LotRow {
    id: i64,
    name: String,
    address: String,
    latitude: f64,
    longitude: f64,
    total_spots: i32,
    occupied_spots: i32,
    hourly_rate: Decimal,
    open_time: String,
    close_time: String,
    amenities: Vec<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl LotRow {
    fn into_domain(self) -> Result<ParkingLot, RepositoryError> {
        Ok(ParkingLot {
            id: LotId::new(self.id),
            name: self.name,
            address: self.address,
            latitude: self.latitude,
            longitude: self.longitude,
            total_spots: self.total_spots,
            occupied_spots: self.occupied_spots,
            hourly_rate: self.hourly_rate,
            open_time: self.open_time,
            close_time: self.close_time,
            amenities: self.amenities,
            status: parse_stored(&self.status, "lot status")?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Fields accepted when creating or replacing a lot (admin).
#[derive(Debug, Clone, Deserialize)]
pub struct LotInput {
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub total_spots: i32,
    pub hourly_rate: Decimal,
    #[serde(default = "default_open_time")]
    pub open_time: String,
    #[serde(default = "default_close_time")]
    pub close_time: String,
    #[serde(default)]
    pub amenities: Vec<String>,
}

fn default_open_time() -> String {
    "00:00".to_string()
}

fn default_close_time() -> String {
    "23:59".to_string()
}

/// Repository for parking lot database operations.
pub struct LotRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> LotRepository<'a> {
    /// Create a new lot repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All active lots, name-sorted (driver-facing listing).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self) -> Result<Vec<ParkingLot>, RepositoryError> {
        let rows = sqlx::query_as::<_, LotRow>(&format!(
            "SELECT {LOT_COLUMNS} FROM parking_lots WHERE status = 'active' ORDER BY name"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(LotRow::into_domain).collect()
    }

    /// All lots regardless of status (admin listing).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<ParkingLot>, RepositoryError> {
        let rows = sqlx::query_as::<_, LotRow>(&format!(
            "SELECT {LOT_COLUMNS} FROM parking_lots ORDER BY name"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(LotRow::into_domain).collect()
    }

    /// Get a lot by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: LotId) -> Result<Option<ParkingLot>, RepositoryError> {
        let row = sqlx::query_as::<_, LotRow>(&format!(
            "SELECT {LOT_COLUMNS} FROM parking_lots WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(LotRow::into_domain).transpose()
    }

    /// The hourly rate of a lot, if the lot exists.
    ///
    /// Backing query for the rate cache; does not filter on status so that
    /// already-open sessions in a deactivated lot can still be billed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn hourly_rate(&self, id: LotId) -> Result<Option<Decimal>, RepositoryError> {
        let row: Option<(Decimal,)> =
            sqlx::query_as("SELECT hourly_rate FROM parking_lots WHERE id = $1")
                .bind(id.as_i64())
                .fetch_optional(self.pool)
                .await?;

        Ok(row.map(|(rate,)| rate))
    }

    /// Create a new lot (admin).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, input: &LotInput) -> Result<ParkingLot, RepositoryError> {
        let row = sqlx::query_as::<_, LotRow>(&format!(
            "INSERT INTO parking_lots \
             (name, address, latitude, longitude, total_spots, hourly_rate, open_time, close_time, amenities) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {LOT_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(&input.address)
        .bind(input.latitude)
        .bind(input.longitude)
        .bind(input.total_spots)
        .bind(input.hourly_rate)
        .bind(&input.open_time)
        .bind(&input.close_time)
        .bind(&input.amenities)
        .fetch_one(self.pool)
        .await?;

        row.into_domain()
    }

    /// Replace a lot's editable fields (admin).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails; the update is
    /// a no-op when the lot does not exist (caller checks existence first).
    pub async fn update(&self, id: LotId, input: &LotInput) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE parking_lots SET name = $2, address = $3, latitude = $4, longitude = $5, \
             total_spots = $6, hourly_rate = $7, open_time = $8, close_time = $9, \
             amenities = $10, updated_at = now() \
             WHERE id = $1",
        )
        .bind(id.as_i64())
        .bind(&input.name)
        .bind(&input.address)
        .bind(input.latitude)
        .bind(input.longitude)
        .bind(input.total_spots)
        .bind(input.hourly_rate)
        .bind(&input.open_time)
        .bind(&input.close_time)
        .bind(&input.amenities)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Soft-delete a lot by flipping its status to inactive (admin).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn deactivate(&self, id: LotId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE parking_lots SET status = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id.as_i64())
        .bind(LotStatus::Inactive.to_string())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Active lots within `radius_km` of a point, nearest first.
    ///
    /// A bounding box narrows the candidate set in SQL; exact haversine
    /// distances are computed on the candidates and returned in kilometers.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn nearby(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    ) -> Result<Vec<(ParkingLot, f64)>, RepositoryError> {
        let lat_delta = radius_km / 111.0;
        let lng_delta = radius_km / (111.0 * latitude.to_radians().cos().abs().max(0.01));

        let rows = sqlx::query_as::<_, LotRow>(&format!(
            "SELECT {LOT_COLUMNS} FROM parking_lots \
             WHERE status = 'active' \
               AND latitude BETWEEN $1 AND $2 \
               AND longitude BETWEEN $3 AND $4"
        ))
        .bind(latitude - lat_delta)
        .bind(latitude + lat_delta)
        .bind(longitude - lng_delta)
        .bind(longitude + lng_delta)
        .fetch_all(self.pool)
        .await?;

        let mut lots = rows
            .into_iter()
            .map(|row| {
                let lot = row.into_domain()?;
                let distance = haversine_km(latitude, longitude, lot.latitude, lot.longitude);
                Ok((lot, distance))
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        lots.retain(|(_, d)| *d <= radius_km);
        lots.sort_by(|(_, a), (_, b)| a.total_cmp(b));
        Ok(lots)
    }

    /// Live open-session counts per lot (admin listing).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn open_session_counts(&self) -> Result<HashMap<LotId, i64>, RepositoryError> {
        let rows: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT lot_id, COUNT(*) FROM parking_sessions \
             WHERE status IN ('active', 'paid') GROUP BY lot_id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(lot_id, count)| (LotId::new(lot_id), count))
            .collect())
    }
}

/// Great-circle distance between two points, in kilometers.
fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;

    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_zero_distance() {
        assert!(haversine_km(21.8853, -102.2916, 21.8853, -102.2916) < f64::EPSILON);
    }

    #[test]
    fn test_haversine_known_distance() {
        // Mexico City Zocalo to Angel of Independence is roughly 4.2 km.
        let d = haversine_km(19.4326, -99.1332, 19.4270, -99.1676);
        assert!((3.5..5.0).contains(&d), "got {d}");
    }

    #[test]
    fn test_haversine_symmetry() {
        let a = haversine_km(21.88, -102.29, 21.92, -102.31);
        let b = haversine_km(21.92, -102.31, 21.88, -102.29);
        assert!((a - b).abs() < 1e-9);
    }
}
