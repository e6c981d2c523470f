//! Parking lot domain type.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use lotkeeper_core::{LotId, LotStatus};

/// A parking lot.
///
/// Lots are created by administrators and never hard-deleted; deactivation
/// flips `status` to `inactive`. `occupied_spots` is maintained by the
/// session lifecycle and always satisfies `0 <= occupied_spots <= total_spots`.
#[derive(Debug, Clone, Serialize)]
pub struct ParkingLot {
    pub id: LotId,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub total_spots: i32,
    pub occupied_spots: i32,
    /// Hourly rate in the lot's local currency.
    pub hourly_rate: Decimal,
    /// Opening time as "HH:MM".
    pub open_time: String,
    /// Closing time as "HH:MM".
    pub close_time: String,
    pub amenities: Vec<String>,
    pub status: LotStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ParkingLot {
    /// Number of currently free spaces.
    #[must_use]
    pub const fn available_spots(&self) -> i32 {
        self.total_spots - self.occupied_spots
    }
}
