//! Parking session domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use lotkeeper_core::{LotId, PaymentId, PlateNumber, SessionId, SessionStatus, UserId};

/// One parking stay, from vehicle entry to exit.
///
/// Rows are append-only: sessions are never deleted, and `amount` is set
/// exactly once, when the session leaves `active`.
#[derive(Debug, Clone, Serialize)]
pub struct ParkingSession {
    pub id: SessionId,
    pub user_id: UserId,
    pub lot_id: LotId,
    /// Token encoded in the entry QR code.
    pub entry_code: Uuid,
    pub plate: PlateNumber,
    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
    pub status: SessionStatus,
    /// Total charged; `None` while the session is still `active`.
    pub amount: Option<Decimal>,
    pub payment_id: Option<PaymentId>,
    pub created_at: DateTime<Utc>,
}

/// A session joined with its lot's display fields, for listings.
#[derive(Debug, Clone, Serialize)]
pub struct SessionWithLot {
    #[serde(flatten)]
    pub session: ParkingSession,
    pub lot_name: String,
    pub hourly_rate: Decimal,
}

/// A session joined with owner and lot details, for the admin board.
#[derive(Debug, Clone, Serialize)]
pub struct SessionOverview {
    #[serde(flatten)]
    pub session: ParkingSession,
    pub user_name: String,
    pub user_email: String,
    pub lot_name: String,
    pub hourly_rate: Decimal,
}
