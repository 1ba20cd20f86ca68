use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::trip::TripId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub owner: i64,
    pub trip: TripId,
    pub seats: u32,
    pub phone: String,
    pub comment: String,
    pub created_by_driver: bool,
    /// Set only when a driver booked on a passenger's behalf.
    pub driver_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Per-owner collection plus the phone-on-file cache reused across bookings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PassengerAccount {
    pub bookings: Vec<Booking>,
    pub phone: Option<String>,
}

/// Fully captured draft handed to the ledger's single write path. The session
/// layer guarantees every field is present before constructing one.
#[derive(Debug, Clone)]
pub struct BookingDraft {
    pub trip: TripId,
    pub seats: u32,
    pub phone: String,
    pub comment: String,
    pub created_by_driver: bool,
    pub driver_id: Option<i64>,
}
