use async_trait::async_trait;

use crate::booking::PassengerAccount;
use crate::directory::Driver;
use crate::session::Session;
use crate::trip::{TripId, TripSlot};

pub type StoreResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

// Read paths return defaults instead of errors: a missing or unreadable
// collection degrades to empty, favoring availability over strict
// durability. Implementations log the degradation. Writes do fail loudly.

/// Store for per-participant conversation sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load_session(&self, participant: i64) -> Option<Session>;
    async fn save_session(&self, session: &Session) -> StoreResult<()>;
}

/// Store for per-owner booking collections and the phone-on-file cache.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn load_account(&self, owner: i64) -> PassengerAccount;
    async fn save_account(&self, owner: i64, account: &PassengerAccount) -> StoreResult<()>;
    /// Every stored account, for cross-owner manifest queries.
    async fn all_accounts(&self) -> Vec<(i64, PassengerAccount)>;
}

/// Store for shared trip-slot records (lock flag, driver assignment).
#[async_trait]
pub trait TripSlotStore: Send + Sync {
    async fn load_slot(&self, trip: &TripId) -> Option<TripSlot>;
    async fn save_slot(&self, slot: &TripSlot) -> StoreResult<()>;
    async fn all_slots(&self) -> Vec<TripSlot>;
}

/// Store for the driver and admin identity sets.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    async fn load_drivers(&self) -> Vec<Driver>;
    async fn save_drivers(&self, drivers: &[Driver]) -> StoreResult<()>;
    async fn load_admins(&self) -> Vec<i64>;
    async fn save_admins(&self, admins: &[i64]) -> StoreResult<()>;
}
