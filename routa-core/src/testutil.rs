use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::booking::PassengerAccount;
use crate::directory::Driver;
use crate::repository::{
    BookingStore, DirectoryStore, SessionStore, StoreResult, TripSlotStore,
};
use crate::session::Session;
use crate::trip::{TripId, TripSlot};

/// In-memory store backing unit tests for the shared services.
#[derive(Default)]
pub struct MockStore {
    sessions: RwLock<HashMap<i64, Session>>,
    accounts: RwLock<HashMap<i64, PassengerAccount>>,
    slots: RwLock<HashMap<String, TripSlot>>,
    drivers: RwLock<Vec<Driver>>,
    admins: RwLock<Vec<i64>>,
}

#[async_trait]
impl SessionStore for MockStore {
    async fn load_session(&self, participant: i64) -> Option<Session> {
        self.sessions.read().await.get(&participant).cloned()
    }

    async fn save_session(&self, session: &Session) -> StoreResult<()> {
        self.sessions.write().await.insert(session.participant, session.clone());
        Ok(())
    }
}

#[async_trait]
impl BookingStore for MockStore {
    async fn load_account(&self, owner: i64) -> PassengerAccount {
        self.accounts.read().await.get(&owner).cloned().unwrap_or_default()
    }

    async fn save_account(&self, owner: i64, account: &PassengerAccount) -> StoreResult<()> {
        self.accounts.write().await.insert(owner, account.clone());
        Ok(())
    }

    async fn all_accounts(&self) -> Vec<(i64, PassengerAccount)> {
        self.accounts.read().await.iter().map(|(k, v)| (*k, v.clone())).collect()
    }
}

#[async_trait]
impl TripSlotStore for MockStore {
    async fn load_slot(&self, trip: &TripId) -> Option<TripSlot> {
        self.slots.read().await.get(&trip.storage_key()).cloned()
    }

    async fn save_slot(&self, slot: &TripSlot) -> StoreResult<()> {
        self.slots.write().await.insert(slot.trip.storage_key(), slot.clone());
        Ok(())
    }

    async fn all_slots(&self) -> Vec<TripSlot> {
        self.slots.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl DirectoryStore for MockStore {
    async fn load_drivers(&self) -> Vec<Driver> {
        self.drivers.read().await.clone()
    }

    async fn save_drivers(&self, drivers: &[Driver]) -> StoreResult<()> {
        *self.drivers.write().await = drivers.to_vec();
        Ok(())
    }

    async fn load_admins(&self) -> Vec<i64> {
        self.admins.read().await.clone()
    }

    async fn save_admins(&self, admins: &[i64]) -> StoreResult<()> {
        *self.admins.write().await = admins.to_vec();
        Ok(())
    }
}
