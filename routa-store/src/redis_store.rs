use async_trait::async_trait;
use redis::{AsyncCommands, RedisResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use routa_core::booking::PassengerAccount;
use routa_core::directory::Driver;
use routa_core::repository::{
    BookingStore, DirectoryStore, SessionStore, StoreResult, TripSlotStore,
};
use routa_core::session::Session;
use routa_core::trip::{TripId, TripSlot};

/// Redis-backed store: one JSON blob per record, `collection:{key}` naming.
/// Reads degrade to defaults on any failure; writes surface their error.
#[derive(Clone)]
pub struct RedisStore {
    client: redis::Client,
}

impl RedisStore {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = async {
            let mut conn = self.client.get_multiplexed_async_connection().await?;
            let raw: Option<String> = conn.get(key).await?;
            RedisResult::Ok(raw)
        }
        .await;

        match raw {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => Some(value),
                Err(err) => {
                    warn!("Undecodable record at {}: {}", key, err);
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                warn!("Redis read failed for {}: {}", key, err);
                None
            }
        }
    }

    async fn put_json<T: Serialize>(&self, key: &str, value: &T) -> StoreResult<()> {
        let raw = serde_json::to_string(value)?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set::<_, _, ()>(key, raw).await?;
        Ok(())
    }

    /// Every JSON record under a `collection:` prefix. KEYS is a full scan,
    /// acceptable at this fleet's record counts.
    async fn scan_json<T: DeserializeOwned>(&self, prefix: &str) -> Vec<(String, T)> {
        let keys = async {
            let mut conn = self.client.get_multiplexed_async_connection().await?;
            let keys: Vec<String> = conn.keys(format!("{}*", prefix)).await?;
            RedisResult::Ok(keys)
        }
        .await;

        let keys = match keys {
            Ok(keys) => keys,
            Err(err) => {
                warn!("Redis scan failed for {}*: {}", prefix, err);
                return Vec::new();
            }
        };

        let mut records = Vec::new();
        for key in keys {
            if let Some(value) = self.get_json::<T>(&key).await {
                let suffix = key[prefix.len()..].to_string();
                records.push((suffix, value));
            }
        }
        records
    }
}

fn session_key(participant: i64) -> String {
    format!("session:{}", participant)
}

fn account_key(owner: i64) -> String {
    format!("account:{}", owner)
}

fn slot_key(trip: &TripId) -> String {
    format!("slot:{}", trip.storage_key())
}

const DRIVERS_KEY: &str = "drivers";
const ADMINS_KEY: &str = "admins";

#[async_trait]
impl SessionStore for RedisStore {
    async fn load_session(&self, participant: i64) -> Option<Session> {
        self.get_json(&session_key(participant)).await
    }

    async fn save_session(&self, session: &Session) -> StoreResult<()> {
        self.put_json(&session_key(session.participant), session).await
    }
}

#[async_trait]
impl BookingStore for RedisStore {
    async fn load_account(&self, owner: i64) -> PassengerAccount {
        self.get_json(&account_key(owner)).await.unwrap_or_default()
    }

    async fn save_account(&self, owner: i64, account: &PassengerAccount) -> StoreResult<()> {
        self.put_json(&account_key(owner), account).await
    }

    async fn all_accounts(&self) -> Vec<(i64, PassengerAccount)> {
        self.scan_json::<PassengerAccount>("account:")
            .await
            .into_iter()
            .filter_map(|(suffix, account)| {
                let owner = suffix.parse().ok()?;
                Some((owner, account))
            })
            .collect()
    }
}

#[async_trait]
impl TripSlotStore for RedisStore {
    async fn load_slot(&self, trip: &TripId) -> Option<TripSlot> {
        self.get_json(&slot_key(trip)).await
    }

    async fn save_slot(&self, slot: &TripSlot) -> StoreResult<()> {
        self.put_json(&slot_key(&slot.trip), slot).await
    }

    async fn all_slots(&self) -> Vec<TripSlot> {
        self.scan_json::<TripSlot>("slot:")
            .await
            .into_iter()
            .map(|(_, slot)| slot)
            .collect()
    }
}

#[async_trait]
impl DirectoryStore for RedisStore {
    async fn load_drivers(&self) -> Vec<Driver> {
        self.get_json(DRIVERS_KEY).await.unwrap_or_default()
    }

    async fn save_drivers(&self, drivers: &[Driver]) -> StoreResult<()> {
        self.put_json(DRIVERS_KEY, &drivers.to_vec()).await
    }

    async fn load_admins(&self) -> Vec<i64> {
        self.get_json(ADMINS_KEY).await.unwrap_or_default()
    }

    async fn save_admins(&self, admins: &[i64]) -> StoreResult<()> {
        self.put_json(ADMINS_KEY, &admins.to_vec()).await
    }
}
