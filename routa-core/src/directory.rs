use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::repository::DirectoryStore;
use crate::{FlowError, FlowResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Passenger,
    Driver,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    pub id: i64,
    pub name: String,
    pub phone: String,
}

impl Driver {
    pub const NO_NAME: &'static str = "(no name)";
    pub const NO_PHONE: &'static str = "(no phone)";

    /// Externally supplied driver records may lack contact fields; they are
    /// normalized to placeholders rather than rejected.
    pub fn normalize(id: i64, name: Option<&str>, phone: Option<&str>) -> Self {
        let clean = |v: Option<&str>, placeholder: &str| {
            v.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| placeholder.to_string())
        };
        Self {
            id,
            name: clean(name, Self::NO_NAME),
            phone: clean(phone, Self::NO_PHONE),
        }
    }
}

/// Identity sets for the two elevated roles. Admins implicitly hold driver
/// capability; drivers never gain admin capability.
pub struct DirectoryService {
    store: Arc<dyn DirectoryStore>,
    // Set mutations are read-modify-write against the store; serialize them.
    write_guard: Mutex<()>,
}

impl DirectoryService {
    pub fn new(store: Arc<dyn DirectoryStore>) -> Self {
        Self { store, write_guard: Mutex::new(()) }
    }

    /// Merge the statically configured admin ids into the stored set. Called
    /// once at startup; later mutations go through add/remove only.
    pub async fn seed_admins(&self, seed: &[i64]) -> FlowResult<()> {
        let _held = self.write_guard.lock().await;
        let mut admins = self.store.load_admins().await;
        let mut changed = false;
        for id in seed {
            if !admins.contains(id) {
                admins.push(*id);
                changed = true;
            }
        }
        if changed {
            self.store.save_admins(&admins).await.map_err(FlowError::store)?;
            tracing::info!("Seeded admin set, {} total", admins.len());
        }
        Ok(())
    }

    pub async fn is_admin(&self, id: i64) -> bool {
        self.store.load_admins().await.contains(&id)
    }

    pub async fn is_driver(&self, id: i64) -> bool {
        self.has_driver_record(id).await || self.is_admin(id).await
    }

    /// Membership in the explicit driver list, without the admin umbrella.
    /// Route assignment targets must be listed drivers.
    pub async fn has_driver_record(&self, id: i64) -> bool {
        self.store.load_drivers().await.iter().any(|d| d.id == id)
    }

    pub async fn role_of(&self, id: i64) -> Role {
        if self.is_admin(id).await {
            Role::Admin
        } else if self.has_driver_record(id).await {
            Role::Driver
        } else {
            Role::Passenger
        }
    }

    pub async fn drivers(&self) -> Vec<Driver> {
        self.store.load_drivers().await
    }

    pub async fn admins(&self) -> Vec<i64> {
        self.store.load_admins().await
    }

    /// Returns false when the id is already a driver (no-op), true on a
    /// fresh add, so callers can phrase "already exists" vs "added".
    pub async fn add_driver(&self, driver: Driver) -> FlowResult<bool> {
        let _held = self.write_guard.lock().await;
        let mut drivers = self.store.load_drivers().await;
        if drivers.iter().any(|d| d.id == driver.id) {
            return Ok(false);
        }
        tracing::info!("Driver added: {} ({})", driver.id, driver.name);
        drivers.push(driver);
        self.store.save_drivers(&drivers).await.map_err(FlowError::store)?;
        Ok(true)
    }

    /// Reports whether the id actually existed; a missing id is a no-op with
    /// a false result, never an error.
    pub async fn remove_driver(&self, id: i64) -> FlowResult<bool> {
        let _held = self.write_guard.lock().await;
        let mut drivers = self.store.load_drivers().await;
        let before = drivers.len();
        drivers.retain(|d| d.id != id);
        if drivers.len() == before {
            return Ok(false);
        }
        self.store.save_drivers(&drivers).await.map_err(FlowError::store)?;
        tracing::info!("Driver removed: {}", id);
        Ok(true)
    }

    pub async fn add_admin(&self, id: i64) -> FlowResult<bool> {
        let _held = self.write_guard.lock().await;
        let mut admins = self.store.load_admins().await;
        if admins.contains(&id) {
            return Ok(false);
        }
        admins.push(id);
        self.store.save_admins(&admins).await.map_err(FlowError::store)?;
        tracing::info!("Admin added: {}", id);
        Ok(true)
    }

    pub async fn remove_admin(&self, id: i64) -> FlowResult<bool> {
        let _held = self.write_guard.lock().await;
        let mut admins = self.store.load_admins().await;
        let before = admins.len();
        admins.retain(|a| *a != id);
        if admins.len() == before {
            return Ok(false);
        }
        self.store.save_admins(&admins).await.map_err(FlowError::store)?;
        tracing::info!("Admin removed: {}", id);
        Ok(true)
    }
}
