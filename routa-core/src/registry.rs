use std::sync::Arc;

use chrono::NaiveDate;

use crate::directory::DirectoryService;
use crate::repository::TripSlotStore;
use crate::sync::KeyedMutex;
use crate::trip::{TripId, TripSlot};
use crate::{FlowError, FlowResult};

/// Shared registry of trip slots: lock flags and driver assignments, keyed by
/// trip identity. Mutations are linearizable per trip via a keyed mutex.
pub struct TripRegistry {
    store: Arc<dyn TripSlotStore>,
    directory: Arc<DirectoryService>,
    locks: KeyedMutex,
}

impl TripRegistry {
    pub fn new(store: Arc<dyn TripSlotStore>, directory: Arc<DirectoryService>) -> Self {
        Self { store, directory, locks: KeyedMutex::new() }
    }

    async fn mutate<F>(&self, trip: &TripId, apply: F) -> FlowResult<TripSlot>
    where
        F: FnOnce(&mut TripSlot),
    {
        let entry = self.locks.entry(&trip.storage_key());
        let _held = entry.lock().await;

        let mut slot = self
            .store
            .load_slot(trip)
            .await
            .unwrap_or_else(|| TripSlot::new(*trip));
        apply(&mut slot);
        self.store.save_slot(&slot).await.map_err(FlowError::store)?;
        Ok(slot)
    }

    /// Idempotent; repeated locks are no-ops, never errors.
    pub async fn lock(&self, trip: &TripId) -> FlowResult<()> {
        self.mutate(trip, |slot| slot.locked = true).await?;
        tracing::info!("Trip locked: {}", trip);
        Ok(())
    }

    pub async fn unlock(&self, trip: &TripId) -> FlowResult<()> {
        self.mutate(trip, |slot| slot.locked = false).await?;
        tracing::info!("Trip unlocked: {}", trip);
        Ok(())
    }

    pub async fn is_locked(&self, trip: &TripId) -> bool {
        self.store.load_slot(trip).await.map(|s| s.locked).unwrap_or(false)
    }

    /// Assigns a listed driver to the departure, overwriting any prior
    /// assignment (last write wins). Unlisted ids are rejected.
    pub async fn assign_driver(&self, trip: &TripId, driver_id: i64) -> FlowResult<()> {
        if !self.directory.has_driver_record(driver_id).await {
            return Err(FlowError::UnknownDriver(driver_id));
        }
        self.mutate(trip, |slot| slot.driver = Some(driver_id)).await?;
        tracing::info!("Driver {} assigned to {}", driver_id, trip);
        Ok(())
    }

    /// The driver's itinerary inside a date window, sorted by (date, time).
    pub async fn driver_trips(
        &self,
        driver_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Vec<TripSlot> {
        let mut slots: Vec<TripSlot> = self
            .store
            .all_slots()
            .await
            .into_iter()
            .filter(|s| s.driver == Some(driver_id))
            .filter(|s| s.trip.date >= from && s.trip.date <= to)
            .collect();
        slots.sort_by_key(|s| (s.trip.date, s.trip.time));
        slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{Driver, DirectoryService};
    use crate::testutil::MockStore;
    use crate::trip::Direction;
    use chrono::NaiveTime;

    fn setup() -> (Arc<DirectoryService>, TripRegistry) {
        let store = Arc::new(MockStore::default());
        let directory = Arc::new(DirectoryService::new(store.clone()));
        let registry = TripRegistry::new(store, directory.clone());
        (directory, registry)
    }

    fn trip(day: u32, hour: u32) -> TripId {
        TripId::new(
            NaiveDate::from_ymd_opt(2026, 8, day).unwrap(),
            NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            Direction::RokytneToKyiv,
        )
    }

    #[tokio::test]
    async fn lock_and_unlock_are_idempotent() {
        let (_, registry) = setup();
        let id = trip(10, 8);

        assert!(!registry.is_locked(&id).await);
        registry.lock(&id).await.unwrap();
        registry.lock(&id).await.unwrap();
        assert!(registry.is_locked(&id).await);
        registry.unlock(&id).await.unwrap();
        registry.unlock(&id).await.unwrap();
        assert!(!registry.is_locked(&id).await);
    }

    #[tokio::test]
    async fn assignment_requires_listed_driver() {
        let (directory, registry) = setup();
        let id = trip(10, 8);

        let err = registry.assign_driver(&id, 99).await.unwrap_err();
        assert!(matches!(err, FlowError::UnknownDriver(99)));

        directory
            .add_driver(Driver::normalize(99, Some("Petro"), None))
            .await
            .unwrap();
        registry.assign_driver(&id, 99).await.unwrap();
    }

    #[tokio::test]
    async fn reassignment_moves_trip_between_itineraries() {
        let (directory, registry) = setup();
        let id = trip(10, 8);
        directory.add_driver(Driver::normalize(1, None, None)).await.unwrap();
        directory.add_driver(Driver::normalize(2, None, None)).await.unwrap();

        let window = (id.date - chrono::Duration::days(1), id.date + chrono::Duration::days(7));

        registry.assign_driver(&id, 1).await.unwrap();
        assert_eq!(registry.driver_trips(1, window.0, window.1).await.len(), 1);

        // Last write wins; no merge.
        registry.assign_driver(&id, 2).await.unwrap();
        assert!(registry.driver_trips(1, window.0, window.1).await.is_empty());
        assert_eq!(registry.driver_trips(2, window.0, window.1).await.len(), 1);
    }

    #[tokio::test]
    async fn itinerary_windowed_and_sorted() {
        let (directory, registry) = setup();
        directory.add_driver(Driver::normalize(5, None, None)).await.unwrap();

        let inside_late = trip(12, 14);
        let inside_early = trip(12, 6);
        let earlier_day = trip(11, 17);
        let outside = trip(25, 8);
        for id in [&inside_late, &inside_early, &earlier_day, &outside] {
            registry.assign_driver(id, 5).await.unwrap();
        }

        let from = NaiveDate::from_ymd_opt(2026, 8, 10).unwrap();
        let to = NaiveDate::from_ymd_opt(2026, 8, 18).unwrap();
        let trips: Vec<TripId> = registry
            .driver_trips(5, from, to)
            .await
            .into_iter()
            .map(|s| s.trip)
            .collect();
        assert_eq!(trips, vec![earlier_day, inside_early, inside_late]);
    }

    #[tokio::test]
    async fn lock_survives_assignment() {
        let (directory, registry) = setup();
        directory.add_driver(Driver::normalize(3, None, None)).await.unwrap();
        let id = trip(10, 8);

        registry.lock(&id).await.unwrap();
        registry.assign_driver(&id, 3).await.unwrap();
        assert!(registry.is_locked(&id).await);
    }
}
