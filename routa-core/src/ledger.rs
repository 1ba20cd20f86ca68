use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use uuid::Uuid;

use crate::booking::{Booking, BookingDraft};
use crate::directory::Role;
use crate::registry::TripRegistry;
use crate::repository::BookingStore;
use crate::schedule;
use crate::sync::KeyedMutex;
use crate::trip::TripId;
use crate::{FlowError, FlowResult};

/// Owns all booking records. Single write path (`finalize`), per-owner
/// serialization, lazy eviction of departed bookings on read.
pub struct BookingLedger {
    store: Arc<dyn BookingStore>,
    registry: Arc<TripRegistry>,
    locks: KeyedMutex,
}

impl BookingLedger {
    pub fn new(store: Arc<dyn BookingStore>, registry: Arc<TripRegistry>) -> Self {
        Self { store, registry, locks: KeyedMutex::new() }
    }

    /// Commits a fully captured draft. A locked slot rejects every role,
    /// independent of cutoff; a passenger-role commit additionally requires
    /// the departure to still be visible under the cutoff filter. The lock
    /// check happens inside the critical section, so a slot locked before
    /// this call is always observed as locked.
    pub async fn finalize(
        &self,
        owner: i64,
        draft: BookingDraft,
        role: Role,
        now: NaiveDateTime,
    ) -> FlowResult<Booking> {
        let entry = self.locks.entry(&owner.to_string());
        let _held = entry.lock().await;

        if draft.seats == 0 {
            return Err(FlowError::Validation("seat count must be at least 1".into()));
        }
        if self.registry.is_locked(&draft.trip).await {
            return Err(FlowError::SlotLocked(draft.trip));
        }
        let visible =
            schedule::visible_times(draft.trip.direction, draft.trip.date, role, now);
        if !visible.contains(&draft.trip.time) {
            return Err(FlowError::Validation(
                "that departure is no longer available".into(),
            ));
        }

        let booking = Booking {
            id: Uuid::new_v4(),
            owner,
            trip: draft.trip,
            seats: draft.seats,
            phone: draft.phone,
            comment: draft.comment,
            created_by_driver: draft.created_by_driver,
            driver_id: draft.driver_id,
            created_at: Utc::now(),
        };

        let mut account = self.store.load_account(owner).await;
        account.bookings.push(booking.clone());
        self.store.save_account(owner, &account).await.map_err(FlowError::store)?;

        tracing::info!(
            "Booking finalized: owner={} trip={} seats={}",
            owner,
            booking.trip,
            booking.seats
        );
        Ok(booking)
    }

    /// Upcoming bookings for one owner. Departed entries are pruned and the
    /// pruned collection is persisted back; callers must expect this read
    /// to mutate stored state.
    pub async fn list_upcoming(&self, owner: i64, now: NaiveDateTime) -> Vec<Booking> {
        let entry = self.locks.entry(&owner.to_string());
        let _held = entry.lock().await;

        let mut account = self.store.load_account(owner).await;
        let before = account.bookings.len();
        account.bookings.retain(|b| b.trip.departure() > now);
        if account.bookings.len() != before {
            if let Err(err) = self.store.save_account(owner, &account).await {
                tracing::warn!("Failed to persist pruned bookings for {}: {}", owner, err);
            }
        }
        account.bookings
    }

    /// Removes the first booking matching the trip identity exactly. A
    /// missing booking is a no-op with a false result, never an error.
    pub async fn cancel(&self, owner: i64, trip: &TripId) -> FlowResult<bool> {
        let entry = self.locks.entry(&owner.to_string());
        let _held = entry.lock().await;

        let mut account = self.store.load_account(owner).await;
        let Some(index) = account.bookings.iter().position(|b| b.trip == *trip) else {
            return Ok(false);
        };
        account.bookings.remove(index);
        self.store.save_account(owner, &account).await.map_err(FlowError::store)?;
        tracing::info!("Booking cancelled: owner={} trip={}", owner, trip);
        Ok(true)
    }

    /// All bookings for one departure across every owner, sorted by creation
    /// time, plus the total seat count.
    pub async fn manifest(&self, trip: &TripId) -> (Vec<Booking>, u32) {
        let mut matching: Vec<Booking> = Vec::new();
        for (_, account) in self.store.all_accounts().await {
            matching.extend(account.bookings.into_iter().filter(|b| b.trip == *trip));
        }
        matching.sort_by_key(|b| b.created_at);
        let total = matching.iter().map(|b| b.seats).sum();
        (matching, total)
    }

    /// Phone-on-file for self-service flows.
    pub async fn phone_on_file(&self, owner: i64) -> Option<String> {
        self.store.load_account(owner).await.phone
    }

    /// Caches a captured contact for future bookings.
    pub async fn remember_phone(&self, owner: i64, phone: &str) -> FlowResult<()> {
        let entry = self.locks.entry(&owner.to_string());
        let _held = entry.lock().await;

        let mut account = self.store.load_account(owner).await;
        account.phone = Some(phone.to_string());
        self.store.save_account(owner, &account).await.map_err(FlowError::store)
    }

    /// Makes sure the account record exists; called on first greeting.
    pub async fn ensure_account(&self, owner: i64) -> FlowResult<()> {
        let entry = self.locks.entry(&owner.to_string());
        let _held = entry.lock().await;

        let account = self.store.load_account(owner).await;
        self.store.save_account(owner, &account).await.map_err(FlowError::store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::DirectoryService;
    use crate::testutil::MockStore;
    use crate::trip::Direction;
    use chrono::{NaiveDate, NaiveTime};

    fn services() -> (Arc<MockStore>, Arc<TripRegistry>, BookingLedger) {
        let store = Arc::new(MockStore::default());
        let directory = Arc::new(DirectoryService::new(store.clone()));
        let registry = Arc::new(TripRegistry::new(store.clone(), directory));
        let ledger = BookingLedger::new(store.clone(), registry.clone());
        (store, registry, ledger)
    }

    fn trip() -> TripId {
        TripId::new(
            NaiveDate::from_ymd_opt(2026, 8, 10).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            Direction::KyivToRokytne,
        )
    }

    fn draft(trip: TripId, seats: u32) -> BookingDraft {
        BookingDraft {
            trip,
            seats,
            phone: "+380501112233".into(),
            comment: "Pivdenna bus station".into(),
            created_by_driver: false,
            driver_id: None,
        }
    }

    fn day_before(trip: &TripId) -> NaiveDateTime {
        (trip.date - chrono::Duration::days(1)).and_time(trip.time)
    }

    #[tokio::test]
    async fn finalize_appends_and_returns_record() {
        let (_, _, ledger) = services();
        let trip = trip();
        let now = day_before(&trip);

        let booking = ledger.finalize(1, draft(trip, 2), Role::Passenger, now).await.unwrap();
        assert_eq!(booking.seats, 2);
        assert_eq!(booking.trip, trip);
        assert!(!booking.created_by_driver);

        let upcoming = ledger.list_upcoming(1, now).await;
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].id, booking.id);
    }

    #[tokio::test]
    async fn locked_slot_rejects_every_role() {
        let (_, registry, ledger) = services();
        let trip = trip();
        let now = day_before(&trip);

        registry.lock(&trip).await.unwrap();
        for role in [Role::Passenger, Role::Driver, Role::Admin] {
            let err = ledger.finalize(1, draft(trip, 1), role, now).await.unwrap_err();
            assert!(matches!(err, FlowError::SlotLocked(t) if t == trip));
        }
        assert!(ledger.list_upcoming(1, now).await.is_empty());

        registry.unlock(&trip).await.unwrap();
        assert!(ledger.finalize(1, draft(trip, 1), Role::Passenger, now).await.is_ok());
    }

    #[tokio::test]
    async fn passenger_cutoff_enforced_at_finalize() {
        let (_, _, ledger) = services();
        let trip = trip();
        // Ten minutes before departure: inside the cutoff.
        let now = trip.departure() - chrono::Duration::minutes(10);

        let err = ledger.finalize(1, draft(trip, 1), Role::Passenger, now).await.unwrap_err();
        assert!(matches!(err, FlowError::Validation(_)));

        // Same instant is fine for a driver-proxy commit.
        assert!(ledger.finalize(1, draft(trip, 1), Role::Driver, now).await.is_ok());
    }

    #[tokio::test]
    async fn zero_seats_rejected() {
        let (_, _, ledger) = services();
        let trip = trip();
        let err = ledger
            .finalize(1, draft(trip, 0), Role::Passenger, day_before(&trip))
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::Validation(_)));
    }

    #[tokio::test]
    async fn cancel_is_effectful_once_then_safe() {
        let (_, _, ledger) = services();
        let trip = trip();
        let now = day_before(&trip);
        ledger.finalize(5, draft(trip, 1), Role::Passenger, now).await.unwrap();

        assert!(ledger.cancel(5, &trip).await.unwrap());
        assert!(!ledger.cancel(5, &trip).await.unwrap());
        assert!(ledger.list_upcoming(5, now).await.is_empty());
    }

    #[tokio::test]
    async fn list_upcoming_prunes_and_is_stable() {
        let (store, _, ledger) = services();
        let trip = trip();
        let now = day_before(&trip);
        ledger.finalize(9, draft(trip, 2), Role::Passenger, now).await.unwrap();

        // After departure the booking is pruned and the pruned collection
        // persisted back.
        let later = trip.departure() + chrono::Duration::minutes(1);
        assert!(ledger.list_upcoming(9, later).await.is_empty());
        assert!(store.load_account(9).await.bookings.is_empty());

        // Repeated call with no new bookings returns the same pruned set.
        assert!(ledger.list_upcoming(9, later).await.is_empty());
    }

    #[tokio::test]
    async fn manifest_spans_owners_sorted_by_creation() {
        let (_, _, ledger) = services();
        let trip = trip();
        let now = day_before(&trip);

        ledger.finalize(1, draft(trip, 2), Role::Passenger, now).await.unwrap();
        ledger.finalize(2, draft(trip, 3), Role::Passenger, now).await.unwrap();
        // A booking for a different departure must not leak in.
        let other = TripId::new(trip.date, trip.time, Direction::RokytneToKyiv);
        ledger.finalize(3, draft(other, 1), Role::Passenger, now).await.unwrap();

        let (bookings, total) = ledger.manifest(&trip).await;
        assert_eq!(bookings.len(), 2);
        assert_eq!(total, 5);
        assert!(bookings[0].created_at <= bookings[1].created_at);
        assert_eq!(bookings[0].owner, 1);
        assert_eq!(bookings[1].owner, 2);
    }

    #[tokio::test]
    async fn concurrent_finalizes_for_one_owner_keep_both() {
        let (_, _, ledger) = services();
        let ledger = Arc::new(ledger);
        let trip = trip();
        let now = day_before(&trip);

        let other = TripId::new(
            trip.date,
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            trip.direction,
        );

        let first = {
            let ledger = ledger.clone();
            tokio::spawn(async move {
                ledger.finalize(7, draft(trip, 1), Role::Passenger, now).await
            })
        };
        let second = {
            let ledger = ledger.clone();
            tokio::spawn(async move {
                ledger.finalize(7, draft(other, 2), Role::Passenger, now).await
            })
        };
        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();

        assert_eq!(ledger.list_upcoming(7, now).await.len(), 2);
    }

    #[tokio::test]
    async fn phone_on_file_round_trip() {
        let (_, _, ledger) = services();
        assert!(ledger.phone_on_file(11).await.is_none());
        ledger.remember_phone(11, "+380671234567").await.unwrap();
        assert_eq!(ledger.phone_on_file(11).await.as_deref(), Some("+380671234567"));
    }
}
