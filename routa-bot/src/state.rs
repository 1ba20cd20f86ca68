use std::sync::Arc;

use routa_core::directory::DirectoryService;
use routa_core::ledger::BookingLedger;
use routa_core::registry::TripRegistry;
use routa_core::repository::{BookingStore, DirectoryStore, SessionStore, TripSlotStore};
use routa_store::app_config::BookingRules;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<dyn SessionStore>,
    pub ledger: Arc<BookingLedger>,
    pub registry: Arc<TripRegistry>,
    pub directory: Arc<DirectoryService>,
    pub rules: BookingRules,
}

impl AppState {
    /// Wires the shared services over one store backend. Any type carrying
    /// all four store contracts works: the in-memory store for tests and
    /// development, Redis in production.
    pub fn build<S>(store: Arc<S>, rules: BookingRules) -> Self
    where
        S: SessionStore + BookingStore + TripSlotStore + DirectoryStore + 'static,
    {
        let directory = Arc::new(DirectoryService::new(store.clone()));
        let registry = Arc::new(TripRegistry::new(store.clone(), directory.clone()));
        let ledger = Arc::new(BookingLedger::new(store.clone(), registry.clone()));
        Self { sessions: store, ledger, registry, directory, rules }
    }
}
