pub mod booking;
pub mod directory;
pub mod ledger;
pub mod registry;
pub mod repository;
pub mod schedule;
pub mod session;
pub mod sync;
pub mod trip;

#[cfg(test)]
pub(crate) mod testutil;

use trip::TripId;

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Permission denied")]
    PermissionDenied,
    #[error("Not found")]
    NotFound,
    #[error("Unknown driver: {0}")]
    UnknownDriver(i64),
    #[error("Departure is locked: {0}")]
    SlotLocked(TripId),
    #[error("Session is missing required draft fields")]
    StaleSession,
    #[error("Store error: {0}")]
    Store(String),
}

pub type FlowResult<T> = Result<T, FlowError>;

impl FlowError {
    pub fn store<E: std::fmt::Display>(err: E) -> Self {
        FlowError::Store(err.to_string())
    }
}
