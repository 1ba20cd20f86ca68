use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::trip::{Direction, TripId};
use crate::{FlowError, FlowResult};

/// Every waiting point of every conversational flow. One flat enum so the
/// dispatch table is explicit and testable without a live transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Idle,

    // Booking (self-service and driver-proxy, distinguished by the draft's
    // driver_mode flag).
    AwaitingSeats,
    AwaitingDate,
    AwaitingDirection,
    AwaitingTime,
    AwaitingBoardingNote,
    AwaitingPhone,
    AwaitingDriverContact,

    // Trip inspection: direction → date → time → manifest.
    InspectDirection,
    InspectDate,
    InspectTime,

    // Manual trip lookup: date → direction → time → manifest.
    LookupDate,
    LookupDirection,
    LookupTime,

    // Driver set management.
    DriverMenu,
    AwaitingNewDriver,
    AwaitingRemoveDriver,

    // Admin set management.
    AdminMenu,
    AwaitingNewAdmin,
    AwaitingRemoveAdmin,

    // Route assignment: date → direction → time → driver.
    AssignDate,
    AssignDirection,
    AssignTime,
    AssignDriver,

    // Slot locking: date → direction → time → lock/unlock.
    LockDate,
    LockDirection,
    LockTime,
    LockAction,
}

/// In-progress, uncommitted fields accumulated across a flow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Draft {
    pub seats: Option<u32>,
    pub date: Option<NaiveDate>,
    pub direction: Option<Direction>,
    pub time: Option<NaiveTime>,
    pub comment: Option<String>,
    /// True when a driver books on a passenger's behalf.
    pub driver_mode: bool,
}

impl Draft {
    // A handler reached with its prerequisite fields missing means the
    // session went stale (restart, crash, reordered input); accessors
    // surface that as StaleSession for a defensive reset.

    pub fn seats(&self) -> FlowResult<u32> {
        self.seats.ok_or(FlowError::StaleSession)
    }

    pub fn date(&self) -> FlowResult<NaiveDate> {
        self.date.ok_or(FlowError::StaleSession)
    }

    pub fn direction(&self) -> FlowResult<Direction> {
        self.direction.ok_or(FlowError::StaleSession)
    }

    pub fn time(&self) -> FlowResult<NaiveTime> {
        self.time.ok_or(FlowError::StaleSession)
    }

    pub fn comment(&self) -> FlowResult<&str> {
        self.comment.as_deref().ok_or(FlowError::StaleSession)
    }

    pub fn trip(&self) -> FlowResult<TripId> {
        Ok(TripId::new(self.date()?, self.time()?, self.direction()?))
    }
}

/// One session per participant; created on first interaction, reset on
/// completion, cancellation, or home navigation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub participant: i64,
    pub state: SessionState,
    pub draft: Draft,
}

impl Session {
    pub fn new(participant: i64) -> Self {
        Self { participant, state: SessionState::Idle, draft: Draft::default() }
    }

    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.draft = Draft::default();
    }
}
