pub mod assign;
pub mod booking;
pub mod inspect;
pub mod locking;
pub mod manage;
pub mod staff;

use chrono::NaiveDateTime;

use routa_core::directory::Role;
use routa_core::session::{Session, SessionState};
use routa_core::{FlowError, FlowResult};

use crate::prompts;
use crate::state::AppState;
use crate::transport::{EventPayload, Reply};

/// Per-call context: the shared services, the acting identity's role as
/// resolved at event time, and the clock instant the whole call reasons with.
pub struct FlowCtx<'a> {
    pub app: &'a AppState,
    pub role: Role,
    pub now: NaiveDateTime,
}

impl FlowCtx<'_> {
    pub fn is_staff(&self) -> bool {
        matches!(self.role, Role::Driver | Role::Admin)
    }

    /// Flow-entry capability checks, invoked uniformly instead of per-handler
    /// ad hoc role matching. They run at entry time, so a menu rendered for a
    /// since-demoted identity still gets rejected.
    pub fn require_staff(&self) -> FlowResult<()> {
        if self.is_staff() {
            Ok(())
        } else {
            Err(FlowError::PermissionDenied)
        }
    }

    pub fn require_admin(&self) -> FlowResult<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(FlowError::PermissionDenied)
        }
    }

    pub fn main_menu(&self) -> Vec<Vec<String>> {
        prompts::main_menu(self.is_staff())
    }
}

/// Free text of the payload; structured payloads arriving in a text state get
/// a re-prompt without a state change.
pub fn text_of(payload: &EventPayload) -> FlowResult<&str> {
    match payload {
        EventPayload::Text(text) => Ok(text.trim()),
        _ => Err(FlowError::Validation("Please answer with text or the buttons.".into())),
    }
}

/// The state table: every waiting state routed to its handler. Universal
/// inputs (/start, cancel, home, menu entries) are intercepted by the engine
/// before this runs.
pub async fn dispatch(
    ctx: &FlowCtx<'_>,
    session: &mut Session,
    payload: &EventPayload,
) -> FlowResult<Reply> {
    use SessionState::*;
    match session.state {
        Idle => Ok(Reply::new("Choose an action from the menu.", ctx.main_menu())),

        AwaitingSeats => booking::seats(ctx, session, text_of(payload)?).await,
        AwaitingDate => booking::date(ctx, session, text_of(payload)?).await,
        AwaitingDirection => booking::direction(ctx, session, text_of(payload)?).await,
        AwaitingTime => booking::time(ctx, session, text_of(payload)?).await,
        AwaitingBoardingNote => booking::boarding_note(ctx, session, text_of(payload)?).await,
        AwaitingPhone => booking::phone(ctx, session, payload).await,
        AwaitingDriverContact => booking::driver_contact(ctx, session, text_of(payload)?).await,

        InspectDirection => inspect::inspect_direction(ctx, session, text_of(payload)?).await,
        InspectDate => inspect::inspect_date(ctx, session, text_of(payload)?).await,
        InspectTime => inspect::inspect_time(ctx, session, text_of(payload)?).await,

        LookupDate => inspect::lookup_date(ctx, session, text_of(payload)?).await,
        LookupDirection => inspect::lookup_direction(ctx, session, text_of(payload)?).await,
        LookupTime => inspect::lookup_time(ctx, session, text_of(payload)?).await,

        DriverMenu => manage::driver_menu(ctx, session, text_of(payload)?).await,
        AwaitingNewDriver => manage::new_driver(ctx, session, payload).await,
        AwaitingRemoveDriver => manage::remove_driver(ctx, session, text_of(payload)?).await,

        AdminMenu => manage::admin_menu(ctx, session, text_of(payload)?).await,
        AwaitingNewAdmin => manage::new_admin(ctx, session, payload).await,
        AwaitingRemoveAdmin => manage::remove_admin(ctx, session, text_of(payload)?).await,

        AssignDate => assign::date(ctx, session, text_of(payload)?).await,
        AssignDirection => assign::direction(ctx, session, text_of(payload)?).await,
        AssignTime => assign::time(ctx, session, text_of(payload)?).await,
        AssignDriver => assign::driver(ctx, session, text_of(payload)?).await,

        LockDate => locking::date(ctx, session, text_of(payload)?).await,
        LockDirection => locking::direction(ctx, session, text_of(payload)?).await,
        LockTime => locking::time(ctx, session, text_of(payload)?).await,
        LockAction => locking::action(ctx, session, text_of(payload)?).await,
    }
}
