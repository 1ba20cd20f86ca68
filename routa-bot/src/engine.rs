use chrono::NaiveDateTime;
use tracing::{debug, warn};

use routa_core::session::{Session, SessionState};
use routa_core::{FlowError, FlowResult};

use crate::flow::{self, FlowCtx};
use crate::prompts;
use crate::state::AppState;
use crate::transport::{EventPayload, InboundEvent, Reply};

/// The conversational engine: one call per inbound event. Looks up (or
/// creates) the participant's session, routes the payload, persists the
/// session, and returns the prompt to render. Never fails: every error in
/// the taxonomy maps to a per-interaction reply.
pub struct Engine {
    app: AppState,
}

impl Engine {
    pub fn new(app: AppState) -> Self {
        Self { app }
    }

    pub fn app(&self) -> &AppState {
        &self.app
    }

    pub async fn handle(&self, event: &InboundEvent) -> Reply {
        self.handle_at(event, chrono::Local::now().naive_local()).await
    }

    /// Deterministic-clock entry point; `handle` feeds it the wall clock.
    pub async fn handle_at(&self, event: &InboundEvent, now: NaiveDateTime) -> Reply {
        let role = self.app.directory.role_of(event.participant).await;
        let mut session = self
            .app
            .sessions
            .load_session(event.participant)
            .await
            .unwrap_or_else(|| Session::new(event.participant));

        let ctx = FlowCtx { app: &self.app, role, now };
        let result = route(&ctx, &mut session, &event.payload).await;
        let mut reply = match result {
            Ok(reply) => reply,
            Err(err) => error_reply(err, &ctx, &mut session),
        };
        reply.state = session.state;

        if let Err(err) = self.app.sessions.save_session(&session).await {
            warn!("Failed to persist session for {}: {}", event.participant, err);
        }
        debug!("{} -> {:?}", event.participant, session.state);
        reply
    }
}

/// Universal inputs first (/start, cancel, home, and the menu entries all
/// work from any state, each flow entry re-checking the acting role), then
/// the state table.
async fn route(
    ctx: &FlowCtx<'_>,
    session: &mut Session,
    payload: &EventPayload,
) -> FlowResult<Reply> {
    if let EventPayload::Text(text) = payload {
        let text = text.trim();
        match text {
            "/start" => return start(ctx, session).await,
            prompts::BTN_CANCEL => return cancel(ctx, session),
            prompts::BTN_HOME if ctx.is_staff() => return home(ctx, session),
            prompts::BTN_BOOK => return flow::booking::start(ctx, session, false).await,
            prompts::BTN_MY_BOOKINGS => return flow::booking::my_bookings(ctx, session).await,
            prompts::BTN_STAFF_PANEL => return flow::staff::panel(ctx, session).await,
            prompts::BTN_INSPECT => return flow::inspect::start_inspect(ctx, session).await,
            prompts::BTN_MANUAL_BOOKING => return flow::booking::start(ctx, session, true).await,
            prompts::BTN_MY_TRIPS => return flow::staff::my_trips(ctx, session).await,
            prompts::BTN_LOOKUP => return flow::inspect::start_lookup(ctx, session).await,
            prompts::BTN_MANAGE_ROUTES => return flow::assign::start(ctx, session).await,
            prompts::BTN_MANAGE_DRIVERS => return flow::manage::start_drivers(ctx, session).await,
            prompts::BTN_MANAGE_ADMINS => return flow::manage::start_admins(ctx, session).await,
            prompts::BTN_LOCK_TRIP => return flow::locking::start(ctx, session).await,
            _ => {
                if session.state == SessionState::Idle {
                    if let Some(rest) = text.strip_prefix(prompts::CANCEL_BOOKING_PREFIX) {
                        return flow::booking::cancel_booking(ctx, session, rest).await;
                    }
                }
            }
        }
    }
    flow::dispatch(ctx, session, payload).await
}

async fn start(ctx: &FlowCtx<'_>, session: &mut Session) -> FlowResult<Reply> {
    ctx.app.ledger.ensure_account(session.participant).await?;
    session.reset();
    Ok(Reply::new(
        "Welcome to the Kyiv ↔ Rokytne shuttle booking service!",
        ctx.main_menu(),
    ))
}

/// Cancel discards the whole flow with an acknowledgment; home is neutral
/// navigation back to the menu. The two are deliberately distinct.
fn cancel(ctx: &FlowCtx<'_>, session: &mut Session) -> FlowResult<Reply> {
    if session.state == SessionState::Idle {
        return Ok(Reply::new("Nothing to cancel.", ctx.main_menu()));
    }
    session.reset();
    Ok(Reply::new("Action cancelled.", ctx.main_menu()))
}

fn home(ctx: &FlowCtx<'_>, session: &mut Session) -> FlowResult<Reply> {
    session.reset();
    Ok(Reply::new("Main menu.", ctx.main_menu()))
}

fn error_reply(err: FlowError, ctx: &FlowCtx<'_>, session: &mut Session) -> Reply {
    match err {
        FlowError::Validation(message) => Reply::new(message, vec![]),
        FlowError::PermissionDenied => Reply::new(
            "Access restricted to drivers and administrators.",
            ctx.main_menu(),
        ),
        FlowError::NotFound => Reply::new("Booking not found.", ctx.main_menu()),
        FlowError::UnknownDriver(id) => {
            Reply::new(format!("{} is not on the driver list.", id), vec![])
        }
        FlowError::SlotLocked(trip) => {
            session.reset();
            Reply::new(
                format!("Departure {} is locked for new bookings.", trip),
                ctx.main_menu(),
            )
        }
        FlowError::StaleSession => {
            session.reset();
            Reply::new("Something went out of sync, let's start over.", ctx.main_menu())
        }
        FlowError::Store(message) => {
            warn!("Store failure surfaced to participant: {}", message);
            Reply::new("Temporary storage problem, please try again.", vec![])
        }
    }
}
