use chrono::{NaiveDate, NaiveTime};

use routa_core::schedule;
use routa_core::session::{Session, SessionState};
use routa_core::trip::Direction;
use routa_core::FlowResult;

use super::FlowCtx;
use crate::prompts;
use crate::transport::Reply;

// Slot locking: date → direction → time → lock/unlock toggle. Admin-only.
// A locked departure rejects new bookings for every role.

pub async fn start(ctx: &FlowCtx<'_>, session: &mut Session) -> FlowResult<Reply> {
    ctx.require_admin()?;
    session.reset();
    session.state = SessionState::LockDate;
    let dates = schedule::staff_dates(ctx.now.date());
    Ok(Reply::new("Pick the trip date:", prompts::dates_keyboard(&dates, prompts::BTN_HOME)))
}

pub async fn date(ctx: &FlowCtx<'_>, session: &mut Session, text: &str) -> FlowResult<Reply> {
    let offered = schedule::staff_dates(ctx.now.date());
    let parsed = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok();
    let Some(date) = parsed.filter(|d| offered.contains(d)) else {
        return Ok(Reply::new(
            "Pick a date from the buttons.",
            prompts::dates_keyboard(&offered, prompts::BTN_HOME),
        ));
    };
    session.draft.date = Some(date);
    session.state = SessionState::LockDirection;
    Ok(Reply::new("Pick a direction:", prompts::directions_keyboard(prompts::BTN_HOME)))
}

pub async fn direction(ctx: &FlowCtx<'_>, session: &mut Session, text: &str) -> FlowResult<Reply> {
    let Some(direction) = Direction::parse(text) else {
        return Ok(Reply::new(
            "Pick a direction from the buttons.",
            prompts::directions_keyboard(prompts::BTN_HOME),
        ));
    };
    session.draft.direction = Some(direction);
    session.state = SessionState::LockTime;
    let times = schedule::base_times(direction);
    Ok(Reply::new("Pick a time:", prompts::times_keyboard(&times, prompts::BTN_HOME)))
}

pub async fn time(ctx: &FlowCtx<'_>, session: &mut Session, text: &str) -> FlowResult<Reply> {
    let direction = session.draft.direction()?;
    let times = schedule::base_times(direction);
    let parsed = NaiveTime::parse_from_str(text, "%H:%M").ok();
    let Some(time) = parsed.filter(|t| times.contains(t)) else {
        return Ok(Reply::new(
            "Pick a time from the buttons.",
            prompts::times_keyboard(&times, prompts::BTN_HOME),
        ));
    };

    session.draft.time = Some(time);
    session.state = SessionState::LockAction;

    let trip = session.draft.trip()?;
    let status = if ctx.app.registry.is_locked(&trip).await { "locked" } else { "open" };
    Ok(Reply::new(
        format!("Departure {} is currently {}.", trip, status),
        prompts::lock_action_keyboard(),
    ))
}

pub async fn action(ctx: &FlowCtx<'_>, session: &mut Session, text: &str) -> FlowResult<Reply> {
    let trip = session.draft.trip()?;
    let reply_text = match text {
        prompts::BTN_DO_LOCK => {
            ctx.app.registry.lock(&trip).await?;
            format!("Departure {} locked for new bookings.", trip)
        }
        prompts::BTN_DO_UNLOCK => {
            ctx.app.registry.unlock(&trip).await?;
            format!("Departure {} reopened for bookings.", trip)
        }
        _ => {
            return Ok(Reply::new(
                "Pick an action from the buttons.",
                prompts::lock_action_keyboard(),
            ));
        }
    };
    session.reset();
    Ok(Reply::new(reply_text, ctx.main_menu()))
}
