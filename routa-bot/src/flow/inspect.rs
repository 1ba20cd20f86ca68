use chrono::{NaiveDate, NaiveTime};

use routa_core::schedule;
use routa_core::session::{Session, SessionState};
use routa_core::trip::{Direction, TripId};
use routa_core::FlowResult;

use super::FlowCtx;
use crate::prompts;
use crate::transport::Reply;

// Two staff views over the same manifest: inspection walks
// direction → date → time, manual lookup walks date → direction → time.
// Both see the unfiltered timetable.

pub async fn start_inspect(ctx: &FlowCtx<'_>, session: &mut Session) -> FlowResult<Reply> {
    ctx.require_staff()?;
    session.reset();
    session.state = SessionState::InspectDirection;
    Ok(Reply::new("Pick a direction:", prompts::directions_keyboard(prompts::BTN_HOME)))
}

pub async fn inspect_direction(
    ctx: &FlowCtx<'_>,
    session: &mut Session,
    text: &str,
) -> FlowResult<Reply> {
    let Some(direction) = Direction::parse(text) else {
        return Ok(Reply::new(
            "Pick a direction from the buttons.",
            prompts::directions_keyboard(prompts::BTN_HOME),
        ));
    };
    session.draft.direction = Some(direction);
    session.state = SessionState::InspectDate;
    let dates = schedule::staff_dates(ctx.now.date());
    Ok(Reply::new("Pick the trip date:", prompts::dates_keyboard(&dates, prompts::BTN_HOME)))
}

pub async fn inspect_date(ctx: &FlowCtx<'_>, session: &mut Session, text: &str) -> FlowResult<Reply> {
    let offered = schedule::staff_dates(ctx.now.date());
    let parsed = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok();
    let Some(date) = parsed.filter(|d| offered.contains(d)) else {
        return Ok(Reply::new(
            "Pick a date from the buttons.",
            prompts::dates_keyboard(&offered, prompts::BTN_HOME),
        ));
    };
    session.draft.date = Some(date);
    session.state = SessionState::InspectTime;
    let times = schedule::base_times(session.draft.direction()?);
    Ok(Reply::new("Pick a time:", prompts::times_keyboard(&times, prompts::BTN_HOME)))
}

pub async fn inspect_time(ctx: &FlowCtx<'_>, session: &mut Session, text: &str) -> FlowResult<Reply> {
    let direction = session.draft.direction()?;
    let times = schedule::base_times(direction);
    let parsed = NaiveTime::parse_from_str(text, "%H:%M").ok();
    let Some(time) = parsed.filter(|t| times.contains(t)) else {
        return Ok(Reply::new(
            "Pick a time from the buttons.",
            prompts::times_keyboard(&times, prompts::BTN_HOME),
        ));
    };
    let trip = TripId::new(session.draft.date()?, time, direction);
    render_manifest(ctx, session, trip).await
}

pub async fn start_lookup(ctx: &FlowCtx<'_>, session: &mut Session) -> FlowResult<Reply> {
    ctx.require_staff()?;
    session.reset();
    session.state = SessionState::LookupDate;
    let dates = schedule::staff_dates(ctx.now.date());
    Ok(Reply::new("Pick a date:", prompts::dates_keyboard(&dates, prompts::BTN_HOME)))
}

pub async fn lookup_date(ctx: &FlowCtx<'_>, session: &mut Session, text: &str) -> FlowResult<Reply> {
    let offered = schedule::staff_dates(ctx.now.date());
    let parsed = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok();
    let Some(date) = parsed.filter(|d| offered.contains(d)) else {
        return Ok(Reply::new(
            "Pick a date from the buttons.",
            prompts::dates_keyboard(&offered, prompts::BTN_HOME),
        ));
    };
    session.draft.date = Some(date);
    session.state = SessionState::LookupDirection;
    Ok(Reply::new("Pick a direction:", prompts::directions_keyboard(prompts::BTN_HOME)))
}

pub async fn lookup_direction(
    ctx: &FlowCtx<'_>,
    session: &mut Session,
    text: &str,
) -> FlowResult<Reply> {
    let Some(direction) = Direction::parse(text) else {
        return Ok(Reply::new(
            "Pick a direction from the buttons.",
            prompts::directions_keyboard(prompts::BTN_HOME),
        ));
    };
    session.draft.direction = Some(direction);
    session.state = SessionState::LookupTime;
    let times = schedule::base_times(direction);
    Ok(Reply::new("Pick a time:", prompts::times_keyboard(&times, prompts::BTN_HOME)))
}

pub async fn lookup_time(ctx: &FlowCtx<'_>, session: &mut Session, text: &str) -> FlowResult<Reply> {
    let direction = session.draft.direction()?;
    let times = schedule::base_times(direction);
    let parsed = NaiveTime::parse_from_str(text, "%H:%M").ok();
    let Some(time) = parsed.filter(|t| times.contains(t)) else {
        return Ok(Reply::new(
            "Pick a time from the buttons.",
            prompts::times_keyboard(&times, prompts::BTN_HOME),
        ));
    };
    let trip = TripId::new(session.draft.date()?, time, direction);
    render_manifest(ctx, session, trip).await
}

async fn render_manifest(ctx: &FlowCtx<'_>, session: &mut Session, trip: TripId) -> FlowResult<Reply> {
    let (bookings, total) = ctx.app.ledger.manifest(&trip).await;
    session.reset();
    if bookings.is_empty() {
        return Ok(Reply::new("No bookings for this departure.", ctx.main_menu()));
    }
    Ok(Reply::new(prompts::manifest_text(&trip, &bookings, total), ctx.main_menu()))
}
