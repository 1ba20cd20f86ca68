use chrono::{NaiveDate, NaiveTime};

use routa_core::schedule;
use routa_core::session::{Session, SessionState};
use routa_core::trip::Direction;
use routa_core::FlowResult;

use super::FlowCtx;
use crate::prompts;
use crate::transport::Reply;

// Route assignment: date → direction → time → driver. Admin-only.

pub async fn start(ctx: &FlowCtx<'_>, session: &mut Session) -> FlowResult<Reply> {
    ctx.require_admin()?;
    session.reset();
    session.state = SessionState::AssignDate;
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
    session.state = SessionState::AssignDirection;
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
    session.state = SessionState::AssignTime;
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

    let drivers = ctx.app.directory.drivers().await;
    if drivers.is_empty() {
        session.reset();
        return Ok(Reply::new(
            "No drivers on file. Add one under Manage drivers first.",
            ctx.main_menu(),
        ));
    }

    session.draft.time = Some(time);
    session.state = SessionState::AssignDriver;

    let mut text = String::from("Pick the driver to assign:\n");
    for d in &drivers {
        text.push_str(&format!("• {} — {} ({})\n", d.id, d.name, d.phone));
    }
    let mut keyboard = prompts::rows_of(drivers.iter().map(|d| d.id.to_string()).collect(), 3);
    keyboard.push(vec![prompts::BTN_HOME.to_string()]);
    Ok(Reply::new(text, keyboard))
}

pub async fn driver(ctx: &FlowCtx<'_>, session: &mut Session, text: &str) -> FlowResult<Reply> {
    let Ok(driver_id) = text.parse::<i64>() else {
        return Ok(Reply::new(
            "Enter a numeric driver id.",
            vec![vec![prompts::BTN_HOME.to_string()]],
        ));
    };

    let trip = session.draft.trip()?;
    // UnknownDriver bubbles with the state unchanged, so the admin can pick
    // again from the listed ids.
    ctx.app.registry.assign_driver(&trip, driver_id).await?;

    session.reset();
    Ok(Reply::new(format!("Driver {} assigned to {}.", driver_id, trip), ctx.main_menu()))
}
