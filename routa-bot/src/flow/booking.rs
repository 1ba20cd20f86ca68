use chrono::{NaiveDate, NaiveTime};
use tracing::debug;

use routa_core::booking::BookingDraft;
use routa_core::directory::Role;
use routa_core::schedule;
use routa_core::session::{Session, SessionState};
use routa_core::trip::{Direction, TripId};
use routa_core::{FlowError, FlowResult};

use super::FlowCtx;
use crate::prompts;
use crate::transport::{EventPayload, Reply};

/// Entry for both booking variants: self-service for anyone, driver-proxy
/// behind the staff gate.
pub async fn start(ctx: &FlowCtx<'_>, session: &mut Session, driver_mode: bool) -> FlowResult<Reply> {
    if driver_mode {
        ctx.require_staff()?;
    }
    session.reset();
    session.draft.driver_mode = driver_mode;
    session.state = SessionState::AwaitingSeats;
    let prompt = if driver_mode {
        "How many seats for the client?"
    } else {
        "How many seats would you like to book?"
    };
    Ok(Reply::new(prompt, prompts::seats_keyboard()))
}

fn offered_dates(ctx: &FlowCtx<'_>, driver_mode: bool) -> Vec<NaiveDate> {
    if driver_mode {
        schedule::staff_dates(ctx.now.date())
    } else {
        schedule::passenger_dates(ctx.now.date())
    }
}

/// Role the schedule filter applies for this draft: proxy bookings see the
/// unfiltered table, self-service is always cut off, even for a driver
/// booking their own seat.
fn filter_role(driver_mode: bool) -> Role {
    if driver_mode {
        Role::Driver
    } else {
        Role::Passenger
    }
}

pub async fn seats(ctx: &FlowCtx<'_>, session: &mut Session, text: &str) -> FlowResult<Reply> {
    let max = ctx.app.rules.max_seats_per_booking;
    let Ok(count) = text.parse::<u32>() else {
        return Ok(Reply::new(format!("Enter a seat count (1–{max})."), prompts::seats_keyboard()));
    };
    if count == 0 || count > max {
        return Ok(Reply::new(format!("Enter a seat count (1–{max})."), prompts::seats_keyboard()));
    }

    session.draft.seats = Some(count);
    session.state = SessionState::AwaitingDate;
    let dates = offered_dates(ctx, session.draft.driver_mode);
    Ok(Reply::new("Pick a travel date:", prompts::dates_keyboard(&dates, prompts::BTN_CANCEL)))
}

pub async fn date(ctx: &FlowCtx<'_>, session: &mut Session, text: &str) -> FlowResult<Reply> {
    let offered = offered_dates(ctx, session.draft.driver_mode);
    let parsed = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok();
    let Some(date) = parsed.filter(|d| offered.contains(d)) else {
        return Ok(Reply::new(
            "Please pick a date from the buttons.",
            prompts::dates_keyboard(&offered, prompts::BTN_CANCEL),
        ));
    };

    session.draft.date = Some(date);
    session.state = SessionState::AwaitingDirection;
    Ok(Reply::new("Pick a direction:", prompts::directions_keyboard(prompts::BTN_CANCEL)))
}

pub async fn direction(ctx: &FlowCtx<'_>, session: &mut Session, text: &str) -> FlowResult<Reply> {
    let Some(direction) = Direction::parse(text) else {
        return Ok(Reply::new(
            "Pick a direction from the buttons.",
            prompts::directions_keyboard(prompts::BTN_CANCEL),
        ));
    };

    let date = session.draft.date()?;
    let times =
        schedule::visible_times(direction, date, filter_role(session.draft.driver_mode), ctx.now);
    if times.is_empty() {
        session.reset();
        return Ok(Reply::new("No departures are available on that date.", ctx.main_menu()));
    }

    session.draft.direction = Some(direction);
    session.state = SessionState::AwaitingTime;
    Ok(Reply::new("Pick a time:", prompts::times_keyboard(&times, prompts::BTN_CANCEL)))
}

pub async fn time(ctx: &FlowCtx<'_>, session: &mut Session, text: &str) -> FlowResult<Reply> {
    let date = session.draft.date()?;
    let direction = session.draft.direction()?;
    let times =
        schedule::visible_times(direction, date, filter_role(session.draft.driver_mode), ctx.now);

    let parsed = NaiveTime::parse_from_str(text, "%H:%M").ok();
    let Some(time) = parsed.filter(|t| times.contains(t)) else {
        return Ok(Reply::new(
            "Pick a time from the buttons.",
            prompts::times_keyboard(&times, prompts::BTN_CANCEL),
        ));
    };

    session.draft.time = Some(time);

    // The slot may have been locked since the timetable was rendered; check
    // again before collecting the boarding note so the participant is not
    // walked through a flow that can only fail.
    let trip = session.draft.trip()?;
    if ctx.app.registry.is_locked(&trip).await {
        return Err(FlowError::SlotLocked(trip));
    }

    session.state = SessionState::AwaitingBoardingNote;
    Ok(Reply::new(
        "Pick a boarding point or type your own note:",
        prompts::boarding_keyboard(direction),
    ))
}

pub async fn boarding_note(ctx: &FlowCtx<'_>, session: &mut Session, text: &str) -> FlowResult<Reply> {
    session.draft.comment = Some(text.to_string());

    if session.draft.driver_mode {
        session.state = SessionState::AwaitingDriverContact;
        return Ok(Reply::new(
            "Enter the passenger's phone number (+380XXXXXXXXX) or another way to reach them.",
            vec![vec![prompts::BTN_CANCEL.to_string()]],
        ));
    }

    match ctx.app.ledger.phone_on_file(session.participant).await {
        Some(phone) => finalize(ctx, session, phone, false).await,
        None => {
            session.state = SessionState::AwaitingPhone;
            Ok(Reply::new("Share your phone number:", prompts::contact_keyboard()))
        }
    }
}

pub async fn phone(
    ctx: &FlowCtx<'_>,
    session: &mut Session,
    payload: &EventPayload,
) -> FlowResult<Reply> {
    let EventPayload::Contact { phone } = payload else {
        return Ok(Reply::new(
            "Use the share button to send your contact.",
            prompts::contact_keyboard(),
        ));
    };

    ctx.app.ledger.remember_phone(session.participant, phone).await?;
    finalize(ctx, session, phone.clone(), false).await
}

pub async fn driver_contact(
    ctx: &FlowCtx<'_>,
    session: &mut Session,
    text: &str,
) -> FlowResult<Reply> {
    finalize(ctx, session, text.to_string(), true).await
}

async fn finalize(
    ctx: &FlowCtx<'_>,
    session: &mut Session,
    phone: String,
    by_driver: bool,
) -> FlowResult<Reply> {
    let mut comment = session.draft.comment()?.to_string();
    if by_driver {
        comment.push_str(" (driver-created)");
    }

    let draft = BookingDraft {
        trip: session.draft.trip()?,
        seats: session.draft.seats()?,
        phone,
        comment,
        created_by_driver: by_driver,
        driver_id: by_driver.then_some(session.participant),
    };

    let booking = ctx
        .app
        .ledger
        .finalize(session.participant, draft, filter_role(by_driver), ctx.now)
        .await?;
    debug!("Flow completed for {}: {}", session.participant, booking.trip);

    session.reset();
    Ok(Reply::new("Booking confirmed.", ctx.main_menu()))
}

/// "My bookings": upcoming entries after lazy pruning, each with its own
/// cancel button keyed by the exact trip identity. Navigating here abandons
/// any flow in progress.
pub async fn my_bookings(ctx: &FlowCtx<'_>, session: &mut Session) -> FlowResult<Reply> {
    session.reset();
    let upcoming = ctx.app.ledger.list_upcoming(session.participant, ctx.now).await;
    if upcoming.is_empty() {
        return Ok(Reply::new("You have no active bookings.", ctx.main_menu()));
    }

    let mut text = String::new();
    let mut keyboard = Vec::new();
    for booking in &upcoming {
        text.push_str(&prompts::booking_line(booking));
        text.push_str("\n\n");
        keyboard.push(vec![prompts::cancel_button(booking)]);
    }
    keyboard.extend(ctx.main_menu());
    Ok(Reply::new(text.trim_end().to_string(), keyboard))
}

pub async fn cancel_booking(
    ctx: &FlowCtx<'_>,
    session: &mut Session,
    rest: &str,
) -> FlowResult<Reply> {
    let Some(trip) = TripId::parse(rest) else {
        return Ok(Reply::new("Could not read that cancellation.", ctx.main_menu()));
    };

    let removed = ctx.app.ledger.cancel(session.participant, &trip).await?;
    let text = if removed { "Booking cancelled." } else { "Booking not found." };
    Ok(Reply::new(text, ctx.main_menu()))
}
