use chrono::Duration;

use routa_core::session::Session;
use routa_core::FlowResult;

use super::FlowCtx;
use crate::prompts;
use crate::transport::Reply;

pub async fn panel(ctx: &FlowCtx<'_>, session: &mut Session) -> FlowResult<Reply> {
    ctx.require_staff()?;
    session.reset();
    let is_admin = ctx.role == routa_core::directory::Role::Admin;
    Ok(Reply::new("Staff panel: choose an action.", prompts::staff_panel(is_admin)))
}

/// The driver's own itinerary, windowed to yesterday through a week out so
/// departures that just left are still in view.
pub async fn my_trips(ctx: &FlowCtx<'_>, session: &mut Session) -> FlowResult<Reply> {
    ctx.require_staff()?;
    session.reset();
    let today = ctx.now.date();
    let slots = ctx
        .app
        .registry
        .driver_trips(session.participant, today - Duration::days(1), today + Duration::days(7))
        .await;
    if slots.is_empty() {
        return Ok(Reply::new("No assigned trips in the coming days.", ctx.main_menu()));
    }
    Ok(Reply::new(prompts::itinerary_text(&slots), ctx.main_menu()))
}
