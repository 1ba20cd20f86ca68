use routa_core::directory::Driver;
use routa_core::session::{Session, SessionState};
use routa_core::FlowResult;

use super::FlowCtx;
use crate::prompts;
use crate::transport::{EventPayload, Reply};

// Driver and admin set management, admin-only. Each action ends the flow and
// returns to the main menu, mirroring a one-shot panel interaction.

pub async fn start_drivers(ctx: &FlowCtx<'_>, session: &mut Session) -> FlowResult<Reply> {
    ctx.require_admin()?;
    session.reset();
    session.state = SessionState::DriverMenu;
    let drivers = ctx.app.directory.drivers().await;
    Ok(Reply::new(prompts::drivers_list_text(&drivers), prompts::driver_menu_keyboard()))
}

pub async fn driver_menu(ctx: &FlowCtx<'_>, session: &mut Session, text: &str) -> FlowResult<Reply> {
    ctx.require_admin()?;
    match text {
        prompts::BTN_ADD_DRIVER => {
            session.state = SessionState::AwaitingNewDriver;
            Ok(Reply::new(
                "Send the user's numeric id, optionally followed by a name and phone, \
                 or forward a message from them.",
                vec![vec![prompts::BTN_HOME.to_string()]],
            ))
        }
        prompts::BTN_REMOVE_DRIVER => {
            session.state = SessionState::AwaitingRemoveDriver;
            Ok(Reply::new(
                "Enter the id of the driver to remove:",
                vec![vec![prompts::BTN_HOME.to_string()]],
            ))
        }
        _ => Ok(Reply::new("Pick an action from the buttons.", prompts::driver_menu_keyboard())),
    }
}

pub async fn new_driver(
    ctx: &FlowCtx<'_>,
    session: &mut Session,
    payload: &EventPayload,
) -> FlowResult<Reply> {
    let driver = match payload {
        EventPayload::Forwarded { id } => Driver::normalize(*id, None, None),
        EventPayload::Text(text) => {
            let mut tokens = text.split_whitespace();
            let Some(Ok(id)) = tokens.next().map(str::parse::<i64>) else {
                return Ok(Reply::new(
                    "Enter a numeric id.",
                    vec![vec![prompts::BTN_HOME.to_string()]],
                ));
            };
            Driver::normalize(id, tokens.next(), tokens.next())
        }
        EventPayload::Contact { .. } => {
            return Ok(Reply::new(
                "Enter a numeric id or forward a message.",
                vec![vec![prompts::BTN_HOME.to_string()]],
            ));
        }
    };

    let id = driver.id;
    let added = ctx.app.directory.add_driver(driver).await?;
    session.reset();
    let text = if added {
        format!("Driver {} added.", id)
    } else {
        "That user is already a driver.".to_string()
    };
    Ok(Reply::new(text, ctx.main_menu()))
}

pub async fn remove_driver(
    ctx: &FlowCtx<'_>,
    session: &mut Session,
    text: &str,
) -> FlowResult<Reply> {
    let Ok(id) = text.parse::<i64>() else {
        return Ok(Reply::new("Enter a numeric id.", vec![vec![prompts::BTN_HOME.to_string()]]));
    };
    let removed = ctx.app.directory.remove_driver(id).await?;
    session.reset();
    let text = if removed {
        format!("Driver {} removed.", id)
    } else {
        "No such driver.".to_string()
    };
    Ok(Reply::new(text, ctx.main_menu()))
}

pub async fn start_admins(ctx: &FlowCtx<'_>, session: &mut Session) -> FlowResult<Reply> {
    ctx.require_admin()?;
    session.reset();
    session.state = SessionState::AdminMenu;
    let admins = ctx.app.directory.admins().await;
    Ok(Reply::new(prompts::admins_list_text(&admins), prompts::admin_menu_keyboard()))
}

pub async fn admin_menu(ctx: &FlowCtx<'_>, session: &mut Session, text: &str) -> FlowResult<Reply> {
    ctx.require_admin()?;
    match text {
        prompts::BTN_ADD_ADMIN => {
            session.state = SessionState::AwaitingNewAdmin;
            Ok(Reply::new(
                "Send the user's numeric id, or forward a message from them.",
                vec![vec![prompts::BTN_HOME.to_string()]],
            ))
        }
        prompts::BTN_REMOVE_ADMIN => {
            session.state = SessionState::AwaitingRemoveAdmin;
            Ok(Reply::new(
                "Enter the id of the admin to remove:",
                vec![vec![prompts::BTN_HOME.to_string()]],
            ))
        }
        _ => Ok(Reply::new("Pick an action from the buttons.", prompts::admin_menu_keyboard())),
    }
}

pub async fn new_admin(
    ctx: &FlowCtx<'_>,
    session: &mut Session,
    payload: &EventPayload,
) -> FlowResult<Reply> {
    let id = match payload {
        EventPayload::Forwarded { id } => *id,
        EventPayload::Text(text) => match text.trim().parse::<i64>() {
            Ok(id) => id,
            Err(_) => {
                return Ok(Reply::new(
                    "Enter a numeric id.",
                    vec![vec![prompts::BTN_HOME.to_string()]],
                ));
            }
        },
        EventPayload::Contact { .. } => {
            return Ok(Reply::new(
                "Enter a numeric id or forward a message.",
                vec![vec![prompts::BTN_HOME.to_string()]],
            ));
        }
    };

    let added = ctx.app.directory.add_admin(id).await?;
    session.reset();
    let text = if added {
        format!("Admin {} added.", id)
    } else {
        "That user is already an admin.".to_string()
    };
    Ok(Reply::new(text, ctx.main_menu()))
}

pub async fn remove_admin(
    ctx: &FlowCtx<'_>,
    session: &mut Session,
    text: &str,
) -> FlowResult<Reply> {
    let Ok(id) = text.parse::<i64>() else {
        return Ok(Reply::new("Enter a numeric id.", vec![vec![prompts::BTN_HOME.to_string()]]));
    };
    let removed = ctx.app.directory.remove_admin(id).await?;
    session.reset();
    let text = if removed {
        format!("Admin {} removed.", id)
    } else {
        "No such admin.".to_string()
    };
    Ok(Reply::new(text, ctx.main_menu()))
}
