use chrono::{NaiveDate, NaiveTime};

use routa_core::booking::Booking;
use routa_core::directory::Driver;
use routa_core::trip::{Direction, TripId, TripSlot};

// Button labels. Inbound taps echo these exact strings back as text, so the
// dispatcher matches on them verbatim.
pub const BTN_CANCEL: &str = "Cancel";
pub const BTN_HOME: &str = "Home";
pub const BTN_BOOK: &str = "Book a seat";
pub const BTN_MY_BOOKINGS: &str = "My bookings";
pub const BTN_STAFF_PANEL: &str = "Staff panel";
pub const BTN_INSPECT: &str = "Inspect trip";
pub const BTN_MANUAL_BOOKING: &str = "Manual booking";
pub const BTN_MY_TRIPS: &str = "My trips";
pub const BTN_LOOKUP: &str = "Lookup trip";
pub const BTN_MANAGE_ROUTES: &str = "Manage routes";
pub const BTN_MANAGE_DRIVERS: &str = "Manage drivers";
pub const BTN_MANAGE_ADMINS: &str = "Manage admins";
pub const BTN_LOCK_TRIP: &str = "Lock trip";
pub const BTN_ADD_DRIVER: &str = "Add driver";
pub const BTN_REMOVE_DRIVER: &str = "Remove driver";
pub const BTN_ADD_ADMIN: &str = "Add admin";
pub const BTN_REMOVE_ADMIN: &str = "Remove admin";
pub const BTN_DO_LOCK: &str = "Lock";
pub const BTN_DO_UNLOCK: &str = "Unlock";
pub const BTN_SHARE_PHONE: &str = "Share my number";

/// Per-booking cancel buttons carry the trip identity after this prefix.
pub const CANCEL_BOOKING_PREFIX: &str = "Cancel ";

pub fn rows_of(items: Vec<String>, width: usize) -> Vec<Vec<String>> {
    items.chunks(width).map(|chunk| chunk.to_vec()).collect()
}

pub fn main_menu(is_staff: bool) -> Vec<Vec<String>> {
    let mut rows = vec![vec![BTN_BOOK.to_string()], vec![BTN_MY_BOOKINGS.to_string()]];
    if is_staff {
        rows.push(vec![BTN_STAFF_PANEL.to_string()]);
    }
    rows
}

pub fn staff_panel(is_admin: bool) -> Vec<Vec<String>> {
    let mut rows = vec![
        vec![BTN_INSPECT.to_string()],
        vec![BTN_MANUAL_BOOKING.to_string()],
        vec![BTN_MY_TRIPS.to_string()],
        vec![BTN_LOOKUP.to_string()],
    ];
    if is_admin {
        rows.push(vec![BTN_MANAGE_ROUTES.to_string()]);
        rows.push(vec![BTN_MANAGE_DRIVERS.to_string()]);
        rows.push(vec![BTN_MANAGE_ADMINS.to_string()]);
        rows.push(vec![BTN_LOCK_TRIP.to_string()]);
    }
    rows.push(vec![BTN_HOME.to_string()]);
    rows
}

pub fn seats_keyboard() -> Vec<Vec<String>> {
    vec![
        vec!["1".to_string(), "2".to_string(), "3".to_string()],
        vec![BTN_CANCEL.to_string()],
    ]
}

/// One date per row, escape action (Cancel or Home) at the bottom.
pub fn dates_keyboard(dates: &[NaiveDate], escape: &str) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = dates.iter().map(|d| vec![d.to_string()]).collect();
    rows.push(vec![escape.to_string()]);
    rows
}

pub fn directions_keyboard(escape: &str) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> =
        Direction::ALL.iter().map(|d| vec![d.label().to_string()]).collect();
    rows.push(vec![escape.to_string()]);
    rows
}

pub fn times_keyboard(times: &[NaiveTime], escape: &str) -> Vec<Vec<String>> {
    let mut rows = rows_of(times.iter().map(|t| t.format("%H:%M").to_string()).collect(), 3);
    rows.push(vec![escape.to_string()]);
    rows
}

/// Suggested pickup point per direction; free text is also accepted.
pub fn boarding_keyboard(direction: Direction) -> Vec<Vec<String>> {
    let suggestion = match direction {
        Direction::RokytneToKyiv => "Near the bus station",
        Direction::KyivToRokytne => "Pivdenna bus station",
    };
    vec![vec![suggestion.to_string()], vec![BTN_CANCEL.to_string()]]
}

pub fn contact_keyboard() -> Vec<Vec<String>> {
    vec![vec![BTN_SHARE_PHONE.to_string()], vec![BTN_CANCEL.to_string()]]
}

pub fn driver_menu_keyboard() -> Vec<Vec<String>> {
    vec![
        vec![BTN_ADD_DRIVER.to_string(), BTN_REMOVE_DRIVER.to_string()],
        vec![BTN_HOME.to_string()],
    ]
}

pub fn admin_menu_keyboard() -> Vec<Vec<String>> {
    vec![
        vec![BTN_ADD_ADMIN.to_string(), BTN_REMOVE_ADMIN.to_string()],
        vec![BTN_HOME.to_string()],
    ]
}

pub fn lock_action_keyboard() -> Vec<Vec<String>> {
    vec![
        vec![BTN_DO_LOCK.to_string(), BTN_DO_UNLOCK.to_string()],
        vec![BTN_HOME.to_string()],
    ]
}

pub fn booking_line(booking: &Booking) -> String {
    format!(
        "{} | {} | {} | {} seat(s)\n{}",
        booking.trip.date,
        booking.trip.time.format("%H:%M"),
        booking.trip.direction,
        booking.seats,
        booking.comment
    )
}

pub fn cancel_button(booking: &Booking) -> String {
    format!("{}{}", CANCEL_BOOKING_PREFIX, booking.trip.storage_key())
}

pub fn manifest_text(trip: &TripId, bookings: &[Booking], total: u32) -> String {
    let mut text = format!("{}\n—————————————\n", trip);
    for b in bookings {
        let mark = if b.created_by_driver { " (driver)" } else { "" };
        text.push_str(&format!("{} | {} seat(s) | {}{}\n", b.phone, b.seats, b.comment, mark));
    }
    text.push_str(&format!("—————————————\nTotal booked: {} seat(s)", total));
    text
}

pub fn itinerary_text(slots: &[TripSlot]) -> String {
    let mut text = String::from("Your trips:\n\n");
    for slot in slots {
        text.push_str(&format!("{}\n", slot.trip));
    }
    text
}

pub fn drivers_list_text(drivers: &[Driver]) -> String {
    if drivers.is_empty() {
        return "Current drivers:\nnone".to_string();
    }
    let mut text = String::from("Current drivers:\n");
    for d in drivers {
        text.push_str(&format!("• {} — {} ({})\n", d.id, d.name, d.phone));
    }
    text
}

pub fn admins_list_text(admins: &[i64]) -> String {
    if admins.is_empty() {
        return "Current admins:\nnone".to_string();
    }
    let mut text = String::from("Current admins:\n");
    for id in admins {
        text.push_str(&format!("• {}\n", id));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_of_chunks_evenly_with_remainder() {
        let items: Vec<String> = (1..=7).map(|i| i.to_string()).collect();
        let rows = rows_of(items, 3);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].len(), 3);
        assert_eq!(rows[2], vec!["7".to_string()]);
    }

    #[test]
    fn staff_panel_admin_rows_are_gated() {
        let driver_rows = staff_panel(false);
        assert!(!driver_rows.iter().flatten().any(|b| b == BTN_MANAGE_DRIVERS));
        let admin_rows = staff_panel(true);
        assert!(admin_rows.iter().flatten().any(|b| b == BTN_MANAGE_DRIVERS));
        assert!(admin_rows.iter().flatten().any(|b| b == BTN_LOCK_TRIP));
    }
}
