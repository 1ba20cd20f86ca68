use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::directory::Role;
use crate::trip::Direction;

/// Minimum lead time before departure for passenger bookings.
pub const CUTOFF_MINUTES: i64 = 20;

const ROKYTNE_TO_KYIV: [(u32, u32); 13] = [
    (5, 0),
    (5, 30),
    (6, 0),
    (7, 0),
    (8, 0),
    (9, 0),
    (10, 0),
    (12, 0),
    (13, 0),
    (14, 0),
    (15, 0),
    (16, 0),
    (17, 0),
];

/// Canonical timetable for a direction. Deterministic, no side effects.
pub fn base_times(direction: Direction) -> Vec<NaiveTime> {
    match direction {
        Direction::RokytneToKyiv => ROKYTNE_TO_KYIV
            .iter()
            .map(|&(h, m)| NaiveTime::from_hms_opt(h, m, 0).unwrap())
            .collect(),
        Direction::KyivToRokytne => (8..=20)
            .map(|h| NaiveTime::from_hms_opt(h, 0, 0).unwrap())
            .collect(),
    }
}

/// Timetable as a given role sees it on a given date. Passengers lose every
/// departure closer than the cutoff; staff always get the base table since
/// they inspect and manage departures that already left.
pub fn visible_times(
    direction: Direction,
    date: NaiveDate,
    role: Role,
    now: NaiveDateTime,
) -> Vec<NaiveTime> {
    let times = base_times(direction);
    if role != Role::Passenger {
        return times;
    }
    let horizon = now + Duration::minutes(CUTOFF_MINUTES);
    times.into_iter().filter(|t| date.and_time(*t) > horizon).collect()
}

/// Dates offered to passengers: today through today+6.
pub fn passenger_dates(today: NaiveDate) -> Vec<NaiveDate> {
    (0..7).map(|i| today + Duration::days(i)).collect()
}

/// Dates offered to drivers/admins: near past through near future, so a
/// recently departed or soon-departing trip can still be inspected.
pub fn staff_dates(today: NaiveDate) -> Vec<NaiveDate> {
    (-3..=7).map(|i| today + Duration::days(i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn base_times_strictly_increasing_and_unique() {
        for direction in Direction::ALL {
            let times = base_times(direction);
            assert_eq!(times.len(), 13);
            for pair in times.windows(2) {
                assert!(pair[0] < pair[1], "{direction}: {:?} !< {:?}", pair[0], pair[1]);
            }
        }
    }

    #[test]
    fn passenger_filter_drops_departures_inside_cutoff() {
        let today = date(2026, 8, 7);
        let now = today.and_time(hm(7, 50));

        let times = visible_times(Direction::KyivToRokytne, today, Role::Passenger, now);
        // 08:00 is 10 minutes out, inside the 20-minute cutoff.
        assert!(!times.contains(&hm(8, 0)));
        assert!(times.contains(&hm(9, 0)));

        let horizon = now + Duration::minutes(CUTOFF_MINUTES);
        for t in times {
            assert!(today.and_time(t) > horizon);
        }
    }

    #[test]
    fn cutoff_boundary_is_strict() {
        let today = date(2026, 8, 7);
        // Exactly 20 minutes before departure: not strictly later, so dropped.
        let now = today.and_time(hm(8, 40));
        let times = visible_times(Direction::KyivToRokytne, today, Role::Passenger, now);
        assert!(!times.contains(&hm(9, 0)));
    }

    #[test]
    fn staff_see_past_departures() {
        let today = date(2026, 8, 7);
        let now = today.and_time(hm(23, 0));
        for role in [Role::Driver, Role::Admin] {
            let times = visible_times(Direction::RokytneToKyiv, today, role, now);
            assert_eq!(times, base_times(Direction::RokytneToKyiv));
        }
    }

    #[test]
    fn future_date_unfiltered_for_passengers() {
        let now = date(2026, 8, 7).and_time(hm(23, 0));
        let times = visible_times(Direction::KyivToRokytne, date(2026, 8, 8), Role::Passenger, now);
        assert_eq!(times, base_times(Direction::KyivToRokytne));
    }

    #[test]
    fn candidate_date_windows() {
        let today = date(2026, 8, 7);

        let passenger = passenger_dates(today);
        assert_eq!(passenger.len(), 7);
        assert_eq!(passenger[0], today);
        assert_eq!(passenger[6], date(2026, 8, 13));

        let staff = staff_dates(today);
        assert_eq!(staff.len(), 11);
        assert_eq!(staff[0], date(2026, 8, 4));
        assert_eq!(staff[3], today);
        assert_eq!(staff[10], date(2026, 8, 14));
    }
}
