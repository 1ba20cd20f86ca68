use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    KyivToRokytne,
    RokytneToKyiv,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::KyivToRokytne, Direction::RokytneToKyiv];

    /// Canonical button label; inbound taps echo this exact text back.
    pub fn label(&self) -> &'static str {
        match self {
            Direction::KyivToRokytne => "Kyiv → Rokytne",
            Direction::RokytneToKyiv => "Rokytne → Kyiv",
        }
    }

    pub fn parse(text: &str) -> Option<Direction> {
        Direction::ALL.iter().copied().find(|d| d.label() == text.trim())
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Composite key for one departure. The canonical string form doubles as the
/// storage key for the trip-slot collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TripId {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub direction: Direction,
}

impl TripId {
    pub fn new(date: NaiveDate, time: NaiveTime, direction: Direction) -> Self {
        Self { date, time, direction }
    }

    pub fn departure(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    pub fn storage_key(&self) -> String {
        format!("{} {} {}", self.date, self.time.format("%H:%M"), self.direction)
    }

    /// Inverse of `storage_key`, used for cancel actions that round-trip the
    /// trip identity through button text.
    pub fn parse(text: &str) -> Option<TripId> {
        let text = text.trim();
        let (date_str, rest) = text.split_once(' ')?;
        let (time_str, dir_str) = rest.split_once(' ')?;
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()?;
        let time = NaiveTime::parse_from_str(time_str, "%H:%M").ok()?;
        let direction = Direction::parse(dir_str)?;
        Some(TripId::new(date, time, direction))
    }
}

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.date, self.time.format("%H:%M"), self.direction)
    }
}

/// Shared per-departure record. Created implicitly on first lock or driver
/// assignment, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripSlot {
    pub trip: TripId,
    pub locked: bool,
    pub driver: Option<i64>,
}

impl TripSlot {
    pub fn new(trip: TripId) -> Self {
        Self { trip, locked: false, driver: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip() -> TripId {
        TripId::new(
            NaiveDate::from_ymd_opt(2026, 8, 10).unwrap(),
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            Direction::KyivToRokytne,
        )
    }

    #[test]
    fn storage_key_round_trips() {
        let id = trip();
        let key = id.storage_key();
        assert_eq!(key, "2026-08-10 08:00 Kyiv → Rokytne");
        assert_eq!(TripId::parse(&key), Some(id));
    }

    #[test]
    fn parse_rejects_malformed_input() {
        assert_eq!(TripId::parse("not a trip"), None);
        assert_eq!(TripId::parse("2026-08-10 25:00 Kyiv → Rokytne"), None);
        assert_eq!(TripId::parse("2026-08-10 08:00 Kyiv → Lviv"), None);
    }

    #[test]
    fn direction_parses_only_exact_labels() {
        assert_eq!(Direction::parse("Kyiv → Rokytne"), Some(Direction::KyivToRokytne));
        assert_eq!(Direction::parse("  Rokytne → Kyiv "), Some(Direction::RokytneToKyiv));
        assert_eq!(Direction::parse("Kyiv - Rokytne"), None);
    }
}
