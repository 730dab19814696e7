//! Domain Value Objects
//!
//! Immutable value types for the attendance domain.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tap direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    In,
    Out,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown tap direction: {0}")]
pub struct DirectionParseError(String);

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::In => "IN",
            Direction::Out => "OUT",
        }
    }

    /// Direction of the next tap given the latest one of the same day.
    pub fn following(latest: Option<Direction>) -> Direction {
        match latest {
            Some(Direction::In) => Direction::Out,
            Some(Direction::Out) | None => Direction::In,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = DirectionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN" => Ok(Direction::In),
            "OUT" => Ok(Direction::Out),
            other => Err(DirectionParseError(other.to_owned())),
        }
    }
}

/// NFC card UID as reported by a reader. Matched exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CardUid(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CardUidError {
    #[error("UID is required")]
    Empty,
    #[error("UID must be at most {max} characters")]
    TooLong { max: usize },
    #[error("UID contains control characters")]
    ControlCharacter,
}

impl CardUid {
    pub const MAX_LENGTH: usize = 64;

    pub fn parse(raw: &str) -> Result<Self, CardUidError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CardUidError::Empty);
        }
        if trimmed.chars().count() > Self::MAX_LENGTH {
            return Err(CardUidError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if trimmed.chars().any(char::is_control) {
            return Err(CardUidError::ControlCharacter);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Elapsed time of a completed IN→OUT pair. Never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct TapDuration(Duration);

impl TapDuration {
    /// `None` when `end` precedes `start`.
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        let elapsed = end - start;
        (elapsed >= Duration::zero()).then_some(Self(elapsed))
    }

    pub fn zero() -> Self {
        Self(Duration::zero())
    }

    pub fn hours(&self) -> i64 {
        self.0.num_hours()
    }

    /// Minutes past the whole hours
    pub fn minutes(&self) -> i64 {
        self.0.num_minutes() % 60
    }

    pub fn as_seconds(&self) -> i64 {
        self.0.num_seconds()
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.checked_add(&other.0).unwrap_or(self.0))
    }
}

impl fmt::Display for TapDuration {
    /// `"Xh Ym"`, truncated to whole minutes
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h {}m", self.hours(), self.minutes())
    }
}

/// One calendar day in the site's local time, as a half-open UTC range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    date: NaiveDate,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DayWindow {
    pub fn new(date: NaiveDate, offset: FixedOffset) -> Self {
        let local_midnight = date.and_time(NaiveTime::MIN);
        let start = offset
            .from_local_datetime(&local_midnight)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&local_midnight));
        Self {
            date,
            start,
            end: start + Duration::days(1),
        }
    }

    /// The local day containing `instant`.
    pub fn containing(instant: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self::new(instant.with_timezone(&offset).date_naive(), offset)
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Exclusive
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// Reader liveness derived from the last heartbeat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeStatus {
    Online,
    Offline,
}

impl NodeStatus {
    pub fn from_heartbeat(
        last_heartbeat: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        offline_after: Duration,
    ) -> Self {
        match last_heartbeat {
            Some(at) if now - at <= offline_after => NodeStatus::Online,
            _ => NodeStatus::Offline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, h, m, s).unwrap()
    }

    #[test]
    fn test_direction_alternates() {
        assert_eq!(Direction::following(None), Direction::In);
        assert_eq!(Direction::following(Some(Direction::In)), Direction::Out);
        assert_eq!(Direction::following(Some(Direction::Out)), Direction::In);
        assert_eq!("OUT".parse::<Direction>(), Ok(Direction::Out));
        assert!("out".parse::<Direction>().is_err());
    }

    #[test]
    fn test_card_uid() {
        assert_eq!(CardUid::parse(" 04A1B2C3 ").unwrap().as_str(), "04A1B2C3");
        assert_eq!(CardUid::parse("  "), Err(CardUidError::Empty));
        assert!(CardUid::parse(&"A".repeat(65)).is_err());
        assert_eq!(CardUid::parse("04\u{0}A"), Err(CardUidError::ControlCharacter));
    }

    #[test]
    fn test_duration_format() {
        let d = TapDuration::between(at(9, 0, 0), at(9, 5, 0)).unwrap();
        assert_eq!(d.to_string(), "0h 5m");
        let d = TapDuration::between(at(8, 30, 0), at(17, 15, 59)).unwrap();
        assert_eq!(d.to_string(), "8h 45m");
        assert_eq!(TapDuration::between(at(13, 0, 0), at(13, 0, 0)).unwrap().to_string(), "0h 0m");
        assert!(TapDuration::between(at(10, 0, 0), at(9, 0, 0)).is_none());
    }

    #[test]
    fn test_day_window_with_offset() {
        let jst = FixedOffset::east_opt(9 * 3600).unwrap();
        // 2024-06-03 23:30 UTC is already 2024-06-04 in UTC+9
        let day = DayWindow::containing(at(23, 30, 0), jst);
        assert_eq!(day.date(), NaiveDate::from_ymd_opt(2024, 6, 4).unwrap());
        assert_eq!(day.start(), at(15, 0, 0));
        assert!(day.contains(at(23, 30, 0)));
        assert!(!day.contains(at(14, 59, 59)));

        let utc = DayWindow::containing(at(0, 0, 0), FixedOffset::east_opt(0).unwrap());
        assert!(utc.contains(at(0, 0, 0)));
        assert!(!utc.contains(utc.end()));
    }

    #[test]
    fn test_node_status_threshold() {
        let five = Duration::minutes(5);
        assert_eq!(NodeStatus::from_heartbeat(Some(at(9, 0, 0)), at(9, 5, 0), five), NodeStatus::Online);
        assert_eq!(NodeStatus::from_heartbeat(Some(at(9, 0, 0)), at(9, 5, 1), five), NodeStatus::Offline);
        assert_eq!(NodeStatus::from_heartbeat(None, at(9, 0, 0), five), NodeStatus::Offline);
    }
}
