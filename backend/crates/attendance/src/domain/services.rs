//! Domain Services
//!
//! Pure functions over tap histories.

use chrono::{DateTime, Utc};

use crate::domain::entities::{TapEvent, WorkSession};
use crate::domain::value_objects::{Direction, TapDuration};

/// Duration for an OUT at `out_at`, given the latest same-day IN before it.
pub fn duration_since_check_in(
    check_in: Option<&TapEvent>,
    out_at: DateTime<Utc>,
) -> Option<TapDuration> {
    check_in
        .filter(|tap| tap.direction == Direction::In)
        .and_then(|tap| TapDuration::between(tap.tapped_at, out_at))
}

/// Pair a day's taps (oldest first) into work sessions.
pub fn pair_sessions(taps: &[TapEvent]) -> Vec<WorkSession> {
    let mut sessions = Vec::new();
    let mut open: Option<DateTime<Utc>> = None;

    for tap in taps {
        match tap.direction {
            Direction::In => {
                if let Some(check_in) = open.replace(tap.tapped_at) {
                    sessions.push(WorkSession {
                        check_in: Some(check_in),
                        check_out: None,
                        duration: None,
                    });
                }
            }
            Direction::Out => {
                let check_in = open.take();
                sessions.push(WorkSession {
                    check_in,
                    check_out: Some(tap.tapped_at),
                    duration: check_in.and_then(|at| TapDuration::between(at, tap.tapped_at)),
                });
            }
        }
    }

    if let Some(check_in) = open {
        sessions.push(WorkSession {
            check_in: Some(check_in),
            check_out: None,
            duration: None,
        });
    }

    sessions
}

/// Sum of completed session durations
pub fn total_duration(sessions: &[WorkSession]) -> TapDuration {
    sessions
        .iter()
        .filter_map(|s| s.duration)
        .fold(TapDuration::zero(), TapDuration::saturating_add)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use kernel::id::{EmployeeId, TapEventId};

    fn tap(direction: Direction, h: u32, m: u32) -> TapEvent {
        TapEvent {
            id: TapEventId::new(),
            employee_id: EmployeeId::default(),
            card_uid: "04A1".into(),
            tapped_at: Utc.with_ymd_and_hms(2024, 6, 3, h, m, 0).unwrap(),
            direction,
            node_id: None,
            location: "Main Entrance".into(),
        }
    }

    #[test]
    fn test_pairs_and_total() {
        let taps = vec![
            tap(Direction::In, 9, 0),
            tap(Direction::Out, 12, 0),
            tap(Direction::In, 13, 0),
            tap(Direction::Out, 17, 30),
        ];
        let sessions = pair_sessions(&taps);
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].duration.unwrap().to_string(), "3h 0m");
        assert_eq!(total_duration(&sessions).to_string(), "7h 30m");
        assert!(sessions.iter().all(|s| !s.is_open()));
    }

    #[test]
    fn test_trailing_in_is_open() {
        let sessions = pair_sessions(&[tap(Direction::In, 9, 0)]);
        assert_eq!(sessions.len(), 1);
        assert!(sessions[0].is_open());
        assert_eq!(total_duration(&sessions), TapDuration::zero());
    }

    #[test]
    fn test_stray_out_has_no_duration() {
        let sessions = pair_sessions(&[tap(Direction::Out, 9, 0)]);
        assert_eq!(sessions[0].check_in, None);
        assert_eq!(sessions[0].duration, None);
    }

    #[test]
    fn test_duration_requires_an_in() {
        let out_at = Utc.with_ymd_and_hms(2024, 6, 3, 9, 5, 0).unwrap();
        let check_in = tap(Direction::In, 9, 0);
        assert_eq!(
            duration_since_check_in(Some(&check_in), out_at).unwrap().to_string(),
            "0h 5m"
        );
        assert_eq!(duration_since_check_in(Some(&tap(Direction::Out, 9, 0)), out_at), None);
        assert_eq!(duration_since_check_in(None, out_at), None);
    }
}
