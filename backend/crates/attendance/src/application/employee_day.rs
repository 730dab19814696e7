//! Employee Day Use Case
//!
//! One employee's taps for a day, paired into work sessions.

use std::sync::Arc;

use chrono::NaiveDate;
use kernel::id::EmployeeId;
use platform::clock::Clock;

use crate::application::bounded;
use crate::application::config::AttendanceConfig;
use crate::domain::entities::{TapEvent, WorkSession};
use crate::domain::repository::TapEventStore;
use crate::domain::services::{pair_sessions, total_duration};
use crate::domain::value_objects::TapDuration;
use crate::error::AttendanceResult;

#[derive(Debug, Clone)]
pub struct EmployeeDay {
    pub employee_id: EmployeeId,
    pub date: NaiveDate,
    /// Oldest first
    pub taps: Vec<TapEvent>,
    pub sessions: Vec<WorkSession>,
    pub total: TapDuration,
    /// Last tap of the day was an IN
    pub checked_in: bool,
}

pub struct EmployeeDayUseCase<T>
where
    T: TapEventStore,
{
    taps: Arc<T>,
    clock: Arc<dyn Clock>,
    config: Arc<AttendanceConfig>,
}

impl<T> EmployeeDayUseCase<T>
where
    T: TapEventStore,
{
    pub fn new(taps: Arc<T>, clock: Arc<dyn Clock>, config: Arc<AttendanceConfig>) -> Self {
        Self {
            taps,
            clock,
            config,
        }
    }

    pub async fn employee_day(
        &self,
        employee_id: EmployeeId,
        date: Option<NaiveDate>,
    ) -> AttendanceResult<EmployeeDay> {
        let day = match date {
            Some(date) => self.config.day_for(date),
            None => self.config.day_of(self.clock.now()),
        };

        let taps = bounded(
            self.config.store_timeout,
            "taps_for_employee_on",
            self.taps.taps_for_employee_on(&employee_id, &day),
        )
        .await?;

        let sessions = pair_sessions(&taps);
        let total = total_duration(&sessions);
        let checked_in = sessions.last().is_some_and(WorkSession::is_open);

        Ok(EmployeeDay {
            employee_id,
            date: day.date(),
            taps,
            sessions,
            total,
            checked_in,
        })
    }
}
