//! Daily Stats Use Case

use std::sync::Arc;

use chrono::NaiveDate;
use platform::clock::Clock;

use crate::application::bounded;
use crate::application::config::AttendanceConfig;
use crate::domain::entities::DayStats;
use crate::domain::repository::TapEventStore;
use crate::error::AttendanceResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyStatsReport {
    pub date: NaiveDate,
    pub stats: DayStats,
}

pub struct DailyStatsUseCase<T>
where
    T: TapEventStore,
{
    taps: Arc<T>,
    clock: Arc<dyn Clock>,
    config: Arc<AttendanceConfig>,
}

impl<T> DailyStatsUseCase<T>
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

    /// Stats for `date`, or for today in site time.
    pub async fn daily_stats(&self, date: Option<NaiveDate>) -> AttendanceResult<DailyStatsReport> {
        let day = match date {
            Some(date) => self.config.day_for(date),
            None => self.config.day_of(self.clock.now()),
        };

        let stats = bounded(self.config.store_timeout, "day_stats", self.taps.day_stats(&day)).await?;
        Ok(DailyStatsReport {
            date: day.date(),
            stats,
        })
    }
}
