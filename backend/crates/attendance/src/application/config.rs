//! Application Configuration

use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

use crate::domain::value_objects::DayWindow;

/// Location reported for taps without a known node
pub const DEFAULT_LOCATION: &str = "Main Entrance";

#[derive(Debug, Clone)]
pub struct AttendanceConfig {
    /// Offset of the site's local time, which defines the calendar day
    pub utc_offset: FixedOffset,
    pub default_location: String,
    /// Heartbeat age after which a node is OFFLINE
    pub node_offline_after: Duration,
    /// Deadline applied to each store call
    pub store_timeout: Duration,
    /// Include fault detail in `SystemError` outcomes (never in production)
    pub expose_error_detail: bool,
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            utc_offset: Utc.fix(),
            default_location: DEFAULT_LOCATION.to_string(),
            node_offline_after: Duration::from_secs(5 * 60),
            store_timeout: Duration::from_secs(5),
            expose_error_detail: false,
        }
    }
}

impl AttendanceConfig {
    /// `None` if the offset is outside ±24h.
    pub fn with_offset_minutes(self, minutes: i32) -> Option<Self> {
        let utc_offset = FixedOffset::east_opt(minutes.checked_mul(60)?)?;
        Some(Self { utc_offset, ..self })
    }

    pub fn development() -> Self {
        Self {
            expose_error_detail: true,
            ..Self::default()
        }
    }

    pub fn day_of(&self, instant: DateTime<Utc>) -> DayWindow {
        DayWindow::containing(instant, self.utc_offset)
    }

    pub fn day_for(&self, date: NaiveDate) -> DayWindow {
        DayWindow::new(date, self.utc_offset)
    }

    pub fn offline_after(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.node_offline_after)
            .unwrap_or_else(|_| chrono::Duration::minutes(5))
    }
}
