//! Application Layer
//!
//! Use cases and application services.

use std::future::Future;
use std::time::Duration;

use crate::error::{AttendanceError, AttendanceResult};

pub mod config;
pub mod daily_stats;
pub mod employee_day;
pub mod heartbeat;
pub mod record_tap;

// Re-exports
pub use config::AttendanceConfig;
pub use daily_stats::{DailyStatsReport, DailyStatsUseCase};
pub use employee_day::{EmployeeDay, EmployeeDayUseCase};
pub use heartbeat::{HeartbeatOutcome, HeartbeatUseCase, NodeView};
pub use record_tap::{RecordTapUseCase, RecordedTap, TapInput, TapOutcome};

/// Bound a store call by `timeout`.
pub(crate) async fn bounded<T>(
    timeout: Duration,
    operation: &'static str,
    call: impl Future<Output = AttendanceResult<T>>,
) -> AttendanceResult<T> {
    tokio::time::timeout(timeout, call)
        .await
        .map_err(|_| AttendanceError::StoreTimeout(operation))?
}
