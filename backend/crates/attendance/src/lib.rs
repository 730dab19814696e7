//! Attendance (NFC Tap) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Tap events, direction rules, repository traits
//! - `application/` - Record tap, daily stats, employee day, heartbeat
//! - `infra/` - PostgreSQL and in-memory implementations
//! - `presentation/` - HTTP handlers, DTOs, routers
//!
//! ## Tap Model
//! - The first tap of a calendar day is IN, then taps alternate
//! - Direction comes from the latest stored tap, never from cached state
//! - Timestamps are taken from the server clock
//! - OUT taps report the time since the preceding same-day IN, if any

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::AttendanceConfig;
pub use application::{RecordedTap, TapOutcome};
pub use error::{AttendanceError, AttendanceResult};
pub use infra::postgres::PgAttendanceRepository;
pub use presentation::handlers::AttendanceAppState;
pub use presentation::router::{admin_router, attendance_routers, device_router};

// Re-export unified error types
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
