//! Attendance Routers
//!
//! Device-facing routes and admin routes are separate so the binary can put
//! the admin set behind the session guard.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use platform::clock::{Clock, SystemClock};

use crate::application::config::AttendanceConfig;
use crate::domain::repository::{CardDirectory, NodeRegistry, TapEventStore};
use crate::infra::postgres::PgAttendanceRepository;
use crate::presentation::handlers::{self, AttendanceAppState};

/// Routes called by NFC readers
pub fn device_router<R>(state: AttendanceAppState<R>) -> Router
where
    R: CardDirectory + TapEventStore + NodeRegistry + Send + Sync + 'static,
{
    Router::new()
        .route("/attendance/tap", post(handlers::record_tap::<R>))
        .route("/nodes/heartbeat", post(handlers::heartbeat::<R>))
        .with_state(state)
}

/// Routes for the admin portal
pub fn admin_router<R>(state: AttendanceAppState<R>) -> Router
where
    R: CardDirectory + TapEventStore + NodeRegistry + Send + Sync + 'static,
{
    Router::new()
        .route("/attendance/stats", get(handlers::daily_stats::<R>))
        .route("/employees/{id}/attendance", get(handlers::employee_day::<R>))
        .route("/nodes", get(handlers::list_nodes::<R>))
        .with_state(state)
}

/// Device and admin routers over PostgreSQL
pub fn attendance_routers(
    repo: PgAttendanceRepository,
    config: AttendanceConfig,
) -> (Router, Router) {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let state = AttendanceAppState {
        repo: Arc::new(repo),
        clock,
        config: Arc::new(config),
    };
    (device_router(state.clone()), admin_router(state))
}
