//! Presentation Layer
//!
//! HTTP handlers, DTOs and routers.

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::AttendanceAppState;
pub use router::{admin_router, attendance_routers, device_router};
