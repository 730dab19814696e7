//! Infrastructure Layer
//!
//! Database implementations and an in-memory store for tests.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryAttendanceRepository;
pub use postgres::PgAttendanceRepository;
