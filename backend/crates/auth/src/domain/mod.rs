//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

pub use entity::{admin_user::AdminUser, login_attempt::LoginAttempt};
pub use repository::{AdminUserRepository, LoginAttemptSink};
