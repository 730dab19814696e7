//! Auth (Admin Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Admin credential entity, lockout policy, repository traits
//! - `application/` - Sign-in, session and unlock use cases
//! - `infra/` - PostgreSQL and in-memory implementations
//! - `presentation/` - HTTP handlers, DTOs, router, session guard
//!
//! ## Features
//! - Login with user id + password, per-address rate limiting
//! - Account lockout after 5 consecutive failures (15 minutes)
//! - Stateless HMAC-signed session cookie (7 days)
//! - Audit record for every sign-in attempt
//! - Optional emergency access, off unless configured
//!
//! ## Security Model
//! - Passwords hashed with Argon2id, verified off the async executor
//! - Store faults never reach the client outside debug mode
//! - Store calls bounded by a timeout; counter and lock written together

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::{AuthConfig, EmergencyAccess};
pub use application::{AuthOutcome, SessionUser};
pub use error::{AuthError, AuthResult};
pub use infra::postgres::PgAuthRepository;
pub use presentation::middleware::{AdminSessionGuard, require_admin_session};
pub use presentation::router::{auth_router, auth_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
