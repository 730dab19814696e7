//! Application Layer
//!
//! Use cases and application services.

pub mod check_session;
pub mod config;
pub mod session_token;
pub mod sign_in;
pub mod sign_out;
pub mod unlock;

// Re-exports
pub use check_session::CheckSessionUseCase;
pub use config::{AuthConfig, EmergencyAccess};
pub use session_token::{IssuedSession, SessionCodec, SessionUser};
pub use sign_in::{AuthOutcome, OutcomeKind, SignInInput, SignInUseCase};
pub use sign_out::{SessionRevocation, SignOutUseCase};
pub use unlock::UnlockAccountUseCase;
