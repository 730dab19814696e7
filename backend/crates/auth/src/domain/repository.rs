//! Repository Traits
//!
//! Interfaces for credential storage and the sign-in audit log.
//! Implementations live in the infrastructure layer.

use chrono::{DateTime, Utc};
use kernel::id::AdminUserId;

use crate::domain::entity::{admin_user::AdminUser, login_attempt::LoginAttempt};
use crate::domain::value_object::login_id::LoginId;
use crate::error::AuthResult;

/// Admin credential store
#[trait_variant::make(AdminUserRepository: Send)]
pub trait LocalAdminUserRepository {
    async fn find_by_login_id(&self, login_id: &LoginId) -> AuthResult<Option<AdminUser>>;

    /// Persist a new counter value and lock expiry in one write.
    async fn increment_failed_attempts(
        &self,
        id: &AdminUserId,
        new_count: u32,
        locked_until: Option<DateTime<Utc>>,
    ) -> AuthResult<()>;

    /// Zero the counter and clear any lock.
    async fn reset_failure_state(&self, id: &AdminUserId) -> AuthResult<()>;

    async fn touch_last_login(&self, id: &AdminUserId, at: DateTime<Utc>) -> AuthResult<()>;
}

/// Append-only sign-in audit log
#[trait_variant::make(LoginAttemptSink: Send)]
pub trait LocalLoginAttemptSink {
    async fn append(&self, attempt: &LoginAttempt) -> AuthResult<()>;
}
