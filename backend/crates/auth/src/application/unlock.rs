//! Unlock Account Use Case
//!
//! Administrative reset of the failed-attempt counter and lock.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::repository::AdminUserRepository;
use crate::domain::value_object::login_id::LoginId;
use crate::error::{AuthError, AuthResult};

/// Unlock account use case
pub struct UnlockAccountUseCase<U>
where
    U: AdminUserRepository,
{
    user_repo: Arc<U>,
    store_timeout: Duration,
}

impl<U> UnlockAccountUseCase<U>
where
    U: AdminUserRepository,
{
    pub fn new(user_repo: Arc<U>, store_timeout: Duration) -> Self {
        Self {
            user_repo,
            store_timeout,
        }
    }

    pub async fn reset_lockout(&self, login_id: &str, performed_by: &str) -> AuthResult<()> {
        let login_id =
            LoginId::parse(login_id).map_err(|e| AuthError::InvalidLoginId(e.to_string()))?;

        let user = tokio::time::timeout(
            self.store_timeout,
            self.user_repo.find_by_login_id(&login_id),
        )
        .await
        .map_err(|_| AuthError::StoreTimeout("find_by_login_id"))??
        .ok_or(AuthError::AccountNotFound)?;

        tokio::time::timeout(
            self.store_timeout,
            self.user_repo.reset_failure_state(&user.id),
        )
        .await
        .map_err(|_| AuthError::StoreTimeout("reset_failure_state"))??;

        tracing::info!(
            login_id = %login_id,
            performed_by = performed_by,
            previous_failures = user.failed_attempts,
            "Admin lockout reset"
        );
        Ok(())
    }
}
