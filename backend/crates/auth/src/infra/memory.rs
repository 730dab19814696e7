//! In-Memory Repository
//!
//! Process-local credential store and audit log for tests and local runs.
//! Can simulate an unavailable or slow store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use kernel::id::AdminUserId;

use crate::domain::entity::admin_user::{AdminUser, FailureUpdate};
use crate::domain::entity::login_attempt::LoginAttempt;
use crate::domain::repository::{AdminUserRepository, LoginAttemptSink};
use crate::domain::value_object::login_id::LoginId;
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
struct State {
    users: HashMap<AdminUserId, AdminUser>,
    attempts: Vec<LoginAttempt>,
    unavailable: bool,
    latency: Option<Duration>,
}

#[derive(Default)]
pub struct InMemoryAuthRepository {
    state: Mutex<State>,
}

impl InMemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, user: AdminUser) -> Self {
        self.insert(user);
        self
    }

    pub fn insert(&self, user: AdminUser) {
        self.lock().users.insert(user.id, user);
    }

    pub fn user(&self, login_id: &str) -> Option<AdminUser> {
        self.lock()
            .users
            .values()
            .find(|u| u.login_id.as_str() == login_id)
            .cloned()
    }

    /// Audit records in insertion order
    pub fn attempts(&self) -> Vec<LoginAttempt> {
        self.lock().attempts.clone()
    }

    /// Make every call fail as if the database were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    /// Delay every call by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        self.lock().latency = latency;
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn enter(&self) -> AuthResult<()> {
        let (unavailable, latency) = {
            let state = self.lock();
            (state.unavailable, state.latency)
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if unavailable {
            return Err(AuthError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    fn update<F>(&self, id: &AdminUserId, f: F) -> AuthResult<()>
    where
        F: FnOnce(&mut AdminUser),
    {
        let mut state = self.lock();
        let user = state.users.get_mut(id).ok_or(AuthError::AccountNotFound)?;
        f(user);
        Ok(())
    }
}

impl AdminUserRepository for InMemoryAuthRepository {
    async fn find_by_login_id(&self, login_id: &LoginId) -> AuthResult<Option<AdminUser>> {
        self.enter().await?;
        Ok(self.user(login_id.as_str()))
    }

    async fn increment_failed_attempts(
        &self,
        id: &AdminUserId,
        new_count: u32,
        locked_until: Option<DateTime<Utc>>,
    ) -> AuthResult<()> {
        self.enter().await?;
        self.update(id, |user| {
            user.apply_failure(FailureUpdate {
                failed_attempts: new_count,
                locked_until,
            })
        })
    }

    async fn reset_failure_state(&self, id: &AdminUserId) -> AuthResult<()> {
        self.enter().await?;
        self.update(id, AdminUser::reset_failures)
    }

    async fn touch_last_login(&self, id: &AdminUserId, at: DateTime<Utc>) -> AuthResult<()> {
        self.enter().await?;
        self.update(id, |user| user.record_login(at))
    }
}

impl LoginAttemptSink for InMemoryAuthRepository {
    async fn append(&self, attempt: &LoginAttempt) -> AuthResult<()> {
        self.enter().await?;
        self.lock().attempts.push(attempt.clone());
        Ok(())
    }
}
