//! Admin User Entity
//!
//! Credential record for a portal administrator, including the
//! failed-attempt counter that drives temporary lockout.

use chrono::{DateTime, Duration, Utc};
use kernel::id::AdminUserId;

use crate::domain::value_object::login_id::LoginId;

#[derive(Debug, Clone)]
pub struct AdminUser {
    pub id: AdminUserId,
    pub login_id: LoginId,
    /// Argon2 PHC string
    pub password_hash: String,
    pub display_name: String,
    pub is_active: bool,
    pub failed_attempts: u32,
    pub locked_until: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Counter state to persist after a failed password check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureUpdate {
    pub failed_attempts: u32,
    pub locked_until: Option<DateTime<Utc>>,
}

impl FailureUpdate {
    /// True when this failure is the one that locks the account.
    pub fn locks(&self) -> bool {
        self.locked_until.is_some()
    }

    pub fn remaining_attempts(&self) -> u32 {
        AdminUser::MAX_FAILED_ATTEMPTS.saturating_sub(self.failed_attempts)
    }
}

impl AdminUser {
    /// Consecutive failures that trigger a lockout
    pub const MAX_FAILED_ATTEMPTS: u32 = 5;
    /// Lockout duration in minutes
    pub const LOCKOUT_MINUTES: i64 = 15;

    pub fn new(login_id: LoginId, password_hash: String, display_name: String) -> Self {
        Self {
            id: AdminUserId::new(),
            login_id,
            password_hash,
            display_name,
            is_active: true,
            failed_attempts: 0,
            locked_until: None,
            last_login_at: None,
        }
    }

    pub fn lockout_duration() -> Duration {
        Duration::minutes(Self::LOCKOUT_MINUTES)
    }

    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| now < until)
    }

    /// Whole minutes left on an active lock, rounded up.
    pub fn lock_remaining_minutes(&self, now: DateTime<Utc>) -> Option<i64> {
        let until = self.locked_until.filter(|until| now < *until)?;
        let millis = (until - now).num_milliseconds();
        Some((millis + 59_999) / 60_000)
    }

    /// Counter and lock expiry after one more failure at `now`.
    ///
    /// The counter keeps growing past the threshold until a successful
    /// sign-in or an administrative reset, so a failure after an expired
    /// lock locks the account again straight away.
    pub fn next_failure(&self, now: DateTime<Utc>) -> FailureUpdate {
        let failed_attempts = self.failed_attempts.saturating_add(1);
        let locked_until = (failed_attempts >= Self::MAX_FAILED_ATTEMPTS)
            .then(|| now + Self::lockout_duration());
        FailureUpdate {
            failed_attempts,
            locked_until,
        }
    }

    pub fn apply_failure(&mut self, update: FailureUpdate) {
        self.failed_attempts = update.failed_attempts;
        self.locked_until = update.locked_until;
    }

    /// Clears the counter and any lock.
    pub fn reset_failures(&mut self) {
        self.failed_attempts = 0;
        self.locked_until = None;
    }

    pub fn record_login(&mut self, at: DateTime<Utc>) {
        self.last_login_at = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn user() -> AdminUser {
        AdminUser::new(
            LoginId::parse("admin").unwrap(),
            "$argon2id$stub".into(),
            "Administrator".into(),
        )
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 2, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_fifth_failure_locks_for_fifteen_minutes() {
        let mut u = user();
        for expected_remaining in [4, 3, 2, 1] {
            let update = u.next_failure(t0());
            assert!(!update.locks());
            assert_eq!(update.remaining_attempts(), expected_remaining);
            u.apply_failure(update);
        }

        let update = u.next_failure(t0());
        assert!(update.locks());
        assert_eq!(update.failed_attempts, 5);
        assert_eq!(update.locked_until, Some(t0() + Duration::minutes(15)));
        assert_eq!(update.remaining_attempts(), 0);
    }

    #[test]
    fn test_lock_remaining_minutes_rounds_up() {
        let mut u = user();
        u.locked_until = Some(t0() + Duration::minutes(15));

        assert!(u.is_locked_at(t0()));
        assert_eq!(u.lock_remaining_minutes(t0()), Some(15));
        assert_eq!(
            u.lock_remaining_minutes(t0() + Duration::seconds(61)),
            Some(14)
        );
        assert_eq!(
            u.lock_remaining_minutes(t0() + Duration::minutes(15) - Duration::seconds(1)),
            Some(1)
        );

        let expiry = t0() + Duration::minutes(15);
        assert!(!u.is_locked_at(expiry));
        assert_eq!(u.lock_remaining_minutes(expiry), None);
    }

    #[test]
    fn test_failure_after_expired_lock_relocks() {
        let mut u = user();
        u.failed_attempts = 5;
        u.locked_until = Some(t0());

        let later = t0() + Duration::minutes(1);
        assert!(!u.is_locked_at(later));
        let update = u.next_failure(later);
        assert_eq!(update.failed_attempts, 6);
        assert_eq!(update.locked_until, Some(later + Duration::minutes(15)));
    }

    #[test]
    fn test_reset_failures() {
        let mut u = user();
        u.failed_attempts = 3;
        u.locked_until = Some(t0());
        u.reset_failures();
        assert_eq!(u.failed_attempts, 0);
        assert_eq!(u.locked_until, None);
    }
}
