//! Sign In Use Case
//!
//! Verifies admin credentials, maintains the lockout counter and issues a
//! session. Every business failure comes back as an [`AuthOutcome`] variant;
//! store faults are caught here and reported as `SystemError`.
//!
//! Step order:
//! 1. per-address rate limit
//! 2. input validation
//! 3. emergency access (only when configured)
//! 4. credential lookup, active flag, lock check
//! 5. password verification, then counter update or reset
//!
//! Exactly one audit record is appended per call.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::AdminUserId;
use platform::clock::Clock;
use platform::password::{ClearTextPassword, HashedPassword, PasswordPolicyError};
use platform::rate_limit::RateLimiter;
use serde::Serialize;
use uuid::Uuid;

use crate::application::config::AuthConfig;
use crate::application::session_token::{IssuedSession, SessionCodec, SessionUser};
use crate::domain::entity::{admin_user::AdminUser, login_attempt::LoginAttempt};
use crate::domain::repository::{AdminUserRepository, LoginAttemptSink};
use crate::domain::value_object::login_id::{LoginId, LoginIdError};
use crate::error::{AuthError, AuthResult};

const REQUIRED_MESSAGE: &str = "User ID and password are required";
const PASSWORD_LENGTH_MESSAGE: &str = "Password must be between 6 and 100 characters";

/// Sign in input, as received from the boundary
#[derive(Debug, Clone, Default)]
pub struct SignInInput {
    pub login_id: String,
    pub password: String,
    pub source_address: String,
}

/// Outcome kind, as rendered in `errorCode`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeKind {
    Authenticated,
    ValidationError,
    InvalidCredentials,
    AccountDisabled,
    AccountLocked,
    AccountLockedNow,
    RateLimited,
    SystemError,
}

#[derive(Debug, Clone)]
pub enum AuthOutcome {
    Authenticated {
        user: SessionUser,
        session: IssuedSession,
        emergency_access: bool,
        rate_limit_remaining: Option<u32>,
    },
    ValidationError {
        message: String,
    },
    /// `remaining_attempts` is absent when the login id names no account
    InvalidCredentials {
        remaining_attempts: Option<u32>,
    },
    AccountDisabled,
    AccountLocked {
        remaining_minutes: i64,
    },
    AccountLockedNow {
        lockout_minutes: i64,
    },
    RateLimited {
        retry_after_secs: u64,
    },
    /// `detail` is only filled in debug mode
    SystemError {
        detail: Option<String>,
    },
}

impl AuthOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            AuthOutcome::Authenticated { .. } => OutcomeKind::Authenticated,
            AuthOutcome::ValidationError { .. } => OutcomeKind::ValidationError,
            AuthOutcome::InvalidCredentials { .. } => OutcomeKind::InvalidCredentials,
            AuthOutcome::AccountDisabled => OutcomeKind::AccountDisabled,
            AuthOutcome::AccountLocked { .. } => OutcomeKind::AccountLocked,
            AuthOutcome::AccountLockedNow { .. } => OutcomeKind::AccountLockedNow,
            AuthOutcome::RateLimited { .. } => OutcomeKind::RateLimited,
            AuthOutcome::SystemError { .. } => OutcomeKind::SystemError,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AuthOutcome::Authenticated { .. })
    }

    /// Message safe to show to the person at the sign-in form.
    pub fn message(&self) -> String {
        match self {
            AuthOutcome::Authenticated { .. } => "Signed in".to_string(),
            AuthOutcome::ValidationError { message } => message.clone(),
            AuthOutcome::InvalidCredentials { .. } => "Invalid credentials".to_string(),
            AuthOutcome::AccountDisabled => "Account is disabled".to_string(),
            AuthOutcome::AccountLocked { remaining_minutes } => {
                format!("Account locked. Try again in {remaining_minutes} minutes.")
            }
            AuthOutcome::AccountLockedNow { lockout_minutes } => {
                format!("Too many failed attempts. Account locked for {lockout_minutes} minutes.")
            }
            AuthOutcome::RateLimited { .. } => "Too many login attempts from this IP".to_string(),
            AuthOutcome::SystemError { .. } => "Authentication service unavailable".to_string(),
        }
    }
}

/// What the credential checks decided, before the audit write.
struct Decision {
    outcome: AuthOutcome,
    failure_reason: Option<String>,
}

impl Decision {
    fn success(outcome: AuthOutcome) -> Self {
        Self {
            outcome,
            failure_reason: None,
        }
    }

    fn failure(outcome: AuthOutcome, reason: impl Into<String>) -> Self {
        Self {
            outcome,
            failure_reason: Some(reason.into()),
        }
    }
}

/// Sign in use case
pub struct SignInUseCase<U, A, L>
where
    U: AdminUserRepository,
    A: LoginAttemptSink,
    L: RateLimiter,
{
    user_repo: Arc<U>,
    audit: Arc<A>,
    limiter: Arc<L>,
    clock: Arc<dyn Clock>,
    config: Arc<AuthConfig>,
    codec: SessionCodec,
}

impl<U, A, L> SignInUseCase<U, A, L>
where
    U: AdminUserRepository,
    A: LoginAttemptSink,
    L: RateLimiter,
{
    pub fn new(
        user_repo: Arc<U>,
        audit: Arc<A>,
        limiter: Arc<L>,
        clock: Arc<dyn Clock>,
        config: Arc<AuthConfig>,
    ) -> Self {
        let codec = SessionCodec::new(config.session_secret, config.session_ttl);
        Self {
            user_repo,
            audit,
            limiter,
            clock,
            config,
            codec,
        }
    }

    pub async fn authenticate(&self, input: SignInInput) -> AuthOutcome {
        let now = self.clock.now();
        let decision = match self.decide(&input, now).await {
            Ok(decision) => decision,
            Err(e) => {
                e.log();
                let detail = self.config.expose_error_detail.then(|| e.to_string());
                Decision::failure(
                    AuthOutcome::SystemError { detail },
                    format!("System error: {}", e.kind()),
                )
            }
        };

        self.record_attempt(&input, &decision, now).await;
        self.log_outcome(&input, &decision.outcome);
        decision.outcome
    }

    async fn decide(&self, input: &SignInInput, now: DateTime<Utc>) -> AuthResult<Decision> {
        let remaining = match self.limiter.check(&input.source_address).await {
            Ok(result) if !result.allowed => {
                return Ok(Decision::failure(
                    AuthOutcome::RateLimited {
                        retry_after_secs: result.retry_after_secs(now),
                    },
                    "Rate limited",
                ));
            }
            Ok(result) => Some(result.remaining),
            Err(e) => {
                tracing::warn!(error = %e, "Login rate limiter unavailable, continuing");
                None
            }
        };

        let (login_id, password) = match validate(input) {
            Ok(valid) => valid,
            Err(message) => {
                let reason = format!("Validation failed: {message}");
                return Ok(Decision::failure(
                    AuthOutcome::ValidationError { message },
                    reason,
                ));
            }
        };

        if let Some(decision) = self.try_emergency_access(&login_id, &password, now, remaining).await? {
            return Ok(decision);
        }

        let Some(user) = self
            .bounded("find_by_login_id", self.user_repo.find_by_login_id(&login_id))
            .await?
        else {
            return Ok(Decision::failure(
                AuthOutcome::InvalidCredentials {
                    remaining_attempts: None,
                },
                "User not found",
            ));
        };

        if !user.is_active {
            return Ok(Decision::failure(
                AuthOutcome::AccountDisabled,
                "User account inactive",
            ));
        }

        if let Some(remaining_minutes) = user.lock_remaining_minutes(now) {
            return Ok(Decision::failure(
                AuthOutcome::AccountLocked { remaining_minutes },
                "Account locked",
            ));
        }

        if !self.verify_password(&user.password_hash, password).await? {
            return self.register_failure(&user, now).await;
        }

        self.bounded("reset_failure_state", self.user_repo.reset_failure_state(&user.id))
            .await?;
        self.bounded("touch_last_login", self.user_repo.touch_last_login(&user.id, now))
            .await?;

        let session = self.codec.issue(
            &user.id,
            user.login_id.as_str(),
            &user.display_name,
            now,
        )?;
        Ok(Decision::success(AuthOutcome::Authenticated {
            user: SessionUser {
                id: user.id,
                login_id: user.login_id.as_str().to_owned(),
                display_name: user.display_name.clone(),
                issued_at: session.issued_at,
                expires_at: session.expires_at,
            },
            session,
            emergency_access: false,
            rate_limit_remaining: remaining,
        }))
    }

    async fn register_failure(&self, user: &AdminUser, now: DateTime<Utc>) -> AuthResult<Decision> {
        let update = user.next_failure(now);
        self.bounded(
            "increment_failed_attempts",
            self.user_repo
                .increment_failed_attempts(&user.id, update.failed_attempts, update.locked_until),
        )
        .await?;

        if update.locks() {
            return Ok(Decision::failure(
                AuthOutcome::AccountLockedNow {
                    lockout_minutes: AdminUser::LOCKOUT_MINUTES,
                },
                "Invalid password",
            ));
        }

        Ok(Decision::failure(
            AuthOutcome::InvalidCredentials {
                remaining_attempts: Some(update.remaining_attempts()),
            },
            "Invalid password",
        ))
    }

    /// Argon2 on the blocking pool. An unparsable stored hash is a mismatch.
    async fn verify_password(&self, stored: &str, password: ClearTextPassword) -> AuthResult<bool> {
        let Ok(hash) = HashedPassword::from_phc_string(stored) else {
            tracing::warn!("Stored password hash is not a valid PHC string");
            return Ok(false);
        };
        let pepper = self.config.password_pepper.clone();
        let valid =
            tokio::task::spawn_blocking(move || hash.verify(&password, pepper.as_deref())).await?;
        Ok(valid)
    }

    async fn try_emergency_access(
        &self,
        login_id: &LoginId,
        password: &ClearTextPassword,
        now: DateTime<Utc>,
        remaining: Option<u32>,
    ) -> AuthResult<Option<Decision>> {
        let Some(emergency) = self.config.emergency_access.as_ref() else {
            return Ok(None);
        };
        if emergency.login_id != login_id.as_str() {
            return Ok(None);
        }

        let hash = emergency.password_hash.clone();
        let candidate = ClearTextPassword::new(password.expose().to_owned())
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        let pepper = self.config.password_pepper.clone();
        let matched =
            tokio::task::spawn_blocking(move || hash.verify(&candidate, pepper.as_deref())).await?;
        if !matched {
            return Ok(None);
        }

        let id = AdminUserId::from_uuid(Uuid::nil());
        let session = self
            .codec
            .issue(&id, &emergency.login_id, &emergency.display_name, now)?;
        tracing::warn!(login_id = %emergency.login_id, "Emergency access sign-in");

        Ok(Some(Decision {
            outcome: AuthOutcome::Authenticated {
                user: SessionUser {
                    id,
                    login_id: emergency.login_id.clone(),
                    display_name: emergency.display_name.clone(),
                    issued_at: session.issued_at,
                    expires_at: session.expires_at,
                },
                session,
                emergency_access: true,
                rate_limit_remaining: remaining,
            },
            failure_reason: Some("emergency access".to_string()),
        }))
    }

    /// Bound a store call by the configured deadline.
    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = AuthResult<T>>,
    ) -> AuthResult<T> {
        tokio::time::timeout(self.config.store_timeout, call)
            .await
            .map_err(|_| AuthError::StoreTimeout(operation))?
    }

    async fn record_attempt(&self, input: &SignInInput, decision: &Decision, now: DateTime<Utc>) {
        let attempt = match (&decision.outcome, &decision.failure_reason) {
            (AuthOutcome::Authenticated { .. }, None) => {
                LoginAttempt::succeeded(&input.login_id, &input.source_address, now)
            }
            (AuthOutcome::Authenticated { .. }, Some(reason)) => {
                let mut attempt =
                    LoginAttempt::succeeded(&input.login_id, &input.source_address, now);
                attempt.failure_reason = Some(reason.clone());
                attempt
            }
            (_, reason) => LoginAttempt::failed(
                &input.login_id,
                &input.source_address,
                reason.clone().unwrap_or_default(),
                now,
            ),
        };

        if let Err(e) = self.bounded("append_login_attempt", self.audit.append(&attempt)).await {
            tracing::warn!(error = %e, "Failed to record login attempt");
        }
    }

    fn log_outcome(&self, input: &SignInInput, outcome: &AuthOutcome) {
        match outcome {
            AuthOutcome::Authenticated { user, .. } => {
                tracing::info!(
                    user_id = %user.id,
                    login_id = %user.login_id,
                    source = %input.source_address,
                    "Admin signed in"
                );
            }
            AuthOutcome::SystemError { .. } => {
                tracing::error!(source = %input.source_address, "Sign-in aborted by a system error");
            }
            other => {
                tracing::warn!(
                    kind = ?other.kind(),
                    source = %input.source_address,
                    "Sign-in rejected"
                );
            }
        }
    }
}

/// Presence, then login id bounds, then password bounds.
fn validate(input: &SignInInput) -> Result<(LoginId, ClearTextPassword), String> {
    if input.login_id.is_empty() || input.password.is_empty() {
        return Err(REQUIRED_MESSAGE.to_string());
    }

    let login_id = LoginId::parse(&input.login_id).map_err(|e| match e {
        LoginIdError::Empty => REQUIRED_MESSAGE.to_string(),
        LoginIdError::Length(_) => e.to_string(),
    })?;

    let password = ClearTextPassword::new(input.password.clone()).map_err(|e| match e {
        PasswordPolicyError::Empty => REQUIRED_MESSAGE.to_string(),
        PasswordPolicyError::TooShort { .. } | PasswordPolicyError::TooLong { .. } => {
            PASSWORD_LENGTH_MESSAGE.to_string()
        }
    })?;

    Ok((login_id, password))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(login_id: &str, password: &str) -> SignInInput {
        SignInInput {
            login_id: login_id.into(),
            password: password.into(),
            source_address: "1.2.3.4".into(),
        }
    }

    #[test]
    fn test_validation_messages() {
        let msg = |i: SignInInput| validate(&i).err();
        assert_eq!(msg(input("", "secret1")).as_deref(), Some(REQUIRED_MESSAGE));
        assert_eq!(msg(input("admin", "")).as_deref(), Some(REQUIRED_MESSAGE));
        assert_eq!(
            msg(input("ab", "secret1")).as_deref(),
            Some("User ID must be between 3 and 50 characters")
        );
        assert_eq!(
            msg(input("admin", "12345")).as_deref(),
            Some(PASSWORD_LENGTH_MESSAGE)
        );
        assert_eq!(
            msg(input("admin", &"x".repeat(101))).as_deref(),
            Some(PASSWORD_LENGTH_MESSAGE)
        );
        assert!(validate(&input("admin", "secret1")).is_ok());
    }

    #[test]
    fn test_outcome_messages() {
        assert_eq!(
            AuthOutcome::AccountLocked { remaining_minutes: 3 }.message(),
            "Account locked. Try again in 3 minutes."
        );
        assert_eq!(
            AuthOutcome::AccountLockedNow { lockout_minutes: 15 }.message(),
            "Too many failed attempts. Account locked for 15 minutes."
        );
        assert_eq!(
            AuthOutcome::SystemError { detail: Some("pool closed".into()) }.message(),
            "Authentication service unavailable"
        );
    }

    #[test]
    fn test_kind_serializes_as_error_code() {
        let json = serde_json::to_string(&OutcomeKind::AccountLockedNow).unwrap();
        assert_eq!(json, "\"ACCOUNT_LOCKED_NOW\"");
    }
}
