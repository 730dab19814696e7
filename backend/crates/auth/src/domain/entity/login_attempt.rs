//! Login Attempt Entity
//!
//! Append-only audit record. One is written for every sign-in attempt.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginAttempt {
    /// Identifier as submitted, which may not name a real account
    pub login_id: String,
    pub source_address: String,
    pub success: bool,
    pub failure_reason: Option<String>,
    pub attempted_at: DateTime<Utc>,
}

impl LoginAttempt {
    /// Longest identifier kept in the audit log.
    pub const MAX_LOGGED_LOGIN_ID: usize = 100;

    pub fn succeeded(login_id: &str, source_address: &str, at: DateTime<Utc>) -> Self {
        Self::build(login_id, source_address, true, None, at)
    }

    pub fn failed(
        login_id: &str,
        source_address: &str,
        reason: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self::build(login_id, source_address, false, Some(reason.into()), at)
    }

    fn build(
        login_id: &str,
        source_address: &str,
        success: bool,
        failure_reason: Option<String>,
        attempted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            login_id: login_id.chars().take(Self::MAX_LOGGED_LOGIN_ID).collect(),
            source_address: source_address.to_owned(),
            success,
            failure_reason,
            attempted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oversized_login_id_is_truncated() {
        let long = "x".repeat(500);
        let attempt = LoginAttempt::failed(&long, "1.2.3.4", "Validation failed", Utc::now());
        assert_eq!(attempt.login_id.len(), LoginAttempt::MAX_LOGGED_LOGIN_ID);
        assert!(!attempt.success);
    }
}
