//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::{AuthOutcome, OutcomeKind, SessionUser};

// ============================================================================
// Login
// ============================================================================

/// Login request. Missing fields read as empty and fail validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginRequest {
    pub user_id: String,
    pub password: String,
}

/// Signed-in user as shown to the portal
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUser {
    pub id: String,
    pub user_id: String,
    pub full_name: String,
}

impl From<&SessionUser> for LoginUser {
    fn from(user: &SessionUser) -> Self {
        Self {
            id: user.id.to_string(),
            user_id: user.login_id.clone(),
            full_name: user.display_name.clone(),
        }
    }
}

/// Login response
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<LoginUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_access: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<OutcomeKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_attempts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_minutes: Option<i64>,
    /// Seconds until the address may try again
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
    /// Fault detail, debug mode only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<&AuthOutcome> for LoginResponse {
    fn from(outcome: &AuthOutcome) -> Self {
        if let AuthOutcome::Authenticated {
            user,
            emergency_access,
            ..
        } = outcome
        {
            return Self {
                success: true,
                user: Some(LoginUser::from(user)),
                emergency_access: emergency_access.then_some(true),
                ..Default::default()
            };
        }

        let mut response = Self {
            success: false,
            error: Some(outcome.message()),
            error_code: Some(outcome.kind()),
            ..Default::default()
        };
        match outcome {
            AuthOutcome::InvalidCredentials { remaining_attempts } => {
                response.remaining_attempts = *remaining_attempts;
            }
            AuthOutcome::AccountLocked { remaining_minutes } => {
                response.locked = Some(true);
                response.lock_minutes = Some(*remaining_minutes);
            }
            AuthOutcome::AccountLockedNow { lockout_minutes } => {
                response.locked = Some(true);
                response.lock_minutes = Some(*lockout_minutes);
            }
            AuthOutcome::RateLimited { retry_after_secs } => {
                response.retry_after = Some(*retry_after_secs);
            }
            AuthOutcome::SystemError { detail } => {
                response.details = detail.clone();
            }
            _ => {}
        }
        response
    }
}

// ============================================================================
// Logout
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

// ============================================================================
// Session Status
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUserResponse {
    pub id: String,
    pub user_id: String,
    pub full_name: String,
    pub expires_at: DateTime<Utc>,
}

/// Session status response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUserResponse>,
}

impl From<Option<SessionUser>> for SessionStatusResponse {
    fn from(user: Option<SessionUser>) -> Self {
        Self {
            authenticated: user.is_some(),
            user: user.map(|u| SessionUserResponse {
                id: u.id.to_string(),
                user_id: u.login_id,
                full_name: u.display_name,
                expires_at: u.expires_at,
            }),
        }
    }
}

// ============================================================================
// Unlock
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockResponse {
    pub success: bool,
    pub user_id: String,
}
