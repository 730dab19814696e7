//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

use platform::cookie::CookieConfig;
use platform::password::HashedPassword;
use platform::rate_limit::RateLimitConfig;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Break-glass sign-in, disabled unless explicitly configured.
///
/// Credentials come from deployment configuration; nothing is built in.
#[derive(Debug, Clone)]
pub struct EmergencyAccess {
    pub login_id: String,
    pub display_name: String,
    pub password_hash: HashedPassword,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub session_cookie_name: String,
    /// HMAC-SHA256 key for session tokens
    pub session_secret: [u8; 32],
    /// Session lifetime (7 days)
    pub session_ttl: Duration,
    pub cookie_secure: bool,
    pub cookie_same_site: SameSite,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Deadline applied to each credential-store and audit call
    pub store_timeout: Duration,
    /// Include fault detail in `SystemError` outcomes (never in production)
    pub expose_error_detail: bool,
    /// Per-address sign-in budget
    pub login_rate_limit: RateLimitConfig,
    pub emergency_access: Option<EmergencyAccess>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "admin_session".to_string(),
            session_secret: [0u8; 32],
            session_ttl: Duration::from_secs(7 * 24 * 3600),
            cookie_secure: true,
            cookie_same_site: SameSite::Strict,
            password_pepper: None,
            store_timeout: Duration::from_secs(5),
            expose_error_detail: false,
            login_rate_limit: RateLimitConfig::default(),
            emergency_access: None,
        }
    }
}

impl AuthConfig {
    /// Config with a random session secret
    pub fn with_random_secret() -> Self {
        use rand::RngCore;
        let mut secret = [0u8; 32];
        rand::rng().fill_bytes(&mut secret);
        Self {
            session_secret: secret,
            ..Default::default()
        }
    }

    /// Development settings: insecure cookie, error detail in outcomes
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            expose_error_detail: true,
            ..Self::with_random_secret()
        }
    }

    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }

    pub fn session_ttl_secs(&self) -> i64 {
        self.session_ttl.as_secs() as i64
    }

    pub fn cookie(&self) -> CookieConfig {
        CookieConfig {
            name: self.session_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: Some(self.session_ttl_secs()),
        }
    }
}
