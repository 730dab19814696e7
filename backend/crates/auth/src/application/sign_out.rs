//! Sign Out Use Case
//!
//! Sessions are stateless, so signing out only tells the boundary which
//! cookie to clear.

use platform::cookie::CookieConfig;

use crate::application::config::AuthConfig;
use crate::application::session_token::SessionUser;

/// Instruction for the boundary
#[derive(Debug, Clone)]
pub struct SessionRevocation {
    pub cookie: CookieConfig,
}

impl SessionRevocation {
    /// `Set-Cookie` value that expires the client-held token.
    pub fn clear_cookie(&self) -> String {
        self.cookie.build_delete_cookie()
    }
}

/// Sign out use case
pub struct SignOutUseCase {
    cookie: CookieConfig,
}

impl SignOutUseCase {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            cookie: config.cookie(),
        }
    }

    pub fn revoke_session(&self, user: Option<&SessionUser>) -> SessionRevocation {
        if let Some(user) = user {
            tracing::info!(user_id = %user.id, login_id = %user.login_id, "Admin signed out");
        }
        SessionRevocation {
            cookie: self.cookie.clone(),
        }
    }
}
