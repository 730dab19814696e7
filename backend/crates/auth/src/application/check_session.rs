//! Check Session Use Case
//!
//! Reads the signed session token. Nothing is looked up server-side.

use std::sync::Arc;

use platform::clock::Clock;

use crate::application::config::AuthConfig;
use crate::application::session_token::{SessionCodec, SessionUser};
use crate::error::{AuthError, AuthResult};

/// Check session use case
pub struct CheckSessionUseCase {
    codec: SessionCodec,
    clock: Arc<dyn Clock>,
}

impl CheckSessionUseCase {
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            codec: SessionCodec::new(config.session_secret, config.session_ttl),
            clock,
        }
    }

    /// Tampered, expired or malformed tokens all read as `None`.
    pub fn read_session(&self, token: &str) -> Option<SessionUser> {
        self.codec.read(token, self.clock.now())
    }

    /// Same as [`Self::read_session`] for callers that need an error.
    pub fn require_session(&self, token: Option<&str>) -> AuthResult<SessionUser> {
        token
            .and_then(|t| self.read_session(t))
            .ok_or(AuthError::SessionInvalid)
    }
}
