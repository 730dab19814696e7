//! Auth Middleware
//!
//! Guards admin routes with the signed session cookie. On success the
//! [`SessionUser`] is placed in request extensions for handlers.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use platform::clock::Clock;
use platform::cookie::extract_cookie;

use crate::application::config::AuthConfig;
use crate::application::{CheckSessionUseCase, SessionUser};
use crate::error::AuthError;

/// Middleware state
#[derive(Clone)]
pub struct AdminSessionGuard {
    pub config: Arc<AuthConfig>,
    pub clock: Arc<dyn Clock>,
}

impl AdminSessionGuard {
    pub fn new(config: Arc<AuthConfig>, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    pub fn session_from(&self, req: &Request) -> Option<SessionUser> {
        let token = extract_cookie(req.headers(), &self.config.session_cookie_name)?;
        CheckSessionUseCase::new(&self.config, self.clock.clone()).read_session(&token)
    }
}

/// Use with `axum::middleware::from_fn_with_state`.
pub async fn require_admin_session(
    State(guard): State<AdminSessionGuard>,
    mut req: Request,
    next: Next,
) -> Response {
    match guard.session_from(&req) {
        Some(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        None => {
            let mut response = AuthError::SessionInvalid.into_response();
            response
                .headers_mut()
                .insert("x-auth-required", axum::http::HeaderValue::from_static("true"));
            response
        }
    }
}
