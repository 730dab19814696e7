//! HTTP Handlers

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, Extension, Path, State};
use axum::http::{Extensions, HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};

use platform::client::extract_client_ip;
use platform::clock::Clock;
use platform::cookie::extract_cookie;
use platform::rate_limit::RateLimiter;

use crate::application::config::AuthConfig;
use crate::application::{
    AuthOutcome, CheckSessionUseCase, SessionUser, SignInInput, SignInUseCase, SignOutUseCase,
    UnlockAccountUseCase,
};
use crate::domain::repository::{AdminUserRepository, LoginAttemptSink};
use crate::error::AuthResult;
use crate::presentation::dto::{
    LoginRequest, LoginResponse, LogoutResponse, SessionStatusResponse, UnlockResponse,
};

pub const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Shared state for auth handlers
pub struct AuthAppState<R, L> {
    pub repo: Arc<R>,
    pub limiter: Arc<L>,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<AuthConfig>,
}

impl<R, L> Clone for AuthAppState<R, L> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            limiter: self.limiter.clone(),
            clock: self.clock.clone(),
            config: self.config.clone(),
        }
    }
}

fn status_for(outcome: &AuthOutcome) -> StatusCode {
    match outcome {
        AuthOutcome::Authenticated { .. } => StatusCode::OK,
        AuthOutcome::ValidationError { .. } => StatusCode::BAD_REQUEST,
        AuthOutcome::InvalidCredentials { .. } => StatusCode::UNAUTHORIZED,
        AuthOutcome::AccountDisabled => StatusCode::FORBIDDEN,
        AuthOutcome::AccountLocked { .. } | AuthOutcome::AccountLockedNow { .. } => {
            StatusCode::LOCKED
        }
        AuthOutcome::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        AuthOutcome::SystemError { .. } => StatusCode::SERVICE_UNAVAILABLE,
    }
}

// ============================================================================
// Login
// ============================================================================

/// POST /api/auth/login
pub async fn login<R, L>(
    State(state): State<AuthAppState<R, L>>,
    headers: HeaderMap,
    extensions: Extensions,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Response
where
    R: AdminUserRepository + LoginAttemptSink + Send + Sync + 'static,
    L: RateLimiter + Send + Sync + 'static,
{
    let direct_ip = extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip());
    let source_address = extract_client_ip(&headers, direct_ip);

    // Malformed bodies still count against the rate limit
    let req = body.map(|Json(req)| req).unwrap_or_default();

    let use_case = SignInUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.limiter.clone(),
        state.clock.clone(),
        state.config.clone(),
    );

    let outcome = use_case
        .authenticate(SignInInput {
            login_id: req.user_id.trim().to_owned(),
            password: req.password.trim().to_owned(),
            source_address,
        })
        .await;

    let mut response = (status_for(&outcome), Json(LoginResponse::from(&outcome))).into_response();
    let response_headers = response.headers_mut();

    match &outcome {
        AuthOutcome::Authenticated {
            session,
            rate_limit_remaining,
            ..
        } => {
            if let Some(cookie) = state.config.cookie().set_cookie_header(&session.token) {
                response_headers.insert(header::SET_COOKIE, cookie);
            }
            if let Some(remaining) = rate_limit_remaining {
                response_headers.insert(RATE_LIMIT_REMAINING_HEADER, HeaderValue::from(*remaining));
            }
        }
        AuthOutcome::RateLimited { retry_after_secs } => {
            response_headers.insert(header::RETRY_AFTER, HeaderValue::from(*retry_after_secs));
        }
        _ => {}
    }

    response
}

// ============================================================================
// Logout
// ============================================================================

/// POST /api/auth/logout
pub async fn logout<R, L>(
    State(state): State<AuthAppState<R, L>>,
    headers: HeaderMap,
) -> impl IntoResponse
where
    R: Send + Sync + 'static,
    L: Send + Sync + 'static,
{
    let user = extract_cookie(&headers, &state.config.session_cookie_name).and_then(|token| {
        CheckSessionUseCase::new(&state.config, state.clock.clone()).read_session(&token)
    });

    let revocation = SignOutUseCase::new(&state.config).revoke_session(user.as_ref());
    let mut response = Json(LogoutResponse { success: true }).into_response();
    if let Some(cookie) = revocation.cookie.delete_cookie_header() {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    response
}

// ============================================================================
// Session Status
// ============================================================================

/// GET /api/auth/session
pub async fn session_status<R, L>(
    State(state): State<AuthAppState<R, L>>,
    headers: HeaderMap,
) -> Json<SessionStatusResponse>
where
    R: Send + Sync + 'static,
    L: Send + Sync + 'static,
{
    let user = extract_cookie(&headers, &state.config.session_cookie_name).and_then(|token| {
        CheckSessionUseCase::new(&state.config, state.clock.clone()).read_session(&token)
    });

    Json(SessionStatusResponse::from(user))
}

// ============================================================================
// Unlock (requires admin session)
// ============================================================================

/// POST /api/auth/users/{login_id}/unlock
pub async fn unlock<R, L>(
    State(state): State<AuthAppState<R, L>>,
    Extension(admin): Extension<SessionUser>,
    Path(login_id): Path<String>,
) -> AuthResult<Json<UnlockResponse>>
where
    R: AdminUserRepository + Send + Sync + 'static,
    L: Send + Sync + 'static,
{
    let use_case = UnlockAccountUseCase::new(state.repo.clone(), state.config.store_timeout);
    use_case.reset_lockout(&login_id, &admin.login_id).await?;

    Ok(Json(UnlockResponse {
        success: true,
        user_id: login_id,
    }))
}
