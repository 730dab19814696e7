//! Auth Router

use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use platform::clock::{Clock, SystemClock};
use platform::rate_limit::{InMemoryRateLimiter, RateLimiter};

use crate::application::config::AuthConfig;
use crate::domain::repository::{AdminUserRepository, LoginAttemptSink};
use crate::infra::postgres::PgAuthRepository;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{AdminSessionGuard, require_admin_session};

/// Create the Auth router with PostgreSQL repository
pub fn auth_router(
    repo: PgAuthRepository,
    limiter: Arc<InMemoryRateLimiter>,
    config: Arc<AuthConfig>,
) -> Router {
    auth_router_generic(Arc::new(repo), limiter, Arc::new(SystemClock), config)
}

/// Create a generic Auth router for any repository implementation
pub fn auth_router_generic<R, L>(
    repo: Arc<R>,
    limiter: Arc<L>,
    clock: Arc<dyn Clock>,
    config: Arc<AuthConfig>,
) -> Router
where
    R: AdminUserRepository + LoginAttemptSink + Send + Sync + 'static,
    L: RateLimiter + Send + Sync + 'static,
{
    let guard = AdminSessionGuard::new(config.clone(), clock.clone());
    let state = AuthAppState {
        repo,
        limiter,
        clock,
        config,
    };

    let protected = Router::new()
        .route("/users/{login_id}/unlock", post(handlers::unlock::<R, L>))
        .route_layer(from_fn_with_state(guard, require_admin_session));

    Router::new()
        .route("/login", post(handlers::login::<R, L>))
        .route("/logout", post(handlers::logout::<R, L>))
        .route("/session", get(handlers::session_status::<R, L>))
        .merge(protected)
        .with_state(state)
}
