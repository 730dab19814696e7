//! Admin Portal Server Entry Point
//!
//! Wires the auth and attendance contexts into one axum server.
//! Uses `anyhow` for startup errors; handlers use the per-crate error types.

mod cli;
mod settings;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use attendance::{PgAttendanceRepository, attendance_routers};
use auth::{AdminSessionGuard, PgAuthRepository, auth_router, require_admin_session};
use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
    middleware::from_fn_with_state,
    response::IntoResponse,
};
use clap::Parser;
use kernel::error::app_error::AppError;
use platform::clock::{Clock, SystemClock};
use platform::rate_limit::{InMemoryRateLimiter, spawn_sweeper};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};
use crate::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    match Cli::parse().command {
        Some(Command::HashPassword) => return cli::hash_password(),
        Some(Command::GeneratePassword) => return cli::generate_password(),
        Some(Command::Serve) | None => {}
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "portal=info,auth=info,attendance=info,platform=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&settings.database_url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let auth_config = Arc::new(settings.auth);

    // Login budget per source address, swept in the background
    let limiter = Arc::new(InMemoryRateLimiter::with_clock(
        auth_config.login_rate_limit.clone(),
        clock.clone(),
    ));
    let _sweeper = spawn_sweeper(limiter.clone(), settings.sweep_every);

    let guard = AdminSessionGuard::new(auth_config.clone(), clock);
    let (device_routes, admin_routes) =
        attendance_routers(PgAttendanceRepository::new(pool.clone()), settings.attendance);

    let api = Router::new()
        .nest(
            "/auth",
            auth_router(PgAuthRepository::new(pool.clone()), limiter, auth_config),
        )
        .merge(device_routes)
        .merge(admin_routes.route_layer(from_fn_with_state(guard, require_admin_session)))
        .fallback(not_found);

    let allowed_origins: Vec<HeaderValue> = settings
        .frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    let app = with_security_headers(Router::new().nest("/api", api))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    tracing::info!("Listening on {}", settings.bind_addr);

    let listener = TcpListener::bind(settings.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

async fn not_found() -> impl IntoResponse {
    AppError::not_found("Route not found")
}

const SECURITY_HEADERS: [(&str, &str); 5] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    ("permissions-policy", "camera=(), microphone=(), geolocation=()"),
    ("content-security-policy", "default-src 'none'; frame-ancestors 'none'"),
];

fn with_security_headers(router: Router) -> Router {
    SECURITY_HEADERS
        .into_iter()
        .fold(router, |router, (name, value)| {
            router.layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            ))
        })
}
