//! Environment-driven configuration for the portal binary.

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail};
use attendance::AttendanceConfig;
use auth::{AuthConfig, EmergencyAccess};
use platform::crypto::from_base64;
use platform::password::HashedPassword;
use platform::rate_limit::RateLimitConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:31113";
const DEFAULT_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

pub struct Settings {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub frontend_origins: Vec<String>,
    pub sweep_every: Duration,
    pub auth: AuthConfig,
    pub attendance: AttendanceConfig,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let bind_addr = var_or("PORTAL_BIND_ADDR", DEFAULT_BIND_ADDR)
            .parse()
            .context("PORTAL_BIND_ADDR is not a socket address")?;
        let frontend_origins = var_or("FRONTEND_ORIGINS", DEFAULT_ORIGINS)
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_owned)
            .collect();

        Ok(Self {
            database_url,
            bind_addr,
            frontend_origins,
            sweep_every: Duration::from_secs(parse_or("RATE_LIMIT_SWEEP_SECS", 300)?),
            auth: auth_config()?,
            attendance: attendance_config()?,
        })
    }
}

pub fn password_pepper() -> Option<Vec<u8>> {
    env::var("PASSWORD_PEPPER")
        .ok()
        .filter(|p| !p.is_empty())
        .map(String::into_bytes)
}

fn auth_config() -> anyhow::Result<AuthConfig> {
    let base = match env::var("SESSION_SECRET") {
        Ok(encoded) => {
            let bytes = from_base64(encoded.trim()).context("SESSION_SECRET is not base64")?;
            let secret: [u8; 32] = bytes
                .try_into()
                .map_err(|_| anyhow::anyhow!("SESSION_SECRET must decode to 32 bytes"))?;
            AuthConfig {
                session_secret: secret,
                ..AuthConfig::default()
            }
        }
        Err(_) if cfg!(debug_assertions) => {
            tracing::warn!("SESSION_SECRET not set, sessions will not survive a restart");
            AuthConfig::development()
        }
        Err(_) => bail!("SESSION_SECRET must be set in production"),
    };

    let store_timeout = Duration::from_millis(parse_or(
        "STORE_TIMEOUT_MS",
        base.store_timeout.as_millis() as u64,
    )?);
    let login_rate_limit = RateLimitConfig::new(
        parse_or("LOGIN_RATE_LIMIT_MAX", base.login_rate_limit.max_requests)?,
        parse_or(
            "LOGIN_RATE_LIMIT_WINDOW_SECS",
            base.login_rate_limit.window.as_secs(),
        )?,
    );

    Ok(AuthConfig {
        cookie_secure: parse_or("COOKIE_SECURE", base.cookie_secure)?,
        expose_error_detail: parse_or("AUTH_DEBUG_ERRORS", base.expose_error_detail)?,
        password_pepper: password_pepper(),
        store_timeout,
        login_rate_limit,
        emergency_access: emergency_access()?,
        ..base
    })
}

fn emergency_access() -> anyhow::Result<Option<EmergencyAccess>> {
    let login_id = env::var("EMERGENCY_LOGIN_ID").ok().filter(|v| !v.trim().is_empty());
    let hash = env::var("EMERGENCY_PASSWORD_HASH").ok().filter(|v| !v.trim().is_empty());

    match (login_id, hash) {
        (None, None) => Ok(None),
        (Some(login_id), Some(hash)) => {
            let password_hash = HashedPassword::from_phc_string(hash.trim())
                .context("EMERGENCY_PASSWORD_HASH is not a PHC string")?;
            tracing::warn!(login_id = %login_id, "Emergency access is enabled");
            Ok(Some(EmergencyAccess {
                login_id: login_id.trim().to_owned(),
                display_name: var_or("EMERGENCY_DISPLAY_NAME", "Emergency Access"),
                password_hash,
            }))
        }
        _ => bail!("EMERGENCY_LOGIN_ID and EMERGENCY_PASSWORD_HASH must be set together"),
    }
}

fn attendance_config() -> anyhow::Result<AttendanceConfig> {
    let base = if cfg!(debug_assertions) {
        AttendanceConfig::development()
    } else {
        AttendanceConfig::default()
    };
    let offset_minutes: i32 = parse_or("ATTENDANCE_UTC_OFFSET_MINUTES", 0)?;
    let store_timeout = Duration::from_millis(parse_or(
        "STORE_TIMEOUT_MS",
        base.store_timeout.as_millis() as u64,
    )?);

    let config = AttendanceConfig {
        default_location: var_or("DEFAULT_TAP_LOCATION", &base.default_location),
        node_offline_after: Duration::from_secs(parse_or(
            "NODE_OFFLINE_AFTER_SECS",
            base.node_offline_after.as_secs(),
        )?),
        store_timeout,
        ..base
    };

    config
        .with_offset_minutes(offset_minutes)
        .context("ATTENDANCE_UTC_OFFSET_MINUTES is out of range")
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        _ => Ok(default),
    }
}
