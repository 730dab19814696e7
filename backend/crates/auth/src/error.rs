//! Auth Error Types
//!
//! Faults inside the credential core. Sign-in business failures are not
//! errors; they are [`crate::application::sign_in::AuthOutcome`] variants.
//! These integrate with the unified `kernel::error::AppError` system for
//! the endpoints that do return errors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Missing, tampered or expired session token
    #[error("Session not found or expired")]
    SessionInvalid,

    /// Unknown login identifier on an administrative operation
    #[error("Account not found")]
    AccountNotFound,

    #[error("Invalid login identifier: {0}")]
    InvalidLoginId(String),

    /// A store call exceeded the configured deadline
    #[error("Store call timed out: {0}")]
    StoreTimeout(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::SessionInvalid => ErrorKind::Unauthorized,
            AuthError::AccountNotFound => ErrorKind::NotFound,
            AuthError::InvalidLoginId(_) => ErrorKind::BadRequest,
            AuthError::StoreTimeout(_) => ErrorKind::ServiceUnavailable,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Client-safe conversion; server faults get a generic message.
    pub fn to_app_error(&self) -> AppError {
        if self.kind().is_server_error() {
            AppError::new(self.kind(), "Authentication service unavailable")
        } else {
            AppError::new(self.kind(), self.to_string())
        }
    }

    pub(crate) fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::StoreTimeout(op) => {
                tracing::error!(operation = op, "Auth store call timed out");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AuthError {
    fn from(err: tokio::task::JoinError) -> Self {
        AuthError::Internal(format!("Blocking task failed: {err}"))
    }
}
