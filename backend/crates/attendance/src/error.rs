//! Attendance Error Types
//!
//! Store faults and request errors for the attendance endpoints. A tap on an
//! unknown card is not an error; it is a `TapOutcome` variant.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

pub type AttendanceResult<T> = Result<T, AttendanceError>;

#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error("UID is required")]
    CardUidRequired,

    #[error("Invalid card UID: {0}")]
    InvalidCardUid(String),

    #[error("Node name is required")]
    NodeNameRequired,

    #[error("Invalid node id: {0}")]
    InvalidNodeId(String),

    /// Date query parameter not in `YYYY-MM-DD` form
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid employee id: {0}")]
    InvalidEmployeeId(String),

    #[error("Node not found")]
    NodeNotFound,

    /// A store call exceeded the configured deadline
    #[error("Store call timed out: {0}")]
    StoreTimeout(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AttendanceError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AttendanceError::CardUidRequired
            | AttendanceError::InvalidCardUid(_)
            | AttendanceError::NodeNameRequired
            | AttendanceError::InvalidNodeId(_)
            | AttendanceError::InvalidDate(_)
            | AttendanceError::InvalidEmployeeId(_) => ErrorKind::BadRequest,
            AttendanceError::NodeNotFound => ErrorKind::NotFound,
            AttendanceError::StoreTimeout(_) => ErrorKind::ServiceUnavailable,
            AttendanceError::Database(_) | AttendanceError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Client-safe conversion; server faults get a generic message.
    pub fn to_app_error(&self) -> AppError {
        if self.kind().is_server_error() {
            AppError::new(self.kind(), "Attendance service unavailable")
        } else {
            AppError::new(self.kind(), self.to_string())
        }
    }

    pub(crate) fn log(&self) {
        match self {
            AttendanceError::Database(e) => {
                tracing::error!(error = %e, "Attendance database error");
            }
            AttendanceError::Internal(msg) => {
                tracing::error!(message = %msg, "Attendance internal error");
            }
            AttendanceError::StoreTimeout(op) => {
                tracing::error!(operation = op, "Attendance store call timed out");
            }
            _ => {
                tracing::debug!(error = %self, "Attendance request rejected");
            }
        }
    }
}

impl IntoResponse for AttendanceError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AttendanceError::CardUidRequired.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AttendanceError::NodeNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AttendanceError::StoreTimeout("insert_tap").status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_database_detail_not_leaked() {
        let app = AttendanceError::Database(sqlx::Error::PoolClosed).to_app_error();
        assert_eq!(app.message(), "Attendance service unavailable");
    }
}
