//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::application::{DailyStatsReport, EmployeeDay, NodeView, RecordedTap};
use crate::domain::entities::{TapEvent, WorkSession};
use crate::domain::value_objects::{Direction, NodeStatus};

// ============================================================================
// Tap (device-facing)
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TapRequest {
    pub uid: String,
    pub node_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TapResponse {
    pub success: bool,
    pub employee_id: String,
    pub employee_name: String,
    pub direction: Direction,
    pub location: String,
    pub tapped_at: DateTime<Utc>,
    /// `"Xh Ym"`, OUT taps only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<i64>,
}

impl From<RecordedTap> for TapResponse {
    fn from(tap: RecordedTap) -> Self {
        Self {
            success: true,
            employee_id: tap.employee_id.to_string(),
            employee_name: tap.employee_name,
            direction: tap.direction,
            location: tap.location,
            tapped_at: tap.tapped_at,
            duration: tap.duration.map(|d| d.to_string()),
            duration_seconds: tap.duration.map(|d| d.as_seconds()),
        }
    }
}

/// Failure body for device-facing endpoints
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl DeviceErrorResponse {
    pub fn new(error: impl Into<String>, details: Option<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            details,
        }
    }
}

// ============================================================================
// Heartbeat (device-facing)
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HeartbeatRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatResponse {
    pub success: bool,
    pub node_id: String,
}

// ============================================================================
// Stats / timelines (admin)
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateQuery {
    /// `YYYY-MM-DD`; today when absent
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStatsResponse {
    pub date: NaiveDate,
    pub total_employees: u64,
    pub total_check_ins: u64,
    pub total_check_outs: u64,
}

impl From<DailyStatsReport> for DailyStatsResponse {
    fn from(report: DailyStatsReport) -> Self {
        Self {
            date: report.date,
            total_employees: report.stats.total_employees,
            total_check_ins: report.stats.total_check_ins,
            total_check_outs: report.stats.total_check_outs,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TapRecordResponse {
    pub id: String,
    pub tap_time: DateTime<Utc>,
    pub tap_type: Direction,
    pub card_uid: String,
    pub location: String,
}

impl From<TapEvent> for TapRecordResponse {
    fn from(tap: TapEvent) -> Self {
        Self {
            id: tap.id.to_string(),
            tap_time: tap.tapped_at,
            tap_type: tap.direction,
            card_uid: tap.card_uid,
            location: tap.location,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkSessionResponse {
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
    pub duration: Option<String>,
    pub open: bool,
}

impl From<WorkSession> for WorkSessionResponse {
    fn from(session: WorkSession) -> Self {
        Self {
            open: session.is_open(),
            check_in: session.check_in,
            check_out: session.check_out,
            duration: session.duration.map(|d| d.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDayResponse {
    pub employee_id: String,
    pub date: NaiveDate,
    pub records: Vec<TapRecordResponse>,
    pub sessions: Vec<WorkSessionResponse>,
    pub total_duration: String,
    pub checked_in: bool,
}

impl From<EmployeeDay> for EmployeeDayResponse {
    fn from(day: EmployeeDay) -> Self {
        Self {
            employee_id: day.employee_id.to_string(),
            date: day.date,
            total_duration: day.total.to_string(),
            checked_in: day.checked_in,
            records: day.taps.into_iter().map(Into::into).collect(),
            sessions: day.sessions.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeResponse {
    pub node_id: String,
    pub node_name: String,
    pub location: String,
    pub last_heartbeat: Option<DateTime<Utc>>,
    pub status: NodeStatus,
}

impl From<NodeView> for NodeResponse {
    fn from(view: NodeView) -> Self {
        Self {
            node_id: view.node.id.to_string(),
            node_name: view.node.name,
            location: view.node.location,
            last_heartbeat: view.node.last_heartbeat,
            status: view.status,
        }
    }
}
