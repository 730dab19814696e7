//! HTTP Handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::NaiveDate;
use kernel::id::{EmployeeId, NodeId};
use platform::clock::Clock;

use crate::application::config::AttendanceConfig;
use crate::application::{
    DailyStatsUseCase, EmployeeDayUseCase, HeartbeatOutcome, HeartbeatUseCase, RecordTapUseCase,
    TapInput, TapOutcome,
};
use crate::domain::repository::{CardDirectory, NodeRegistry, TapEventStore};
use crate::domain::value_objects::{CardUid, CardUidError};
use crate::error::{AttendanceError, AttendanceResult};
use crate::presentation::dto::{
    DailyStatsResponse, DateQuery, DeviceErrorResponse, EmployeeDayResponse, HeartbeatRequest,
    HeartbeatResponse, NodeResponse, TapRequest, TapResponse,
};

/// Shared state for attendance handlers
pub struct AttendanceAppState<R> {
    pub repo: Arc<R>,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<AttendanceConfig>,
}

impl<R> Clone for AttendanceAppState<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            clock: self.clock.clone(),
            config: self.config.clone(),
        }
    }
}

fn parse_date(raw: Option<&str>) -> AttendanceResult<Option<NaiveDate>> {
    raw.filter(|d| !d.trim().is_empty())
        .map(|d| {
            NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d")
                .map_err(|_| AttendanceError::InvalidDate(d.to_owned()))
        })
        .transpose()
}

fn parse_tap_request(req: TapRequest) -> AttendanceResult<TapInput> {
    let card_uid = CardUid::parse(&req.uid).map_err(|e| match e {
        CardUidError::Empty => AttendanceError::CardUidRequired,
        other => AttendanceError::InvalidCardUid(other.to_string()),
    })?;
    let node_id = req
        .node_id
        .filter(|id| !id.trim().is_empty())
        .map(|id| {
            id.trim()
                .parse::<NodeId>()
                .map_err(|_| AttendanceError::InvalidNodeId(id.clone()))
        })
        .transpose()?;

    Ok(TapInput { card_uid, node_id })
}

// ============================================================================
// Device-facing
// ============================================================================

/// POST /api/attendance/tap
pub async fn record_tap<R>(
    State(state): State<AttendanceAppState<R>>,
    body: Result<Json<TapRequest>, JsonRejection>,
) -> Response
where
    R: CardDirectory + TapEventStore + NodeRegistry + Send + Sync + 'static,
{
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let input = match parse_tap_request(req) {
        Ok(input) => input,
        Err(e) => {
            return (
                e.status_code(),
                Json(DeviceErrorResponse::new(e.to_string(), None)),
            )
                .into_response();
        }
    };

    let use_case = RecordTapUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.clock.clone(),
        state.config.clone(),
    );

    match use_case.record_tap(input).await {
        TapOutcome::Recorded(tap) => Json(TapResponse::from(tap)).into_response(),
        TapOutcome::CardNotRecognized => (
            StatusCode::NOT_FOUND,
            Json(DeviceErrorResponse::new("Card not recognized", None)),
        )
            .into_response(),
        TapOutcome::SystemError { detail } => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(DeviceErrorResponse::new("Server error", detail)),
        )
            .into_response(),
    }
}

/// POST /api/nodes/heartbeat
pub async fn heartbeat<R>(
    State(state): State<AttendanceAppState<R>>,
    body: Result<Json<HeartbeatRequest>, JsonRejection>,
) -> Response
where
    R: NodeRegistry + Send + Sync + 'static,
{
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let use_case = HeartbeatUseCase::new(state.repo.clone(), state.clock.clone(), state.config.clone());

    match use_case.heartbeat(&req.name).await {
        Ok(HeartbeatOutcome::Accepted { node_id }) => Json(HeartbeatResponse {
            success: true,
            node_id: node_id.to_string(),
        })
        .into_response(),
        Ok(HeartbeatOutcome::NodeNotFound) => (
            StatusCode::NOT_FOUND,
            Json(DeviceErrorResponse::new("Node not found", None)),
        )
            .into_response(),
        Err(e) => {
            e.log();
            (
                e.status_code(),
                Json(DeviceErrorResponse::new(e.to_app_error().message().to_owned(), None)),
            )
                .into_response()
        }
    }
}

// ============================================================================
// Admin (session required)
// ============================================================================

/// GET /api/attendance/stats?date=YYYY-MM-DD
pub async fn daily_stats<R>(
    State(state): State<AttendanceAppState<R>>,
    Query(query): Query<DateQuery>,
) -> AttendanceResult<Json<DailyStatsResponse>>
where
    R: TapEventStore + Send + Sync + 'static,
{
    let date = parse_date(query.date.as_deref())?;
    let use_case = DailyStatsUseCase::new(state.repo.clone(), state.clock.clone(), state.config.clone());
    let report = use_case.daily_stats(date).await?;
    Ok(Json(report.into()))
}

/// GET /api/employees/{id}/attendance?date=YYYY-MM-DD
pub async fn employee_day<R>(
    State(state): State<AttendanceAppState<R>>,
    Path(employee_id): Path<String>,
    Query(query): Query<DateQuery>,
) -> AttendanceResult<Json<EmployeeDayResponse>>
where
    R: TapEventStore + Send + Sync + 'static,
{
    let employee_id = employee_id
        .parse::<EmployeeId>()
        .map_err(|_| AttendanceError::InvalidEmployeeId(employee_id.clone()))?;
    let date = parse_date(query.date.as_deref())?;

    let use_case = EmployeeDayUseCase::new(state.repo.clone(), state.clock.clone(), state.config.clone());
    let day = use_case.employee_day(employee_id, date).await?;
    Ok(Json(day.into()))
}

/// GET /api/nodes
pub async fn list_nodes<R>(
    State(state): State<AttendanceAppState<R>>,
) -> AttendanceResult<Json<Vec<NodeResponse>>>
where
    R: NodeRegistry + Send + Sync + 'static,
{
    let use_case = HeartbeatUseCase::new(state.repo.clone(), state.clock.clone(), state.config.clone());
    let nodes = use_case.node_statuses().await?;
    Ok(Json(nodes.into_iter().map(Into::into).collect()))
}
