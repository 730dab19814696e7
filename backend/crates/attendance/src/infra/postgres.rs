//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::{EmployeeId, NodeId, TapEventId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{CardOwner, DayStats, NewTap, Node, TapEvent};
use crate::domain::repository::{CardDirectory, NodeRegistry, TapEventStore};
use crate::domain::value_objects::{CardUid, DayWindow};
use crate::error::{AttendanceError, AttendanceResult};

/// PostgreSQL-backed card directory, tap log and node registry
#[derive(Clone)]
pub struct PgAttendanceRepository {
    pool: PgPool,
}

impl PgAttendanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const TAP_COLUMNS: &str = r#"
    id,
    employee_id,
    nfc_card_uid,
    tap_time,
    tap_type,
    node_id,
    location
"#;

// ============================================================================
// Card Directory Implementation
// ============================================================================

impl CardDirectory for PgAttendanceRepository {
    async fn find_active_card_owner(&self, card_uid: &CardUid) -> AttendanceResult<Option<CardOwner>> {
        let row = sqlx::query_as::<_, CardOwnerRow>(
            r#"
            SELECT
                e.id AS employee_id,
                COALESCE(NULLIF(TRIM(CONCAT(e.first_name, ' ', e.last_name)), ''), 'Unknown Employee') AS display_name
            FROM nfc_cards c
            JOIN employees e ON e.id = c.employee_id
            WHERE c.card_uid = $1 AND c.is_active = TRUE
            LIMIT 1
            "#,
        )
        .bind(card_uid.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| CardOwner {
            employee_id: EmployeeId::from_uuid(r.employee_id),
            display_name: r.display_name,
        }))
    }
}

// ============================================================================
// Tap Event Store Implementation
// ============================================================================

impl TapEventStore for PgAttendanceRepository {
    async fn latest_tap_for_employee_today(
        &self,
        employee_id: &EmployeeId,
        day: &DayWindow,
    ) -> AttendanceResult<Option<TapEvent>> {
        let row = sqlx::query_as::<_, TapRow>(&format!(
            r#"
            SELECT {TAP_COLUMNS}
            FROM attendance_records
            WHERE employee_id = $1 AND tap_time >= $2 AND tap_time < $3
            ORDER BY tap_time DESC, tap_seq DESC
            LIMIT 1
            "#
        ))
        .bind(employee_id.as_uuid())
        .bind(day.start())
        .bind(day.end())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_tap_event()).transpose()
    }

    async fn insert_tap(&self, tap: NewTap) -> AttendanceResult<TapEvent> {
        let id = TapEventId::new();
        sqlx::query(
            r#"
            INSERT INTO attendance_records (
                id,
                employee_id,
                nfc_card_uid,
                tap_time,
                tap_type,
                node_id,
                location
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(id.as_uuid())
        .bind(tap.employee_id.as_uuid())
        .bind(&tap.card_uid)
        .bind(tap.tapped_at)
        .bind(tap.direction.as_str())
        .bind(tap.node_id.map(|n| n.into_uuid()))
        .bind(&tap.location)
        .execute(&self.pool)
        .await?;

        Ok(tap.into_event(id))
    }

    async fn latest_in_before(
        &self,
        employee_id: &EmployeeId,
        before: DateTime<Utc>,
        day: &DayWindow,
    ) -> AttendanceResult<Option<TapEvent>> {
        let row = sqlx::query_as::<_, TapRow>(&format!(
            r#"
            SELECT {TAP_COLUMNS}
            FROM attendance_records
            WHERE employee_id = $1
              AND tap_type = 'IN'
              AND tap_time >= $2
              AND tap_time < $3
            ORDER BY tap_time DESC, tap_seq DESC
            LIMIT 1
            "#
        ))
        .bind(employee_id.as_uuid())
        .bind(day.start())
        .bind(before.min(day.end()))
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_tap_event()).transpose()
    }

    async fn taps_for_employee_on(
        &self,
        employee_id: &EmployeeId,
        day: &DayWindow,
    ) -> AttendanceResult<Vec<TapEvent>> {
        let rows = sqlx::query_as::<_, TapRow>(&format!(
            r#"
            SELECT {TAP_COLUMNS}
            FROM attendance_records
            WHERE employee_id = $1 AND tap_time >= $2 AND tap_time < $3
            ORDER BY tap_time ASC, tap_seq ASC
            "#
        ))
        .bind(employee_id.as_uuid())
        .bind(day.start())
        .bind(day.end())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_tap_event()).collect()
    }

    async fn day_stats(&self, day: &DayWindow) -> AttendanceResult<DayStats> {
        let row = sqlx::query_as::<_, DayStatsRow>(
            r#"
            SELECT
                COUNT(DISTINCT employee_id) AS total_employees,
                COUNT(*) FILTER (WHERE tap_type = 'IN') AS total_check_ins,
                COUNT(*) FILTER (WHERE tap_type = 'OUT') AS total_check_outs
            FROM attendance_records
            WHERE tap_time >= $1 AND tap_time < $2
            "#,
        )
        .bind(day.start())
        .bind(day.end())
        .fetch_one(&self.pool)
        .await?;

        Ok(DayStats {
            total_employees: row.total_employees.max(0) as u64,
            total_check_ins: row.total_check_ins.max(0) as u64,
            total_check_outs: row.total_check_outs.max(0) as u64,
        })
    }
}

// ============================================================================
// Node Registry Implementation
// ============================================================================

impl NodeRegistry for PgAttendanceRepository {
    async fn touch_heartbeat(&self, node_id: &NodeId, at: DateTime<Utc>) -> AttendanceResult<bool> {
        let updated = sqlx::query("UPDATE nfc_nodes SET last_heartbeat = $2 WHERE node_id = $1")
            .bind(node_id.as_uuid())
            .bind(at)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(updated > 0)
    }

    async fn resolve_location(&self, node_id: &NodeId) -> AttendanceResult<Option<String>> {
        let location: Option<String> =
            sqlx::query_scalar("SELECT location FROM nfc_nodes WHERE node_id = $1")
                .bind(node_id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;

        Ok(location.filter(|l| !l.trim().is_empty()))
    }

    async fn find_node_id_by_name(&self, name: &str) -> AttendanceResult<Option<NodeId>> {
        let id: Option<Uuid> =
            sqlx::query_scalar("SELECT node_id FROM nfc_nodes WHERE node_name = $1 LIMIT 1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;

        Ok(id.map(NodeId::from_uuid))
    }

    async fn list_nodes(&self) -> AttendanceResult<Vec<Node>> {
        let rows = sqlx::query_as::<_, NodeRow>(
            r#"
            SELECT node_id, node_name, location, last_heartbeat
            FROM nfc_nodes
            ORDER BY node_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Node {
                id: NodeId::from_uuid(r.node_id),
                name: r.node_name,
                location: r.location,
                last_heartbeat: r.last_heartbeat,
            })
            .collect())
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(sqlx::FromRow)]
struct CardOwnerRow {
    employee_id: Uuid,
    display_name: String,
}

#[derive(sqlx::FromRow)]
struct TapRow {
    id: Uuid,
    employee_id: Uuid,
    nfc_card_uid: String,
    tap_time: DateTime<Utc>,
    tap_type: String,
    node_id: Option<Uuid>,
    location: String,
}

impl TapRow {
    fn into_tap_event(self) -> AttendanceResult<TapEvent> {
        let direction = self
            .tap_type
            .parse()
            .map_err(|e| AttendanceError::Internal(format!("Invalid tap_type: {e}")))?;

        Ok(TapEvent {
            id: TapEventId::from_uuid(self.id),
            employee_id: EmployeeId::from_uuid(self.employee_id),
            card_uid: self.nfc_card_uid,
            tapped_at: self.tap_time,
            direction,
            node_id: self.node_id.map(NodeId::from_uuid),
            location: self.location,
        })
    }
}

#[derive(sqlx::FromRow)]
struct DayStatsRow {
    total_employees: i64,
    total_check_ins: i64,
    total_check_outs: i64,
}

#[derive(sqlx::FromRow)]
struct NodeRow {
    node_id: Uuid,
    node_name: String,
    location: String,
    last_heartbeat: Option<DateTime<Utc>>,
}
