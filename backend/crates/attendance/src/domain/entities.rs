//! Domain Entities
//!
//! Core business entities for the attendance domain.

use chrono::{DateTime, Duration, Utc};
use kernel::id::{EmployeeId, NodeId, TapEventId};

use crate::domain::value_objects::{Direction, NodeStatus, TapDuration};

/// Employee resolved from an active card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardOwner {
    pub employee_id: EmployeeId,
    pub display_name: String,
}

/// Persisted tap. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapEvent {
    pub id: TapEventId,
    pub employee_id: EmployeeId,
    pub card_uid: String,
    pub tapped_at: DateTime<Utc>,
    pub direction: Direction,
    pub node_id: Option<NodeId>,
    pub location: String,
}

/// Tap to be inserted; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewTap {
    pub employee_id: EmployeeId,
    pub card_uid: String,
    pub tapped_at: DateTime<Utc>,
    pub direction: Direction,
    pub node_id: Option<NodeId>,
    pub location: String,
}

impl NewTap {
    pub fn into_event(self, id: TapEventId) -> TapEvent {
        TapEvent {
            id,
            employee_id: self.employee_id,
            card_uid: self.card_uid,
            tapped_at: self.tapped_at,
            direction: self.direction,
            node_id: self.node_id,
            location: self.location,
        }
    }
}

/// NFC reader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub location: String,
    pub last_heartbeat: Option<DateTime<Utc>>,
}

impl Node {
    pub fn status(&self, now: DateTime<Utc>, offline_after: Duration) -> NodeStatus {
        NodeStatus::from_heartbeat(self.last_heartbeat, now, offline_after)
    }
}

/// Counts for one calendar day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayStats {
    /// Distinct employees with at least one tap
    pub total_employees: u64,
    pub total_check_ins: u64,
    pub total_check_outs: u64,
}

/// One IN→OUT pair from a day's timeline.
///
/// `check_in` is absent for an OUT with no preceding IN; `check_out` is
/// absent while the employee is still checked in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkSession {
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
    pub duration: Option<TapDuration>,
}

impl WorkSession {
    pub fn is_open(&self) -> bool {
        self.check_in.is_some() && self.check_out.is_none()
    }
}
