//! Repository Traits
//!
//! Interfaces for the card directory, tap log and node registry.
//! Implementations live in the infrastructure layer.

use chrono::{DateTime, Utc};
use kernel::id::{EmployeeId, NodeId};

use crate::domain::entities::{CardOwner, DayStats, NewTap, Node, TapEvent};
use crate::domain::value_objects::{CardUid, DayWindow};
use crate::error::AttendanceResult;

/// Active-card lookup
#[trait_variant::make(CardDirectory: Send)]
pub trait LocalCardDirectory {
    /// `None` for unknown or deactivated cards.
    async fn find_active_card_owner(&self, card_uid: &CardUid) -> AttendanceResult<Option<CardOwner>>;
}

/// Append-only tap log. Ties on `tapped_at` are broken by insertion order.
#[trait_variant::make(TapEventStore: Send)]
pub trait LocalTapEventStore {
    async fn latest_tap_for_employee_today(
        &self,
        employee_id: &EmployeeId,
        day: &DayWindow,
    ) -> AttendanceResult<Option<TapEvent>>;

    async fn insert_tap(&self, tap: NewTap) -> AttendanceResult<TapEvent>;

    /// Latest IN within `day` strictly before `before`.
    async fn latest_in_before(
        &self,
        employee_id: &EmployeeId,
        before: DateTime<Utc>,
        day: &DayWindow,
    ) -> AttendanceResult<Option<TapEvent>>;

    /// All taps in `day`, oldest first.
    async fn taps_for_employee_on(
        &self,
        employee_id: &EmployeeId,
        day: &DayWindow,
    ) -> AttendanceResult<Vec<TapEvent>>;

    async fn day_stats(&self, day: &DayWindow) -> AttendanceResult<DayStats>;
}

/// Reader registry
#[trait_variant::make(NodeRegistry: Send)]
pub trait LocalNodeRegistry {
    /// Returns `false` when no such node exists.
    async fn touch_heartbeat(&self, node_id: &NodeId, at: DateTime<Utc>) -> AttendanceResult<bool>;

    async fn resolve_location(&self, node_id: &NodeId) -> AttendanceResult<Option<String>>;

    async fn find_node_id_by_name(&self, name: &str) -> AttendanceResult<Option<NodeId>>;

    async fn list_nodes(&self) -> AttendanceResult<Vec<Node>>;
}
