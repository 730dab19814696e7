//! In-Memory Repository
//!
//! Process-local card directory, tap log and node registry for tests and
//! local runs.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use kernel::id::{EmployeeId, NodeId, TapEventId};

use crate::domain::entities::{CardOwner, DayStats, NewTap, Node, TapEvent};
use crate::domain::repository::{CardDirectory, NodeRegistry, TapEventStore};
use crate::domain::value_objects::{CardUid, DayWindow, Direction};
use crate::error::{AttendanceError, AttendanceResult};

struct Card {
    owner: CardOwner,
    active: bool,
}

#[derive(Default)]
struct State {
    cards: HashMap<String, Card>,
    /// Insertion order is the tie-break for equal timestamps
    taps: Vec<TapEvent>,
    nodes: HashMap<NodeId, Node>,
    unavailable: bool,
}

#[derive(Default)]
pub struct InMemoryAttendanceRepository {
    state: Mutex<State>,
}

impl InMemoryAttendanceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_card(self, card_uid: &str, owner: CardOwner) -> Self {
        self.lock().cards.insert(
            card_uid.to_owned(),
            Card {
                owner,
                active: true,
            },
        );
        self
    }

    pub fn with_inactive_card(self, card_uid: &str, owner: CardOwner) -> Self {
        self.lock().cards.insert(
            card_uid.to_owned(),
            Card {
                owner,
                active: false,
            },
        );
        self
    }

    pub fn with_node(self, node: Node) -> Self {
        self.lock().nodes.insert(node.id, node);
        self
    }

    /// All taps in insertion order
    pub fn taps(&self) -> Vec<TapEvent> {
        self.lock().taps.clone()
    }

    pub fn node(&self, id: &NodeId) -> Option<Node> {
        self.lock().nodes.get(id).cloned()
    }

    /// Make every call fail as if the database were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Guard for one call, or the simulated outage.
    fn enter(&self) -> AttendanceResult<MutexGuard<'_, State>> {
        let state = self.lock();
        if state.unavailable {
            return Err(AttendanceError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(state)
    }

    fn employee_taps_in<'a>(
        state: &'a State,
        employee_id: &'a EmployeeId,
        day: &'a DayWindow,
    ) -> impl DoubleEndedIterator<Item = &'a TapEvent> + 'a {
        state
            .taps
            .iter()
            .filter(move |t| t.employee_id == *employee_id && day.contains(t.tapped_at))
    }
}

impl CardDirectory for InMemoryAttendanceRepository {
    async fn find_active_card_owner(&self, card_uid: &CardUid) -> AttendanceResult<Option<CardOwner>> {
        let state = self.enter()?;
        Ok(state
            .cards
            .get(card_uid.as_str())
            .filter(|card| card.active)
            .map(|card| card.owner.clone()))
    }
}

impl TapEventStore for InMemoryAttendanceRepository {
    async fn latest_tap_for_employee_today(
        &self,
        employee_id: &EmployeeId,
        day: &DayWindow,
    ) -> AttendanceResult<Option<TapEvent>> {
        let state = self.enter()?;
        // Stable sort keeps insertion order among equal timestamps
        let mut taps: Vec<&TapEvent> = Self::employee_taps_in(&state, employee_id, day).collect();
        taps.sort_by_key(|t| t.tapped_at);
        Ok(taps.last().map(|t| (*t).clone()))
    }

    async fn insert_tap(&self, tap: NewTap) -> AttendanceResult<TapEvent> {
        let mut state = self.enter()?;
        let event = tap.into_event(TapEventId::new());
        state.taps.push(event.clone());
        Ok(event)
    }

    async fn latest_in_before(
        &self,
        employee_id: &EmployeeId,
        before: DateTime<Utc>,
        day: &DayWindow,
    ) -> AttendanceResult<Option<TapEvent>> {
        let state = self.enter()?;
        let mut taps: Vec<&TapEvent> = Self::employee_taps_in(&state, employee_id, day)
            .filter(|t| t.direction == Direction::In && t.tapped_at < before)
            .collect();
        taps.sort_by_key(|t| t.tapped_at);
        Ok(taps.last().map(|t| (*t).clone()))
    }

    async fn taps_for_employee_on(
        &self,
        employee_id: &EmployeeId,
        day: &DayWindow,
    ) -> AttendanceResult<Vec<TapEvent>> {
        let state = self.enter()?;
        let mut taps: Vec<TapEvent> = Self::employee_taps_in(&state, employee_id, day)
            .cloned()
            .collect();
        taps.sort_by_key(|t| t.tapped_at);
        Ok(taps)
    }

    async fn day_stats(&self, day: &DayWindow) -> AttendanceResult<DayStats> {
        let state = self.enter()?;
        let mut employees = std::collections::HashSet::new();
        let mut stats = DayStats::default();
        for tap in state.taps.iter().filter(|t| day.contains(t.tapped_at)) {
            employees.insert(tap.employee_id);
            match tap.direction {
                Direction::In => stats.total_check_ins += 1,
                Direction::Out => stats.total_check_outs += 1,
            }
        }
        stats.total_employees = employees.len() as u64;
        Ok(stats)
    }
}

impl NodeRegistry for InMemoryAttendanceRepository {
    async fn touch_heartbeat(&self, node_id: &NodeId, at: DateTime<Utc>) -> AttendanceResult<bool> {
        let mut state = self.enter()?;
        Ok(match state.nodes.get_mut(node_id) {
            Some(node) => {
                node.last_heartbeat = Some(at);
                true
            }
            None => false,
        })
    }

    async fn resolve_location(&self, node_id: &NodeId) -> AttendanceResult<Option<String>> {
        let state = self.enter()?;
        Ok(state.nodes.get(node_id).map(|n| n.location.clone()))
    }

    async fn find_node_id_by_name(&self, name: &str) -> AttendanceResult<Option<NodeId>> {
        let state = self.enter()?;
        Ok(state.nodes.values().find(|n| n.name == name).map(|n| n.id))
    }

    async fn list_nodes(&self) -> AttendanceResult<Vec<Node>> {
        let state = self.enter()?;
        let mut nodes: Vec<Node> = state.nodes.values().cloned().collect();
        nodes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(nodes)
    }
}
