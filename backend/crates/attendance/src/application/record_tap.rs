//! Record Tap Use Case
//!
//! Card tap → IN/OUT event. Direction is derived on every call from the
//! latest persisted tap of the same day; nothing is cached between calls.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::{EmployeeId, NodeId, TapEventId};
use platform::clock::Clock;

use crate::application::bounded;
use crate::application::config::AttendanceConfig;
use crate::domain::entities::NewTap;
use crate::domain::repository::{CardDirectory, NodeRegistry, TapEventStore};
use crate::domain::services::duration_since_check_in;
use crate::domain::value_objects::{CardUid, DayWindow, Direction, TapDuration};
use crate::error::AttendanceResult;

#[derive(Debug, Clone)]
pub struct TapInput {
    pub card_uid: CardUid,
    pub node_id: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedTap {
    pub event_id: TapEventId,
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub direction: Direction,
    pub location: String,
    /// Server time, never client-supplied
    pub tapped_at: DateTime<Utc>,
    /// Only for OUT with a same-day IN before it
    pub duration: Option<TapDuration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapOutcome {
    Recorded(RecordedTap),
    /// Unknown or inactive card; nothing was written
    CardNotRecognized,
    SystemError {
        detail: Option<String>,
    },
}

/// Record tap use case
pub struct RecordTapUseCase<C, T, N>
where
    C: CardDirectory,
    T: TapEventStore,
    N: NodeRegistry,
{
    cards: Arc<C>,
    taps: Arc<T>,
    nodes: Arc<N>,
    clock: Arc<dyn Clock>,
    config: Arc<AttendanceConfig>,
}

impl<C, T, N> RecordTapUseCase<C, T, N>
where
    C: CardDirectory,
    T: TapEventStore,
    N: NodeRegistry,
{
    pub fn new(
        cards: Arc<C>,
        taps: Arc<T>,
        nodes: Arc<N>,
        clock: Arc<dyn Clock>,
        config: Arc<AttendanceConfig>,
    ) -> Self {
        Self {
            cards,
            taps,
            nodes,
            clock,
            config,
        }
    }

    pub async fn record_tap(&self, input: TapInput) -> TapOutcome {
        match self.execute(&input).await {
            Ok(outcome) => outcome,
            Err(e) => {
                e.log();
                tracing::error!(card_uid = %input.card_uid, "Tap not recorded");
                TapOutcome::SystemError {
                    detail: self.config.expose_error_detail.then(|| e.to_string()),
                }
            }
        }
    }

    async fn execute(&self, input: &TapInput) -> AttendanceResult<TapOutcome> {
        let timeout = self.config.store_timeout;

        let Some(owner) = bounded(
            timeout,
            "find_active_card_owner",
            self.cards.find_active_card_owner(&input.card_uid),
        )
        .await?
        else {
            tracing::warn!(card_uid = %input.card_uid, "Tap from unrecognized card");
            return Ok(TapOutcome::CardNotRecognized);
        };

        let now = self.clock.now();
        let day = self.config.day_of(now);

        let latest = bounded(
            timeout,
            "latest_tap_for_employee_today",
            self.taps.latest_tap_for_employee_today(&owner.employee_id, &day),
        )
        .await?;
        let direction = Direction::following(latest.map(|tap| tap.direction));

        let location = self.location_for(input.node_id.as_ref()).await;

        let event = bounded(
            timeout,
            "insert_tap",
            self.taps.insert_tap(NewTap {
                employee_id: owner.employee_id,
                card_uid: input.card_uid.as_str().to_owned(),
                tapped_at: now,
                direction,
                node_id: input.node_id,
                location,
            }),
        )
        .await?;

        let duration = match direction {
            Direction::Out => self.duration_for(&event.employee_id, event.tapped_at, &day).await,
            Direction::In => None,
        };

        if let Some(node_id) = &input.node_id {
            self.touch_node(node_id, now).await;
        }

        tracing::info!(
            employee_id = %event.employee_id,
            direction = %event.direction,
            location = %event.location,
            duration = %duration.map(|d| d.to_string()).unwrap_or_default(),
            "Tap recorded"
        );

        Ok(TapOutcome::Recorded(RecordedTap {
            event_id: event.id,
            employee_id: event.employee_id,
            employee_name: owner.display_name,
            direction: event.direction,
            location: event.location,
            tapped_at: event.tapped_at,
            duration,
        }))
    }

    /// The event is already stored; a failed lookup only loses the duration.
    async fn duration_for(
        &self,
        employee_id: &EmployeeId,
        out_at: DateTime<Utc>,
        day: &DayWindow,
    ) -> Option<TapDuration> {
        let check_in = bounded(
            self.config.store_timeout,
            "latest_in_before",
            self.taps.latest_in_before(employee_id, out_at, day),
        )
        .await;

        match check_in {
            Ok(check_in) => duration_since_check_in(check_in.as_ref(), out_at),
            Err(e) => {
                e.log();
                None
            }
        }
    }

    async fn location_for(&self, node_id: Option<&NodeId>) -> String {
        let Some(node_id) = node_id else {
            return self.config.default_location.clone();
        };

        match bounded(
            self.config.store_timeout,
            "resolve_location",
            self.nodes.resolve_location(node_id),
        )
        .await
        {
            Ok(Some(location)) => location,
            Ok(None) => self.config.default_location.clone(),
            Err(e) => {
                tracing::warn!(node_id = %node_id, error = %e, "Node location lookup failed");
                self.config.default_location.clone()
            }
        }
    }

    async fn touch_node(&self, node_id: &NodeId, now: DateTime<Utc>) {
        match bounded(
            self.config.store_timeout,
            "touch_heartbeat",
            self.nodes.touch_heartbeat(node_id, now),
        )
        .await
        {
            Ok(true) => {}
            Ok(false) => tracing::warn!(node_id = %node_id, "Tap from unregistered node"),
            Err(e) => tracing::warn!(node_id = %node_id, error = %e, "Node heartbeat update failed"),
        }
    }
}
