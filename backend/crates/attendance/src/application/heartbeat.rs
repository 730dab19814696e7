//! Node Heartbeat Use Case
//!
//! Readers report in by name; admins list nodes with derived status.

use std::sync::Arc;

use kernel::id::NodeId;
use platform::clock::Clock;

use crate::application::bounded;
use crate::application::config::AttendanceConfig;
use crate::domain::entities::Node;
use crate::domain::repository::NodeRegistry;
use crate::domain::value_objects::NodeStatus;
use crate::error::{AttendanceError, AttendanceResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeartbeatOutcome {
    Accepted { node_id: NodeId },
    NodeNotFound,
}

#[derive(Debug, Clone)]
pub struct NodeView {
    pub node: Node,
    pub status: NodeStatus,
}

pub struct HeartbeatUseCase<N>
where
    N: NodeRegistry,
{
    nodes: Arc<N>,
    clock: Arc<dyn Clock>,
    config: Arc<AttendanceConfig>,
}

impl<N> HeartbeatUseCase<N>
where
    N: NodeRegistry,
{
    pub fn new(nodes: Arc<N>, clock: Arc<dyn Clock>, config: Arc<AttendanceConfig>) -> Self {
        Self {
            nodes,
            clock,
            config,
        }
    }

    pub async fn heartbeat(&self, name: &str) -> AttendanceResult<HeartbeatOutcome> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AttendanceError::NodeNameRequired);
        }

        let timeout = self.config.store_timeout;
        let Some(node_id) =
            bounded(timeout, "find_node_id_by_name", self.nodes.find_node_id_by_name(name)).await?
        else {
            tracing::warn!(node_name = name, "Heartbeat from unknown node");
            return Ok(HeartbeatOutcome::NodeNotFound);
        };

        let touched = bounded(
            timeout,
            "touch_heartbeat",
            self.nodes.touch_heartbeat(&node_id, self.clock.now()),
        )
        .await?;
        if !touched {
            return Ok(HeartbeatOutcome::NodeNotFound);
        }

        tracing::debug!(node_id = %node_id, node_name = name, "Heartbeat");
        Ok(HeartbeatOutcome::Accepted { node_id })
    }

    pub async fn node_statuses(&self) -> AttendanceResult<Vec<NodeView>> {
        let nodes = bounded(self.config.store_timeout, "list_nodes", self.nodes.list_nodes()).await?;
        let now = self.clock.now();
        let offline_after = self.config.offline_after();

        Ok(nodes
            .into_iter()
            .map(|node| NodeView {
                status: node.status(now, offline_after),
                node,
            })
            .collect())
    }
}
