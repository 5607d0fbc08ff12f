use crate::schedule;
use crate::types::{FlowDefinition, NodeId, RunId, TaskId, TaskInstance, TaskStatus};
use chrono::Utc;
use std::collections::HashMap;

/// Convert a flow definition into the runtime task instances of one run.
///
/// Precondition: the flow has passed [`crate::flow::validator::validate`].
/// Behavior on an invalid or cyclic flow is unspecified (not re-checked
/// here); callers must validate first.
///
/// Each node gets a fresh [`TaskId`] scoped to `run_id`; dependency sets are
/// mapped from incoming edges, dropping edges whose source is unknown. A
/// task starts `active` exactly when its dependency set is empty, otherwise
/// `pending` - no other condition makes a node start active. Dependency-free
/// tasks get their schedule date resolved against the instantiation time;
/// the rest are resolved when the cascade triggers them.
///
/// Instances are returned in node order.
pub fn instantiate(flow: &FlowDefinition, run_id: RunId) -> Vec<TaskInstance> {
    let now = Utc::now();

    // Bijective node id -> instance id map for this run.
    let instance_ids: HashMap<&NodeId, TaskId> = flow
        .nodes
        .iter()
        .map(|node| (&node.id, TaskId::new()))
        .collect();

    flow.nodes
        .iter()
        .map(|node| {
            let dependencies: Vec<TaskId> = flow
                .edges
                .iter()
                .filter(|edge| edge.target == node.id)
                .filter_map(|edge| instance_ids.get(&edge.source).copied())
                .collect();

            let status = if dependencies.is_empty() {
                TaskStatus::Active
            } else {
                TaskStatus::Pending
            };

            let scheduling_rule = node.data.scheduling_rule.clone().unwrap_or_default();
            let scheduled_date = if dependencies.is_empty() {
                Some(schedule::resolve(&scheduling_rule, now))
            } else {
                None
            };

            TaskInstance {
                id: instance_ids[&node.id],
                title: node
                    .data
                    .label
                    .clone()
                    .unwrap_or_else(|| "Untitled Task".to_string()),
                kind: node.kind,
                status,
                scheduling_rule,
                scheduled_date,
                deadline: node.data.deadline,
                duration: node.data.duration.unwrap_or(0),
                flow_id: flow.id.clone(),
                run_id,
                node_id: node.id.clone(),
                dependencies,
                created_at: now,
                updated_at: now,
                completed_at: None,
            }
        })
        .collect()
}
