use crate::types::{FlowDefinition, FlowEdge, FlowNode, NodeId};
use std::collections::{HashMap, HashSet};

/// Outcome of validating a flow definition. Findings are aggregated; a flow
/// with several problems reports all of them.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

/// Check a flow definition for structural soundness: at least one node,
/// every edge anchored to existing nodes, and no cycles.
///
/// Never fails; callers inspect the report.
pub fn validate(flow: &FlowDefinition) -> ValidationReport {
    let mut errors = Vec::new();

    if flow.nodes.is_empty() {
        errors.push("Flow must have at least one node.".to_string());
    }

    if detect_cycle(&flow.nodes, &flow.edges) {
        errors.push("Flow contains circular dependencies.".to_string());
    }

    let node_ids: HashSet<&NodeId> = flow.nodes.iter().map(|n| &n.id).collect();
    for edge in &flow.edges {
        if !node_ids.contains(&edge.source) || !node_ids.contains(&edge.target) {
            errors.push(format!("Edge {} refers to missing node.", edge.id));
        }
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
    }
}

/// Depth-first cycle detection with three-coloring: unvisited, on the
/// current DFS stack, finished. A back-edge to an on-stack node is a cycle.
///
/// Every component is visited, so isolated or multiply-rooted subgraphs are
/// each checked. Edges pointing at unknown nodes are ignored here; `validate`
/// reports them separately.
pub fn detect_cycle(nodes: &[FlowNode], edges: &[FlowEdge]) -> bool {
    let mut adjacency: HashMap<&NodeId, Vec<&NodeId>> =
        nodes.iter().map(|n| (&n.id, Vec::new())).collect();
    for edge in edges {
        if let Some(neighbors) = adjacency.get_mut(&edge.source) {
            neighbors.push(&edge.target);
        }
    }

    let mut finished: HashSet<&NodeId> = HashSet::new();
    let mut on_stack: HashSet<&NodeId> = HashSet::new();

    fn dfs<'a>(
        node: &'a NodeId,
        adjacency: &HashMap<&'a NodeId, Vec<&'a NodeId>>,
        finished: &mut HashSet<&'a NodeId>,
        on_stack: &mut HashSet<&'a NodeId>,
    ) -> bool {
        on_stack.insert(node);

        for &neighbor in adjacency.get(node).map(Vec::as_slice).unwrap_or(&[]) {
            if on_stack.contains(neighbor) {
                return true;
            }
            if !finished.contains(neighbor) && dfs(neighbor, adjacency, finished, on_stack) {
                return true;
            }
        }

        on_stack.remove(node);
        finished.insert(node);
        false
    }

    for node in nodes {
        if !finished.contains(&node.id)
            && dfs(&node.id, &adjacency, &mut finished, &mut on_stack)
        {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EdgeId, FlowId, FlowStatus, NodeData, TaskKind};
    use chrono::Utc;

    fn node(id: &str) -> FlowNode {
        FlowNode {
            id: NodeId::new(id),
            kind: TaskKind::Task,
            data: NodeData::default(),
        }
    }

    fn edge(id: &str, source: &str, target: &str) -> FlowEdge {
        FlowEdge {
            id: EdgeId::new(id),
            source: NodeId::new(source),
            target: NodeId::new(target),
        }
    }

    fn flow(nodes: Vec<FlowNode>, edges: Vec<FlowEdge>) -> FlowDefinition {
        FlowDefinition {
            id: FlowId::new("f1"),
            name: "Test Flow".to_string(),
            nodes,
            edges,
            status: FlowStatus::Draft,
            is_template: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_flow_is_invalid() {
        let report = validate(&flow(vec![], vec![]));
        assert!(!report.is_valid);
        assert_eq!(report.errors, vec!["Flow must have at least one node."]);
    }

    #[test]
    fn detects_two_node_cycle() {
        let nodes = vec![node("A"), node("B")];
        let edges = vec![edge("e1", "A", "B"), edge("e2", "B", "A")];
        assert!(detect_cycle(&nodes, &edges));
    }

    #[test]
    fn linear_chain_is_acyclic() {
        let nodes = vec![node("A"), node("B"), node("C")];
        let edges = vec![edge("e1", "A", "B"), edge("e2", "B", "C")];
        assert!(!detect_cycle(&nodes, &edges));
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let nodes = vec![node("A")];
        let edges = vec![edge("e1", "A", "A")];
        assert!(detect_cycle(&nodes, &edges));
    }

    #[test]
    fn cycle_in_unreachable_component_is_found() {
        // A -> B is clean; the C <-> D component is cyclic and has no
        // connection to the first root visited.
        let nodes = vec![node("A"), node("B"), node("C"), node("D")];
        let edges = vec![
            edge("e1", "A", "B"),
            edge("e2", "C", "D"),
            edge("e3", "D", "C"),
        ];
        assert!(detect_cycle(&nodes, &edges));
    }

    #[test]
    fn diamond_is_acyclic() {
        let nodes = vec![node("A"), node("B"), node("C"), node("D")];
        let edges = vec![
            edge("e1", "A", "B"),
            edge("e2", "A", "C"),
            edge("e3", "B", "D"),
            edge("e4", "C", "D"),
        ];
        assert!(!detect_cycle(&nodes, &edges));
    }

    #[test]
    fn reports_one_error_per_dangling_edge() {
        let report = validate(&flow(
            vec![node("A")],
            vec![edge("e1", "A", "ghost"), edge("e2", "phantom", "A")],
        ));
        assert!(!report.is_valid);
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[0].contains("e1"));
        assert!(report.errors[1].contains("e2"));
    }

    #[test]
    fn aggregates_all_findings() {
        // Empty node set and a dangling edge at once.
        let report = validate(&flow(vec![], vec![edge("e1", "A", "B")]));
        assert!(!report.is_valid);
        assert_eq!(report.errors.len(), 2);
    }

    #[test]
    fn valid_flow_passes() {
        let report = validate(&flow(
            vec![node("A"), node("B")],
            vec![edge("e1", "A", "B")],
        ));
        assert!(report.is_valid);
        assert!(report.errors.is_empty());
    }
}
