//! Fixed-leaf pruning
//!
//! When chasing a bad reference cycle through fixed objects, the fixed objects
//! that reference nothing else are noise. Pruning strips them repeatedly until
//! only fixed objects with a real outgoing reference remain.

use crate::graph::{Graph, Result};

/// Edge name exempt from keeping a fixed node alive: a fixed closure pointing
/// at its environment is still treated as a leaf.
pub const ENV_EDGE: &str = "env";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneState {
    /// A pass is in progress
    Scanning,
    /// The last pass removed nothing
    Done,
}

/// Outcome of a pruning run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// Full passes over the node set, including the final empty one
    pub passes: usize,
    pub removed_nodes: usize,
    pub removed_edges: usize,
}

/// Whether `id` is fixed and has no outgoing edge other than `env`
pub fn is_removable_leaf(graph: &Graph, id: &str) -> bool {
    match graph.node(id) {
        Some(node) if node.fixed => graph
            .forward_of(id)
            .iter()
            .all(|edge| edge.name == Some(ENV_EDGE)),
        _ => false,
    }
}

/// Remove fixed leaves until a full pass removes nothing
pub fn remove_fixed_leaves(graph: &mut Graph) -> Result<PruneReport> {
    let mut report = PruneReport::default();
    let mut state = PruneState::Scanning;

    while state == PruneState::Scanning {
        report.passes += 1;

        // removal invalidates iteration over the live node set
        let snapshot: Vec<String> = graph.nodes().map(|n| n.id.clone()).collect();
        let mut removed = 0usize;

        for id in &snapshot {
            if !is_removable_leaf(graph, id) {
                continue;
            }
            let edges_before = graph.edge_count();
            graph.remove_node_and_incident_edges(id)?;
            report.removed_edges += edges_before - graph.edge_count();
            removed += 1;
        }

        tracing::debug!("Prune pass {}: removed {} nodes", report.passes, removed);
        report.removed_nodes += removed;

        if removed == 0 {
            state = PruneState::Done;
        }
    }

    Ok(report)
}
