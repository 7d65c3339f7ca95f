use heap::{EdgeRecord, Node};
use proptest::prelude::*;
use refgraph::prune::is_removable_leaf;
use refgraph::{remove_fixed_leaves, Graph};
use std::collections::BTreeSet;

const EDGE_NAMES: [Option<&str>; 4] = [Some("env"), Some("ref"), Some("upvalue"), None];

#[derive(Debug, Clone)]
struct Sample {
    fixed: Vec<bool>,
    edges: Vec<(usize, usize, usize)>,
}

impl Sample {
    fn build(&self) -> Graph {
        let nodes = self
            .fixed
            .iter()
            .enumerate()
            .map(|(i, fixed)| Node::new(i.to_string(), "table", format!("n{i}")).with_fixed(*fixed))
            .collect();
        let n = self.fixed.len();
        let edges = self
            .edges
            .iter()
            .map(|(s, d, k)| EdgeRecord::new((s % n).to_string(), (d % n).to_string(), EDGE_NAMES[*k]))
            .collect();
        Graph::new(nodes, edges).unwrap()
    }
}

fn sample() -> impl Strategy<Value = Sample> {
    (1usize..16).prop_flat_map(|n| {
        (
            proptest::collection::vec(any::<bool>(), n),
            proptest::collection::vec((0..n, 0..n, 0..EDGE_NAMES.len()), 0..40),
        )
            .prop_map(|(fixed, edges)| Sample { fixed, edges })
    })
}

fn non_fixed(graph: &Graph) -> BTreeSet<String> {
    graph.nodes().filter(|n| !n.fixed).map(|n| n.id.clone()).collect()
}

proptest! {
    #[test]
    fn test_indices_consistent_after_removals(s in sample(), picks in proptest::collection::vec(any::<usize>(), 0..16)) {
        let mut graph = s.build();
        let mut removed = Vec::new();

        for pick in picks {
            let ids: Vec<String> = graph.nodes().map(|n| n.id.clone()).collect();
            if ids.is_empty() {
                break;
            }
            let id = ids[pick % ids.len()].clone();
            graph.remove_node_and_incident_edges(&id).unwrap();
            prop_assert!(graph.check_invariants().is_ok(), "{:?}", graph.check_invariants());
            removed.push(id);
        }

        for id in &removed {
            prop_assert!(!graph.contains(id));
            prop_assert!(graph.forward_of(id).is_empty());
            prop_assert!(graph.reverse_of(id).is_empty());
            prop_assert!(graph.edges().all(|e| &e.src.id != id && &e.dst.id != id));
            prop_assert!(graph.remove_node_and_incident_edges(id).is_err());
        }

        for node in graph.nodes() {
            for e in graph.forward_of(&node.id) {
                prop_assert_eq!(&e.src.id, &node.id);
            }
            for e in graph.reverse_of(&node.id) {
                prop_assert_eq!(&e.dst.id, &node.id);
            }
        }
    }

    #[test]
    fn test_prune_reaches_fixed_point(s in sample()) {
        let mut graph = s.build();
        let before = non_fixed(&graph);
        let node_count = graph.node_count();

        let report = remove_fixed_leaves(&mut graph).unwrap();

        prop_assert!(graph.check_invariants().is_ok());
        prop_assert_eq!(non_fixed(&graph), before);
        prop_assert_eq!(report.removed_nodes, node_count - graph.node_count());
        prop_assert!(report.passes <= report.removed_nodes + 1);
        for node in graph.nodes() {
            prop_assert!(!is_removable_leaf(&graph, &node.id));
        }

        let again = remove_fixed_leaves(&mut graph).unwrap();
        prop_assert_eq!(again.removed_nodes, 0);
        prop_assert_eq!(again.passes, 1);
    }
}
