use heap::{EdgeRecord, HeapDump, Node};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GraphError {
    #[error("edge {src} -> {dst} references unknown node {missing}")]
    MalformedGraph {
        src: String,
        dst: String,
        missing: String,
    },
    #[error("node {id} appears more than once")]
    DuplicateNode { id: String },
    #[error("node {id} not found")]
    NotFound { id: String },
    #[error("graph indices out of sync: {0}")]
    Inconsistent(String),
}

pub type Result<T> = std::result::Result<T, GraphError>;

/// Handle to a node slot in the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Handle to an edge slot in the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(usize);

/// Resolved edge; endpoints point at the graph's canonical nodes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    pub src: NodeId,
    pub dst: NodeId,
    pub name: Option<String>,
}

/// Borrowed view of a live edge with its endpoints
#[derive(Debug, Clone, Copy)]
pub struct EdgeView<'g> {
    pub id: EdgeId,
    pub src: &'g Node,
    pub dst: &'g Node,
    pub name: Option<&'g str>,
}

/// Object reference graph
///
/// Nodes and edges live in slot vectors so insertion order survives removal;
/// a removed slot becomes `None`. Both adjacency indices are private and only
/// change through [`Graph::remove_node_and_incident_edges`].
#[derive(Debug, Default)]
pub struct Graph {
    nodes: Vec<Option<Node>>,
    ids: HashMap<String, NodeId>,
    edges: Vec<Option<Edge>>,
    /// (src, dst, name) -> slot, used to collapse parallel duplicates
    edge_keys: HashMap<Edge, EdgeId>,
    forward: HashMap<NodeId, BTreeSet<EdgeId>>,
    reverse: HashMap<NodeId, BTreeSet<EdgeId>>,
    live_edges: usize,
}

impl Graph {
    /// Build the graph and both adjacency indices
    pub fn new(nodes: Vec<Node>, edges: Vec<EdgeRecord>) -> Result<Self> {
        let mut graph = Self::default();

        for node in nodes {
            if graph.ids.contains_key(&node.id) {
                return Err(GraphError::DuplicateNode { id: node.id });
            }
            let id = NodeId(graph.nodes.len());
            graph.ids.insert(node.id.clone(), id);
            graph.nodes.push(Some(node));
        }

        let mut duplicates = 0usize;
        for record in edges {
            let src = graph.resolve(&record, &record.src)?;
            let dst = graph.resolve(&record, &record.dst)?;
            let edge = Edge {
                src,
                dst,
                name: record.name,
            };
            if graph.edge_keys.contains_key(&edge) {
                duplicates += 1;
                continue;
            }

            let id = EdgeId(graph.edges.len());
            graph.forward.entry(src).or_default().insert(id);
            graph.reverse.entry(dst).or_default().insert(id);
            graph.edge_keys.insert(edge.clone(), id);
            graph.edges.push(Some(edge));
            graph.live_edges += 1;
        }

        if duplicates > 0 {
            tracing::debug!("Collapsed {} duplicate edges", duplicates);
        }
        tracing::debug!(
            "Built graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        Ok(graph)
    }

    pub fn from_dump(dump: HeapDump) -> Result<Self> {
        Self::new(dump.nodes, dump.edges)
    }

    fn resolve(&self, record: &EdgeRecord, id: &str) -> Result<NodeId> {
        self.ids
            .get(id)
            .copied()
            .ok_or_else(|| GraphError::MalformedGraph {
                src: record.src.clone(),
                dst: record.dst.clone(),
                missing: id.to_string(),
            })
    }

    /// Remove a node along with every edge that starts or ends at it
    ///
    /// Edges are unhooked from the buckets of both endpoints, so a surviving
    /// neighbor never keeps a reference to the removed node.
    pub fn remove_node_and_incident_edges(&mut self, id: &str) -> Result<Node> {
        let node_id = self
            .ids
            .get(id)
            .copied()
            .ok_or_else(|| GraphError::NotFound { id: id.to_string() })?;

        let incoming = self.reverse.remove(&node_id).unwrap_or_default();
        let outgoing = self.forward.remove(&node_id).unwrap_or_default();
        for edge_id in incoming.into_iter().chain(outgoing) {
            self.detach_edge(edge_id);
        }

        self.ids.remove(id);
        let node = self
            .nodes
            .get_mut(node_id.0)
            .and_then(Option::take)
            .ok_or_else(|| GraphError::Inconsistent(format!("node {id} has no slot")))?;

        tracing::trace!("Removed node {}", id);
        Ok(node)
    }

    fn detach_edge(&mut self, edge_id: EdgeId) {
        // a self-loop is listed in both buckets of the same node; the second visit is a no-op
        let Some(edge) = self.edges.get_mut(edge_id.0).and_then(Option::take) else {
            return;
        };

        if let Some(bucket) = self.forward.get_mut(&edge.src) {
            bucket.remove(&edge_id);
            if bucket.is_empty() {
                self.forward.remove(&edge.src);
            }
        }
        if let Some(bucket) = self.reverse.get_mut(&edge.dst) {
            bucket.remove(&edge_id);
            if bucket.is_empty() {
                self.reverse.remove(&edge.dst);
            }
        }
        self.edge_keys.remove(&edge);
        self.live_edges = self.live_edges.saturating_sub(1);
    }

    /// Edges whose source is `id`; empty for unknown nodes
    pub fn forward_of(&self, id: &str) -> Vec<EdgeView<'_>> {
        self.bucket_views(&self.forward, id)
    }

    /// Edges whose destination is `id`; empty for unknown nodes
    pub fn reverse_of(&self, id: &str) -> Vec<EdgeView<'_>> {
        self.bucket_views(&self.reverse, id)
    }

    fn bucket_views<'g>(
        &'g self,
        index: &'g HashMap<NodeId, BTreeSet<EdgeId>>,
        id: &str,
    ) -> Vec<EdgeView<'g>> {
        self.ids
            .get(id)
            .and_then(|node_id| index.get(node_id))
            .map(|bucket| bucket.iter().filter_map(|edge_id| self.edge_view(*edge_id)).collect())
            .unwrap_or_default()
    }

    fn edge_view(&self, edge_id: EdgeId) -> Option<EdgeView<'_>> {
        let edge = self.edges.get(edge_id.0)?.as_ref()?;
        Some(EdgeView {
            id: edge_id,
            src: self.node_at(edge.src)?,
            dst: self.node_at(edge.dst)?,
            name: edge.name.as_deref(),
        })
    }

    fn node_at(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(node_id.0)?.as_ref()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.ids.get(id).and_then(|node_id| self.node_at(*node_id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains_key(id)
    }

    /// Live nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().flatten()
    }

    /// Live edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = EdgeView<'_>> {
        (0..self.edges.len()).filter_map(move |slot| self.edge_view(EdgeId(slot)))
    }

    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    pub fn edge_count(&self) -> usize {
        self.live_edges
    }

    /// Verify that the node map, edge list and both indices agree
    pub fn check_invariants(&self) -> Result<()> {
        let fail = |msg: String| Err(GraphError::Inconsistent(msg));

        let live_nodes = self.nodes.iter().flatten().count();
        if live_nodes != self.ids.len() {
            return fail(format!("{} live slots but {} ids", live_nodes, self.ids.len()));
        }
        for (id, node_id) in &self.ids {
            match self.node_at(*node_id) {
                Some(node) if node.id == *id => {}
                _ => return fail(format!("id {id} maps to a dead or foreign slot")),
            }
        }

        let mut live_edges = 0usize;
        for (slot, edge) in self.edges.iter().enumerate() {
            let Some(edge) = edge else { continue };
            let edge_id = EdgeId(slot);
            live_edges += 1;

            if self.node_at(edge.src).is_none() || self.node_at(edge.dst).is_none() {
                return fail(format!("edge {slot} references a removed node"));
            }
            if !self.forward.get(&edge.src).is_some_and(|b| b.contains(&edge_id)) {
                return fail(format!("edge {slot} missing from forward index"));
            }
            if !self.reverse.get(&edge.dst).is_some_and(|b| b.contains(&edge_id)) {
                return fail(format!("edge {slot} missing from reverse index"));
            }
            if self.edge_keys.get(edge) != Some(&edge_id) {
                return fail(format!("edge {slot} missing from key table"));
            }
        }
        if live_edges != self.live_edges || live_edges != self.edge_keys.len() {
            return fail(format!(
                "{} live edges, counter {}, {} keys",
                live_edges,
                self.live_edges,
                self.edge_keys.len()
            ));
        }

        for (name, index, is_src) in [("forward", &self.forward, true), ("reverse", &self.reverse, false)] {
            let mut entries = 0usize;
            for (node_id, bucket) in index {
                if self.node_at(*node_id).is_none() {
                    return fail(format!("{name} index keeps a bucket for a removed node"));
                }
                for edge_id in bucket {
                    let Some(edge) = self.edges.get(edge_id.0).and_then(Option::as_ref) else {
                        return fail(format!("{name} index lists dead edge {}", edge_id.0));
                    };
                    let owner = if is_src { edge.src } else { edge.dst };
                    if owner != *node_id {
                        return fail(format!("{name} index files edge {} under the wrong node", edge_id.0));
                    }
                }
                entries += bucket.len();
            }
            if entries != live_edges {
                return fail(format!("{name} index holds {entries} entries for {live_edges} edges"));
            }
        }

        Ok(())
    }
}
