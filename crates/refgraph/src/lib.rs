//! refgraph - object reference graphs
//!
//! Graph model with bidirectional adjacency, fixed-leaf pruning, and
//! Graphviz output.

pub mod dot;
mod graph;
pub mod prune;
pub mod view;

pub use dot::{DotRenderer, RenderError};
pub use graph::{Edge, EdgeId, EdgeView, Graph, GraphError, NodeId};
pub use prune::{remove_fixed_leaves, PruneReport, PruneState};
pub use view::{ViewConfig, ViewError};
