//! load -> prune -> render -> open

use anyhow::Context;
use heap::HeapDump;
use refgraph::{remove_fixed_leaves, view, DotRenderer, Graph, ViewConfig};
use std::path::{Path, PathBuf};

pub fn run(path: &Path, config: &ViewConfig) -> anyhow::Result<PathBuf> {
    let (document, source) = build_dot(path)?;

    let rendered = view::view(config, &document, &source)
        .with_context(|| format!("failed to display graph for {}", path.display()))?;
    tracing::info!("Opened {}", rendered.display());

    Ok(rendered)
}

/// Raw document bytes plus the DOT source of its pruned graph
pub fn build_dot(path: &Path) -> anyhow::Result<(Vec<u8>, String)> {
    tracing::info!("Loading {}", path.display());
    let document = heap::read_document(path)?;
    let dump = HeapDump::from_slice(&document)
        .with_context(|| format!("failed to decode {}", path.display()))?;

    let mut graph = Graph::from_dump(dump)
        .with_context(|| format!("inconsistent heap graph in {}", path.display()))?;
    let total_nodes = graph.node_count();
    let total_edges = graph.edge_count();

    let report = remove_fixed_leaves(&mut graph)?;
    debug_assert!(graph.check_invariants().is_ok());
    tracing::info!(
        "Pruned {} of {} nodes and {} of {} edges in {} passes",
        report.removed_nodes,
        total_nodes,
        report.removed_edges,
        total_edges,
        report.passes
    );

    let source = DotRenderer::new()
        .render(&graph)
        .with_context(|| format!("failed to render {}", path.display()))?;

    Ok((document, source))
}
