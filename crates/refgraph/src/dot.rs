use crate::graph::{EdgeView, Graph};
use crate::prune::ENV_EDGE;
use heap::{GcColor, Node};
use std::fmt::Write;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RenderError {
    #[error("node {id} has unknown color tag {tag:?}")]
    UnknownColorTag { id: String, tag: String },
}

pub type Result<T> = std::result::Result<T, RenderError>;

pub const GRAPH_NAME: &str = "object-references";
pub const GRAPH_COMMENT: &str = "Object References";

/// Default cap on the display name, in characters
pub const MAX_NAME_LEN: usize = 100;
const ELLIPSIS: &str = "...";

/// Border color, keyed on fixed / synthesized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Border {
    Red,
    Purple,
    Yellow,
    Green,
}

impl Border {
    pub fn of(node: &Node) -> Self {
        match (node.synthesized, node.fixed) {
            (true, true) => Border::Yellow,
            (true, false) => Border::Purple,
            (false, true) => Border::Green,
            (false, false) => Border::Red,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Border::Red => "red",
            Border::Purple => "purple",
            Border::Yellow => "yellow",
            Border::Green => "green",
        }
    }
}

/// Fill and text color for a mark color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub fill: &'static str,
    pub font: &'static str,
}

impl Palette {
    pub fn of(node: &Node) -> Result<Self> {
        match &node.color {
            GcColor::White => Ok(Palette { fill: "white", font: "black" }),
            GcColor::Gray => Ok(Palette { fill: "lightgray", font: "black" }),
            GcColor::Black => Ok(Palette { fill: "black", font: "white" }),
            GcColor::Other(tag) => Err(RenderError::UnknownColorTag {
                id: node.id.clone(),
                tag: tag.clone(),
            }),
        }
    }
}

/// Presentation attributes of one node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedNode {
    pub id: String,
    pub label: String,
    pub border: Border,
    pub palette: Palette,
}

/// Presentation attributes of one edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEdge {
    pub src: String,
    pub dst: String,
    pub label: String,
    /// Whether the edge takes part in rank assignment
    pub constraint: bool,
}

/// Graphviz DOT generator
pub struct DotRenderer {
    max_name_len: usize,
}

impl DotRenderer {
    pub fn new() -> Self {
        Self {
            max_name_len: MAX_NAME_LEN,
        }
    }

    pub fn with_max_name_len(mut self, max: usize) -> Self {
        self.max_name_len = max;
        self
    }

    /// Render the whole graph as DOT source
    pub fn render(&self, graph: &Graph) -> Result<String> {
        let mut out = String::new();
        // writing into a String cannot fail
        let _ = writeln!(out, "// {}", GRAPH_COMMENT);
        let _ = writeln!(out, "digraph \"{}\" {{", GRAPH_NAME);
        out.push_str("    graph [bgcolor=white rankdir=LR]\n");
        out.push_str("    node [shape=box]\n");

        for node in graph.nodes() {
            let attrs = self.node_attrs(node)?;
            let _ = writeln!(
                out,
                "    \"{}\" [label=\"{}\" color={} style=filled fillcolor={} fontcolor={}]",
                escape_dot(&attrs.id),
                escape_dot(&attrs.label),
                attrs.border.as_str(),
                attrs.palette.fill,
                attrs.palette.font,
            );
        }

        for edge in graph.edges() {
            let attrs = self.edge_attrs(&edge);
            let _ = writeln!(
                out,
                "    \"{}\" -> \"{}\" [label=\"{}\" constraint={}]",
                escape_dot(&attrs.src),
                escape_dot(&attrs.dst),
                escape_dot(&attrs.label),
                attrs.constraint,
            );
        }

        out.push_str("}\n");
        tracing::debug!(
            "Rendered {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(out)
    }

    pub fn node_attrs(&self, node: &Node) -> Result<RenderedNode> {
        Ok(RenderedNode {
            id: node.id.clone(),
            label: self.label(node),
            border: Border::of(node),
            palette: Palette::of(node)?,
        })
    }

    pub fn edge_attrs(&self, edge: &EdgeView<'_>) -> RenderedEdge {
        RenderedEdge {
            src: edge.src.id.clone(),
            dst: edge.dst.id.clone(),
            label: edge.name.unwrap_or_default().to_string(),
            // env should rank above the closures referencing it
            constraint: edge.name != Some(ENV_EDGE),
        }
    }

    /// `(type) name (memcat)`
    pub fn label(&self, node: &Node) -> String {
        format!("({}) {} ({})", node.kind, self.display_name(&node.name), node.memcat)
    }

    /// Drop the `@` suffix and cap the length
    pub fn display_name(&self, name: &str) -> String {
        let base = name.rsplit_once('@').map_or(name, |(head, _)| head);
        match base.char_indices().nth(self.max_name_len) {
            Some((cut, _)) => format!("{}{}", &base[..cut], ELLIPSIS),
            None => base.to_string(),
        }
    }
}

impl Default for DotRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
