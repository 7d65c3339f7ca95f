use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Tracked heap object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Stable identifier, unique within a dump
    pub id: String,
    /// Object kind as reported by the VM: "table", "function", "userdata", ...
    #[serde(rename = "type")]
    pub kind: String,
    /// Display name. Anything after the final `@` is display-only.
    pub name: String,
    /// Pinned / non-collectable in the originating heap
    pub fixed: bool,
    /// Introduced by the dumper for an object owned by a foreign heap
    pub synthesized: bool,
    /// Tri-color mark at dump time
    pub color: GcColor,
    /// Memory category
    pub memcat: u8,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            name: name.into(),
            fixed: false,
            synthesized: false,
            color: GcColor::White,
            memcat: 0,
        }
    }

    pub fn with_fixed(mut self, fixed: bool) -> Self {
        self.fixed = fixed;
        self
    }

    pub fn with_synthesized(mut self, synthesized: bool) -> Self {
        self.synthesized = synthesized;
        self
    }

    pub fn with_color(mut self, color: GcColor) -> Self {
        self.color = color;
        self
    }

    pub fn with_memcat(mut self, memcat: u8) -> Self {
        self.memcat = memcat;
        self
    }
}

// Identity is the id alone.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Collector mark color
///
/// Tags outside the tri-color set are kept verbatim in `Other` so a dump
/// still loads; they are rejected when the node is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GcColor {
    White,
    Gray,
    Black,
    Other(String),
}

impl GcColor {
    pub fn as_str(&self) -> &str {
        match self {
            GcColor::White => "white",
            GcColor::Gray => "gray",
            GcColor::Black => "black",
            GcColor::Other(tag) => tag,
        }
    }
}

impl From<String> for GcColor {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "white" => GcColor::White,
            "gray" => GcColor::Gray,
            "black" => GcColor::Black,
            _ => GcColor::Other(tag),
        }
    }
}

impl From<&str> for GcColor {
    fn from(tag: &str) -> Self {
        GcColor::from(tag.to_string())
    }
}

impl From<GcColor> for String {
    fn from(color: GcColor) -> Self {
        match color {
            GcColor::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for GcColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference as it appears in the dump, endpoints still unresolved ids
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub src: String,
    pub dst: String,
    /// Slot / field name; `null` or missing for anonymous references
    #[serde(default)]
    pub name: Option<String>,
}

impl EdgeRecord {
    pub fn new(src: impl Into<String>, dst: impl Into<String>, name: Option<&str>) -> Self {
        Self {
            src: src.into(),
            dst: dst.into(),
            name: name.map(str::to_string),
        }
    }
}

/// Whole dump document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeapDump {
    pub nodes: Vec<Node>,
    pub edges: Vec<EdgeRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_identity_is_id_only() {
        let a = Node::new("1", "table", "a").with_fixed(true);
        let b = Node::new("1", "function", "b");
        let c = Node::new("2", "table", "a").with_fixed(true);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_node_builder() {
        let node = Node::new("7", "userdata", "u")
            .with_fixed(true)
            .with_synthesized(true)
            .with_color(GcColor::Gray)
            .with_memcat(3);
        assert!(node.fixed);
        assert!(node.synthesized);
        assert_eq!(node.color, GcColor::Gray);
        assert_eq!(node.memcat, 3);
    }

    #[test]
    fn test_gc_color_from_tag() {
        assert_eq!(GcColor::from("white"), GcColor::White);
        assert_eq!(GcColor::from("gray"), GcColor::Gray);
        assert_eq!(GcColor::from("black"), GcColor::Black);
        assert_eq!(GcColor::from("unknown"), GcColor::Other("unknown".to_string()));
        // tags are case sensitive
        assert_eq!(GcColor::from("White"), GcColor::Other("White".to_string()));
    }

    #[test]
    fn test_gc_color_display() {
        assert_eq!(GcColor::Black.to_string(), "black");
        assert_eq!(GcColor::Other("purple".to_string()).to_string(), "purple");
    }

    #[test]
    fn test_node_serializes_kind_as_type() {
        let node = Node::new("1", "string", "hello").with_color(GcColor::Black);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "string");
        assert_eq!(json["color"], "black");
        assert!(json.get("kind").is_none());
    }
}
