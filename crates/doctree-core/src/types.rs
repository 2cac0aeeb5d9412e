//! Core data types: content elements, nodes, forests, and the read views
//! derived from them.
//!
//! The structural backbone of a document is its headings. Every other node
//! hangs off the nearest open heading, and the read views (full structure,
//! TOC, header search, subtree) are all projections of one flat, ordered
//! node list.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique handle for a node, assigned at creation and stable for the node's
/// lifetime. Globally unique, so a node can be fetched without knowing its
/// document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Generate a fresh id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for NodeId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Heading level restricted to 1..=6.
///
/// Construction goes through [`HeadingLevel::new`]; an out-of-range level is
/// rejected, never coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    /// Smallest (outermost) heading level.
    pub const MIN: Self = Self(1);
    /// Largest (innermost) heading level.
    pub const MAX: Self = Self(6);

    /// Create a level, returning `None` outside 1..=6.
    #[must_use]
    pub const fn new(level: u8) -> Option<Self> {
        if level >= 1 && level <= 6 {
            Some(Self(level))
        } else {
            None
        }
    }

    /// The raw numeric level.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for HeadingLevel {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("heading level {value} outside 1-6"))
    }
}

impl From<HeadingLevel> for u8 {
    fn from(level: HeadingLevel) -> Self {
        level.0
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "h{}", self.0)
    }
}

/// One element of the flat input sequence produced by element extraction.
///
/// Order is the only structural signal: there is no nesting in the input.
/// Heading levels arrive unvalidated; the tree builder rejects levels
/// outside 1..=6 with the element's index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentElement {
    /// A section heading.
    Header {
        /// Raw heading level as it appeared in the source.
        level: u8,
        /// Heading text with markup stripped and entities decoded.
        text: String,
    },
    /// A table, kept whole; nested tables are never split out.
    Table {
        /// Number of top-level rows.
        rows: usize,
        /// Number of cells in the first row.
        cols: usize,
        /// Caption text, when the table has one.
        caption: Option<String>,
        /// The table's source markup, opaque to the core.
        html: String,
    },
    /// An image reference.
    Image {
        /// Source reference.
        src: String,
        /// Alternate text, when present.
        alt: Option<String>,
    },
    /// A block of running text.
    Text {
        /// The block's raw content.
        text: String,
    },
}

/// Closed set of node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Section heading; the structural backbone.
    Header,
    /// Table, never merged with anything.
    Table,
    /// Image, never merged with anything.
    Image,
    /// Running text; adjacent siblings collapse into one node.
    Text,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Header => "header",
            Self::Table => "table",
            Self::Image => "image",
            Self::Text => "text",
        };
        f.write_str(s)
    }
}

/// Kind-specific payload of a node.
///
/// Modeled as a closed tagged variant rather than a base struct with
/// optional fields, so a table can never carry a heading level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeContent {
    /// Heading payload.
    Header {
        /// Validated heading level.
        level: HeadingLevel,
        /// Heading text.
        text: String,
    },
    /// Table payload: structured counts plus the opaque source markup.
    Table {
        /// Number of top-level rows.
        rows: usize,
        /// Number of cells in the first row.
        cols: usize,
        /// Caption text, when present.
        caption: Option<String>,
        /// Source markup.
        html: String,
    },
    /// Image payload.
    Image {
        /// Source reference.
        src: String,
        /// Alternate text.
        alt: Option<String>,
    },
    /// Text payload; possibly the concatenation of several merged source
    /// elements.
    Text {
        /// The block content.
        text: String,
    },
}

impl NodeContent {
    /// The node kind this payload belongs to.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Header { .. } => NodeKind::Header,
            Self::Table { .. } => NodeKind::Table,
            Self::Image { .. } => NodeKind::Image,
            Self::Text { .. } => NodeKind::Text,
        }
    }

    /// Heading level, present for headers only.
    #[must_use]
    pub const fn level(&self) -> Option<HeadingLevel> {
        match self {
            Self::Header { level, .. } => Some(*level),
            _ => None,
        }
    }
}

/// The unit of the output tree.
///
/// `parent_id == None` means the node hangs directly under the implicit
/// document root, which is never itself stored. `depth` counts from 0 for
/// root children and always equals the parent's depth + 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Unique, stable handle.
    pub id: NodeId,
    /// The owning document.
    pub document_id: String,
    /// Parent node, or `None` for children of the implicit root.
    pub parent_id: Option<NodeId>,
    /// Position among siblings, monotonically increasing in source order.
    /// Not required to be contiguous after merging.
    pub order_index: u32,
    /// Distance from the implicit root; root children are 0.
    pub depth: u32,
    /// Kind-specific payload, tagged with `kind` on the wire.
    #[serde(flatten)]
    pub content: NodeContent,
}

impl Node {
    /// The node's kind.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        self.content.kind()
    }

    /// Heading level for header nodes, `None` otherwise.
    #[must_use]
    pub const fn level(&self) -> Option<HeadingLevel> {
        self.content.level()
    }

    /// Header text for header nodes, `None` otherwise.
    #[must_use]
    pub fn header_text(&self) -> Option<&str> {
        match &self.content {
            NodeContent::Header { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// The full set of nodes for one document, flat, in depth-first source
/// order.
///
/// Sibling order follows `order_index`; the flat order is exactly the order
/// a depth-first walk of the tree would visit nodes in, which is also the
/// order the source elements arrived in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forest {
    document_id: String,
    nodes: Vec<Node>,
}

impl Forest {
    /// Wrap an already-ordered node list.
    #[must_use]
    pub fn new(document_id: impl Into<String>, nodes: Vec<Node>) -> Self {
        Self {
            document_id: document_id.into(),
            nodes,
        }
    }

    /// The owning document id.
    #[must_use]
    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// All nodes, flat, in depth-first source order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the forest holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Consume the forest, yielding its nodes.
    #[must_use]
    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }

    /// Look up a node by id.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Children of `parent` (or of the implicit root for `None`), in
    /// sibling order.
    pub fn children_of(&self, parent: Option<NodeId>) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.parent_id == parent)
    }

    /// A node plus all of its descendants, flat, depth-first, in source
    /// order. Empty when the id is unknown.
    ///
    /// Relies on the flat list being depth-first ordered, so a parent always
    /// precedes its children; one forward pass collects the whole subtree.
    #[must_use]
    pub fn subtree(&self, id: NodeId) -> Vec<&Node> {
        let Some(root) = self.get(id) else {
            return Vec::new();
        };
        let mut member: std::collections::HashSet<NodeId> = std::collections::HashSet::new();
        member.insert(id);
        let mut out = vec![root];
        for node in &self.nodes {
            if node.id == id {
                continue;
            }
            if let Some(parent) = node.parent_id {
                if member.contains(&parent) && member.insert(node.id) {
                    out.push(node);
                }
            }
        }
        out
    }
}

/// A node together with its ordered children, for nested read views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructureNode {
    /// The node itself.
    #[serde(flatten)]
    pub node: Node,
    /// Direct children, in sibling order.
    pub children: Vec<StructureNode>,
}

impl StructureNode {
    /// Total nodes in this subtree, the node itself included.
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(StructureNode::count).sum::<usize>()
    }
}

/// One entry of the simplified table of contents: header identity only,
/// without the full node payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    /// Header node id, usable with `get_node_content` to pull the section.
    pub id: NodeId,
    /// Heading text.
    pub title: String,
    /// Heading level, 1-6.
    pub level: u8,
    /// Nested descendant headers.
    pub children: Vec<TocEntry>,
}

/// A header matched by a search, paired with its section.
///
/// `section` is the flat, depth-first subtree in source order, the matched
/// header itself first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderMatch {
    /// The matched header node.
    pub header: Node,
    /// The header plus every descendant, depth-first.
    pub section: Vec<Node>,
}
