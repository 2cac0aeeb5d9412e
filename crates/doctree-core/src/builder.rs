//! Tree construction from the flat element sequence.
//!
//! A single forward pass over the ordered elements, driven by an explicit
//! heading-level stack: each heading closes every open heading at its own
//! level or deeper, then opens itself under whatever remains. Non-heading
//! content attaches to the nearest open heading, or to the implicit document
//! root when no heading has appeared yet.
//!
//! The stack is bounded by the six heading levels, so construction never
//! recurses and a document with no headings simply degenerates to a flat
//! depth-0 list, which is valid output.

use crate::{ContentElement, Error, Forest, HeadingLevel, Node, NodeContent, NodeId, Result};
use std::collections::HashMap;
use tracing::debug;

/// Builds a [`Forest`] from an ordered sequence of content elements.
pub struct TreeBuilder {
    document_id: String,
}

/// An open ancestor on the heading stack. The implicit root sits below the
/// stack as level 0 and is never represented.
struct OpenHeading {
    level: HeadingLevel,
    id: NodeId,
}

impl TreeBuilder {
    /// Create a builder for one document.
    #[must_use]
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
        }
    }

    /// Consume the element sequence once and produce the rooted forest.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] with the offending element index when a
    /// heading level falls outside 1..=6. Nothing is coerced.
    pub fn build(&self, elements: Vec<ContentElement>) -> Result<Forest> {
        let mut stack: Vec<OpenHeading> = Vec::with_capacity(usize::from(HeadingLevel::MAX.get()));
        let mut counters: HashMap<Option<NodeId>, u32> = HashMap::new();
        let mut nodes: Vec<Node> = Vec::with_capacity(elements.len());

        for (index, element) in elements.into_iter().enumerate() {
            let content = match element {
                ContentElement::Header { level, text } => {
                    let level = HeadingLevel::new(level).ok_or_else(|| Error::Validation {
                        index,
                        message: format!("heading level {level} outside 1-6"),
                    })?;

                    // An incoming H2 closes a previous H2 or H3 but not an
                    // H1; equal levels therefore become siblings.
                    while stack.last().is_some_and(|top| top.level >= level) {
                        stack.pop();
                    }

                    let node = self.attach(
                        &stack,
                        &mut counters,
                        NodeContent::Header { level, text },
                    );
                    stack.push(OpenHeading {
                        level,
                        id: node.id,
                    });
                    nodes.push(node);
                    continue;
                },
                ContentElement::Table {
                    rows,
                    cols,
                    caption,
                    html,
                } => NodeContent::Table {
                    rows,
                    cols,
                    caption,
                    html,
                },
                ContentElement::Image { src, alt } => NodeContent::Image { src, alt },
                ContentElement::Text { text } => NodeContent::Text { text },
            };

            nodes.push(self.attach(&stack, &mut counters, content));
        }

        debug!(
            document_id = %self.document_id,
            nodes = nodes.len(),
            "built structure forest"
        );

        Ok(Forest::new(self.document_id.clone(), nodes))
    }

    /// Create a node as a child of the current stack top, assigning the next
    /// per-parent order index and depth = stack depth of the parent + 1.
    fn attach(
        &self,
        stack: &[OpenHeading],
        counters: &mut HashMap<Option<NodeId>, u32>,
        content: NodeContent,
    ) -> Node {
        let parent_id = stack.last().map(|top| top.id);
        let order = counters.entry(parent_id).or_insert(0);
        let order_index = *order;
        *order += 1;

        Node {
            id: NodeId::new(),
            document_id: self.document_id.clone(),
            parent_id,
            order_index,
            depth: u32::try_from(stack.len()).unwrap_or(u32::MAX),
            content,
        }
    }
}
