//! The query engine: builds structures and serves the read shapes derived
//! from them.
//!
//! [`StructureService`] owns a [`NodeStore`] and exposes the full request
//! surface: build-and-persist, full structure, table of contents (full and
//! simplified), header search with section extraction, single-subtree
//! retrieval, and deletion. Every read shape is a projection of the same
//! flat, persisted node list; none of them mutate state.

use crate::{
    merger, HeaderMatch, Node, NodeId, NodeStore, Result, StructureNode, TocEntry,
    TreeBuilder,
};
use crate::extract::{ElementExtractor, HtmlExtractor};
use crate::ContentElement;
use std::collections::HashMap;
use tracing::{debug, info};

/// Structural queries and build orchestration over one node store.
pub struct StructureService<S: NodeStore> {
    store: S,
}

impl<S: NodeStore> StructureService<S> {
    /// Wrap a store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Extract, build, merge, and persist the structure for a document's
    /// HTML rendering. Returns the number of nodes created.
    ///
    /// # Errors
    ///
    /// [`Error::Conflict`] while a build for the same document is in
    /// flight; [`Error::Validation`] for malformed elements (nothing is
    /// persisted); [`Error::Storage`] from the store, propagated unmodified.
    pub fn build_structure(&self, document_id: &str, html: &str) -> Result<usize> {
        let elements = HtmlExtractor::new().extract(html)?;
        self.build_from_elements(document_id, elements)
    }

    /// Build and persist from an already-tokenized element sequence.
    ///
    /// Validation happens before any persistence: a malformed element
    /// rejects the whole request and leaves any previous structure intact.
    pub fn build_from_elements(
        &self,
        document_id: &str,
        elements: Vec<ContentElement>,
    ) -> Result<usize> {
        let _permit = self.store.try_lock_build(document_id)?;

        let forest = TreeBuilder::new(document_id).build(elements)?;
        let forest = merger::merge(forest);
        let created = forest.len();

        self.store.save_all(&forest)?;
        info!(document_id, nodes = created, "document structure built");
        Ok(created)
    }

    /// The full forest as stored, reconstructed as a nested tree.
    ///
    /// Fails with [`Error::NotFound`] when the document has no persisted
    /// structure.
    pub fn get_structure(&self, document_id: &str) -> Result<Vec<StructureNode>> {
        let forest = self.store.load_forest(document_id)?;
        Ok(nest(forest.nodes()))
    }

    /// The same tree filtered to HEADER nodes only, preserving relative
    /// nesting and order.
    ///
    /// A document with zero headers yields an empty tree, not an error;
    /// a document with no structure at all is still [`Error::NotFound`].
    pub fn get_toc(&self, document_id: &str) -> Result<Vec<StructureNode>> {
        let forest = self.store.load_forest(document_id)?;
        let headers: Vec<Node> = forest
            .nodes()
            .iter()
            .filter(|n| n.level().is_some())
            .cloned()
            .collect();
        // The backbone invariant makes this projection closed: a header's
        // parent is always another header or the root, so the filtered set
        // nests without re-parenting.
        Ok(nest(&headers))
    }

    /// Simplified table of contents: header identity only (id, title,
    /// level), nested.
    pub fn get_toc_simplified(&self, document_id: &str) -> Result<Vec<TocEntry>> {
        let toc = self.get_toc(document_id)?;
        Ok(toc.iter().map(simplify_entry).collect())
    }

    /// Case-insensitive substring search over header text.
    ///
    /// Each match pairs the header with its full section (the header plus
    /// every descendant, depth-first, in source order). Matching is
    /// independent of heading level. No matches is an empty list, not an
    /// error; a document with no structure is [`Error::NotFound`].
    pub fn search_headers(&self, document_id: &str, query: &str) -> Result<Vec<HeaderMatch>> {
        let forest = self.store.load_forest(document_id)?;
        let needle = query.to_lowercase();

        let mut matches = Vec::new();
        for node in forest.nodes() {
            let Some(text) = node.header_text() else {
                continue;
            };
            if !text.to_lowercase().contains(&needle) {
                continue;
            }
            matches.push(HeaderMatch {
                header: node.clone(),
                section: forest.subtree(node.id).into_iter().cloned().collect(),
            });
        }

        debug!(
            document_id,
            query, matches = matches.len(),
            "header search complete"
        );
        Ok(matches)
    }

    /// A node plus its full subtree, depth-first, in source order.
    ///
    /// This is the mechanism for extracting an arbitrary section: feed it
    /// the id of a TOC entry to retrieve that section's full content,
    /// nested sub-sections included.
    pub fn get_node_content(&self, node_id: NodeId) -> Result<Vec<Node>> {
        self.store.load_subtree(node_id)
    }

    /// Delete the document's structure. Idempotent: deleting an absent
    /// structure is a no-op success. Returns the number of nodes removed.
    pub fn delete_structure(&self, document_id: &str) -> Result<usize> {
        self.store.delete_all(document_id)
    }
}

/// Reconstruct nested trees from a flat, source-ordered node slice.
///
/// Nodes whose parent is absent from the slice root at the top level, which
/// is what makes the same helper serve both the full structure and the
/// header-only projection.
fn nest(nodes: &[Node]) -> Vec<StructureNode> {
    let present: HashMap<NodeId, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id, i))
        .collect();

    let mut children: HashMap<NodeId, Vec<&Node>> = HashMap::new();
    let mut roots: Vec<&Node> = Vec::new();
    for node in nodes {
        match node.parent_id.filter(|p| present.contains_key(p)) {
            Some(parent) => children.entry(parent).or_default().push(node),
            None => roots.push(node),
        }
    }

    roots
        .into_iter()
        .map(|node| assemble(node, &children))
        .collect()
}

fn assemble(node: &Node, children: &HashMap<NodeId, Vec<&Node>>) -> StructureNode {
    let nested = children
        .get(&node.id)
        .map(|kids| kids.iter().map(|kid| assemble(kid, children)).collect())
        .unwrap_or_default();
    StructureNode {
        node: node.clone(),
        children: nested,
    }
}

fn simplify_entry(entry: &StructureNode) -> TocEntry {
    TocEntry {
        id: entry.node.id,
        title: entry.node.header_text().unwrap_or_default().to_string(),
        level: entry.node.level().map_or(0, crate::HeadingLevel::get),
        children: entry.children.iter().map(simplify_entry).collect(),
    }
}
