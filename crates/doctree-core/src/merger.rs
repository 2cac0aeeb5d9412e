//! Post-pass that collapses runs of adjacent TEXT siblings.
//!
//! The builder emits one node per source element, so a paragraph-heavy
//! section produces a pile of consecutive TEXT nodes under one heading.
//! This pass replaces each such run with a single TEXT node carrying the
//! ordered concatenation of the run's contents, keeping the first node's
//! id, order index, depth, and parent. Tables and images interrupt a run
//! and are never merged with anything.
//!
//! The pass is pure and idempotent: a forest with no adjacent TEXT siblings
//! comes back unchanged.

use crate::{Forest, Node, NodeContent};
use tracing::debug;

/// Separator placed between merged text blocks. The wrapper markup the
/// upstream renderer used around merged runs is presentation, not structure,
/// so only the join itself survives.
pub const TEXT_JOIN_SEPARATOR: &str = "\n";

/// Collapse every run of consecutive same-parent TEXT siblings into one
/// TEXT node.
///
/// Surviving nodes keep their depth and parent untouched; `order_index`
/// values may become non-contiguous among remaining siblings, which is fine
/// because only monotonic order is guaranteed.
#[must_use]
pub fn merge(forest: Forest) -> Forest {
    let document_id = forest.document_id().to_string();
    let before = forest.len();

    let mut out: Vec<Node> = Vec::with_capacity(before);
    let mut run: Option<Node> = None;

    for node in forest.into_nodes() {
        match node.content {
            NodeContent::Text { ref text } => {
                match run {
                    Some(ref mut open) if open.parent_id == node.parent_id => {
                        // Same parent, uninterrupted: extend the run.
                        if let NodeContent::Text { text: ref mut buf } = open.content {
                            buf.push_str(TEXT_JOIN_SEPARATOR);
                            buf.push_str(text);
                        }
                    },
                    _ => {
                        // A run under a different parent cannot continue.
                        if let Some(done) = run.take() {
                            out.push(done);
                        }
                        run = Some(node);
                    },
                }
            },
            _ => {
                if let Some(done) = run.take() {
                    out.push(done);
                }
                out.push(node);
            },
        }
    }

    if let Some(done) = run {
        out.push(done);
    }

    if out.len() != before {
        debug!(
            document_id = %document_id,
            before,
            after = out.len(),
            "merged adjacent text nodes"
        );
    }

    Forest::new(document_id, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ContentElement, NodeKind, TreeBuilder};

    fn built(elements: Vec<ContentElement>) -> Forest {
        TreeBuilder::new("doc").build(elements).unwrap()
    }

    fn text(body: &str) -> ContentElement {
        ContentElement::Text { text: body.into() }
    }

    fn header(level: u8, text: &str) -> ContentElement {
        ContentElement::Header {
            level,
            text: text.into(),
        }
    }

    fn image() -> ContentElement {
        ContentElement::Image {
            src: "fig.png".into(),
            alt: None,
        }
    }

    #[test]
    fn test_adjacent_text_siblings_collapse() {
        let forest = merge(built(vec![header(1, "T"), text("a"), text("b"), text("c")]));

        assert_eq!(forest.len(), 2);
        let merged = &forest.nodes()[1];
        assert_eq!(merged.kind(), NodeKind::Text);
        match &merged.content {
            NodeContent::Text { text } => {
                assert_eq!(
                    text,
                    &format!("a{TEXT_JOIN_SEPARATOR}b{TEXT_JOIN_SEPARATOR}c")
                );
            },
            other => panic!("expected text payload, got {other:?}"),
        }
    }

    #[test]
    fn test_merged_node_keeps_first_identity() {
        let before = built(vec![header(1, "T"), text("a"), text("b")]);
        let first_text = before.nodes()[1].clone();
        let after = merge(before);

        let merged = &after.nodes()[1];
        assert_eq!(merged.id, first_text.id);
        assert_eq!(merged.order_index, first_text.order_index);
        assert_eq!(merged.depth, first_text.depth);
        assert_eq!(merged.parent_id, first_text.parent_id);
    }

    #[test]
    fn test_non_text_interrupts_run() {
        let forest = merge(built(vec![
            header(1, "T"),
            text("a"),
            image(),
            text("b"),
        ]));

        // Two separate TEXT nodes survive around the image.
        let kinds: Vec<NodeKind> = forest.nodes().iter().map(Node::kind).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Header,
                NodeKind::Text,
                NodeKind::Image,
                NodeKind::Text
            ]
        );
    }

    #[test]
    fn test_parent_change_interrupts_run() {
        let forest = merge(built(vec![
            header(1, "T"),
            text("a"),
            header(2, "S"),
            text("b"),
        ]));

        assert_eq!(forest.len(), 4);
        let texts: Vec<&Node> = forest
            .nodes()
            .iter()
            .filter(|n| n.kind() == NodeKind::Text)
            .collect();
        assert_eq!(texts.len(), 2);
        assert_ne!(texts[0].parent_id, texts[1].parent_id);
    }

    #[test]
    fn test_no_adjacent_text_after_merge() {
        let forest = merge(built(vec![
            text("lead-1"),
            text("lead-2"),
            header(1, "T"),
            text("a"),
            text("b"),
            image(),
            text("c"),
            text("d"),
        ]));

        let nodes = forest.nodes();
        for pair in nodes.windows(2) {
            let adjacent_text = pair[0].kind() == NodeKind::Text
                && pair[1].kind() == NodeKind::Text
                && pair[0].parent_id == pair[1].parent_id;
            assert!(!adjacent_text, "adjacent TEXT siblings survived merge");
        }
    }

    #[test]
    fn test_merge_is_idempotent() {
        let once = merge(built(vec![
            header(1, "T"),
            text("a"),
            text("b"),
            image(),
            text("c"),
        ]));
        let twice = merge(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_already_flat_forest_unchanged() {
        let forest = built(vec![header(1, "T"), text("a"), image(), text("b")]);
        let merged = merge(forest.clone());
        assert_eq!(forest, merged);
    }

    #[test]
    fn test_headerless_document_merges_at_root() {
        // Three text elements, two adjacent: exactly two depth-0 nodes.
        let forest = merge(built(vec![text("a"), text("b"), image(), text("c")]));
        assert_eq!(forest.len(), 3);

        let forest = merge(built(vec![text("a"), text("b"), text("c")]));
        assert_eq!(forest.len(), 1);
        assert_eq!(forest.nodes()[0].depth, 0);
    }
}
