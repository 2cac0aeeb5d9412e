//! Property tests over randomized element sequences: every built forest
//! honors the structural invariants regardless of input shape.

use doctree_core::{merge, ContentElement, Forest, HeadingLevel, NodeKind, TreeBuilder};
use proptest::prelude::*;
use std::collections::HashMap;

fn element_strategy() -> impl Strategy<Value = ContentElement> {
    prop_oneof![
        (1u8..=6, "[a-z]{1,12}").prop_map(|(level, text)| ContentElement::Header { level, text }),
        "[a-z]{1,20}".prop_map(|text| ContentElement::Text { text }),
        (1usize..5, 1usize..5).prop_map(|(rows, cols)| ContentElement::Table {
            rows,
            cols,
            caption: None,
            html: "<table></table>".into(),
        }),
        "[a-z]{1,8}".prop_map(|src| ContentElement::Image {
            src: format!("{src}.png"),
            alt: None,
        }),
    ]
}

fn elements_strategy() -> impl Strategy<Value = Vec<ContentElement>> {
    proptest::collection::vec(element_strategy(), 0..40)
}

fn build_and_merge(elements: Vec<ContentElement>) -> Forest {
    merge(TreeBuilder::new("doc").build(elements).unwrap())
}

proptest! {
    #[test]
    fn depth_equals_parent_depth_plus_one(elements in elements_strategy()) {
        let forest = build_and_merge(elements);
        for node in forest.nodes() {
            match node.parent_id {
                None => prop_assert_eq!(node.depth, 0),
                Some(parent) => {
                    let parent = forest.get(parent).expect("parent is stored");
                    prop_assert_eq!(node.depth, parent.depth + 1);
                },
            }
        }
    }

    #[test]
    fn header_ancestors_have_strictly_smaller_levels(elements in elements_strategy()) {
        let forest = build_and_merge(elements);
        for node in forest.nodes() {
            let mut bound = node.level();
            let mut current = node.parent_id;
            while let Some(id) = current {
                let ancestor = forest.get(id).expect("parent is stored");
                let level = ancestor.level().expect("ancestors are headers");
                if let Some(bound) = bound {
                    prop_assert!(level < bound);
                }
                bound = Some(level);
                current = ancestor.parent_id;
            }
        }
    }

    #[test]
    fn no_adjacent_text_siblings_after_merge(elements in elements_strategy()) {
        let forest = build_and_merge(elements);
        // The flat list is depth-first source order, so per-parent
        // adjacency shows up as consecutive entries with equal parents.
        for pair in forest.nodes().windows(2) {
            let adjacent = pair[0].parent_id == pair[1].parent_id
                && pair[0].kind() == NodeKind::Text
                && pair[1].kind() == NodeKind::Text;
            prop_assert!(!adjacent);
        }
    }

    #[test]
    fn order_index_is_strictly_increasing_per_parent(elements in elements_strategy()) {
        let forest = build_and_merge(elements);
        let mut last_order: HashMap<_, u32> = HashMap::new();
        for node in forest.nodes() {
            if let Some(previous) = last_order.insert(node.parent_id, node.order_index) {
                prop_assert!(node.order_index > previous);
            }
        }
    }

    #[test]
    fn merge_is_idempotent(elements in elements_strategy()) {
        let once = build_and_merge(elements);
        let twice = merge(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn merge_never_changes_non_text_nodes(elements in elements_strategy()) {
        let built = TreeBuilder::new("doc").build(elements).unwrap();
        let non_text_before: Vec<_> = built
            .nodes()
            .iter()
            .filter(|n| n.kind() != NodeKind::Text)
            .cloned()
            .collect();

        let merged = merge(built);
        let non_text_after: Vec<_> = merged
            .nodes()
            .iter()
            .filter(|n| n.kind() != NodeKind::Text)
            .cloned()
            .collect();

        prop_assert_eq!(non_text_before, non_text_after);
    }

    #[test]
    fn every_heading_level_round_trips(level in 1u8..=6) {
        let parsed = HeadingLevel::new(level).expect("1-6 is valid");
        prop_assert_eq!(parsed.get(), level);
    }
}
