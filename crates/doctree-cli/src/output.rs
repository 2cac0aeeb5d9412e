//! Output formatting shared across commands.

use clap::ValueEnum;
use colored::Colorize;
use doctree_core::{Node, NodeContent, StructureNode};

/// How command output is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    #[default]
    Text,
    /// Machine-readable JSON
    Json,
}

/// One-line summary of a node for text output.
pub fn node_summary(node: &Node) -> String {
    match &node.content {
        NodeContent::Header { level, text } => {
            format!("{} {}", level.to_string().cyan(), text.bold())
        },
        NodeContent::Table {
            rows,
            cols,
            caption,
            ..
        } => {
            let label = format!("table {rows}x{cols}");
            match caption {
                Some(caption) => format!("{}: {}", label.yellow(), caption),
                None => label.yellow().to_string(),
            }
        },
        NodeContent::Image { src, alt } => {
            let label = format!("image {src}");
            match alt {
                Some(alt) => format!("{} ({alt})", label.magenta()),
                None => label.magenta().to_string(),
            }
        },
        NodeContent::Text { text } => {
            format!("{} ({} chars)", "text".normal(), text.chars().count())
        },
    }
}

/// Print a nested tree with box-drawing indentation.
pub fn print_tree(entries: &[StructureNode], show_ids: bool) {
    for entry in entries {
        print_tree_entry(entry, "", show_ids);
    }
}

fn print_tree_entry(entry: &StructureNode, prefix: &str, show_ids: bool) {
    if show_ids {
        println!(
            "{prefix}{} {}",
            node_summary(&entry.node),
            entry.node.id.to_string().bright_black()
        );
    } else {
        println!("{prefix}{}", node_summary(&entry.node));
    }

    let child_prefix = format!("{prefix}  ");
    for child in &entry.children {
        print_tree_entry(child, &child_prefix, show_ids);
    }
}

/// Print a flat, depth-first subtree with depth-relative indentation.
pub fn print_flat_subtree(nodes: &[Node]) {
    let Some(base) = nodes.first().map(|n| n.depth) else {
        return;
    };
    for node in nodes {
        let indent = "  ".repeat((node.depth.saturating_sub(base)) as usize);
        println!("{indent}{}", node_summary(node));
    }
}
