//! `doctree get`: fetch a node and its full subtree by node id.

use crate::output::{print_flat_subtree, OutputFormat};
use anyhow::{Context, Result};
use doctree_core::NodeId;

pub fn execute(node_id: &str, format: OutputFormat) -> Result<()> {
    let node_id: NodeId = node_id
        .parse()
        .with_context(|| format!("'{node_id}' is not a valid node id"))?;

    let service = super::service()?;
    let subtree = service
        .get_node_content(node_id)
        .with_context(|| format!("Failed to load node '{node_id}'"))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&subtree)?);
        },
        OutputFormat::Text => {
            print_flat_subtree(&subtree);
        },
    }
    Ok(())
}
