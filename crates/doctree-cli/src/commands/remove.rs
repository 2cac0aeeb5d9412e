//! `doctree remove`: delete a document's stored structure.

use anyhow::{Context, Result};
use colored::Colorize;

pub fn execute(document: &str) -> Result<()> {
    let service = super::service()?;
    let removed = service
        .delete_structure(document)
        .with_context(|| format!("Failed to delete structure for '{document}'"))?;

    if removed == 0 {
        println!("No stored structure for {}", document.green());
    } else {
        println!("Removed {} nodes from {}", removed, document.green());
    }
    Ok(())
}
