//! `doctree build`: extract, build, merge, and persist a document's
//! structure from a converted HTML file.

use crate::output::OutputFormat;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

pub fn execute(document: &str, file: &Path, format: OutputFormat) -> Result<()> {
    let html = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read HTML file '{}'", file.display()))?;

    let service = super::service()?;
    let created = service
        .build_structure(document, &html)
        .with_context(|| format!("Failed to build structure for '{document}'"))?;

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({ "document": document, "nodes_created": created })
            );
        },
        OutputFormat::Text => {
            println!(
                "Built structure for {}: {} nodes",
                document.green(),
                created
            );
        },
    }
    Ok(())
}
