//! `doctree structure`: print the full stored structure as a nested tree.

use crate::output::{print_tree, OutputFormat};
use anyhow::{Context, Result};
use colored::Colorize;

pub fn execute(document: &str, format: OutputFormat) -> Result<()> {
    let service = super::service()?;
    let structure = service
        .get_structure(document)
        .with_context(|| format!("Failed to load structure for '{document}'"))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&structure)?);
        },
        OutputFormat::Text => {
            println!("Structure of {}\n", document.green());
            print_tree(&structure, true);
        },
    }
    Ok(())
}
