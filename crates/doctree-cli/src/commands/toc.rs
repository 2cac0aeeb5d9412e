//! `doctree toc`: print the header-only projection of a document.

use crate::output::{print_tree, OutputFormat};
use anyhow::{Context, Result};
use colored::Colorize;
use doctree_core::TocEntry;

pub fn execute(document: &str, simple: bool, format: OutputFormat) -> Result<()> {
    let service = super::service()?;

    if simple {
        let toc = service
            .get_toc_simplified(document)
            .with_context(|| format!("Failed to load TOC for '{document}'"))?;
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&toc)?),
            OutputFormat::Text => {
                println!("Table of contents for {}\n", document.green());
                print_simple(&toc, 0);
            },
        }
        return Ok(());
    }

    let toc = service
        .get_toc(document)
        .with_context(|| format!("Failed to load TOC for '{document}'"))?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&toc)?),
        OutputFormat::Text => {
            if toc.is_empty() {
                println!("No headers in {}", document.green());
            } else {
                println!("Table of contents for {}\n", document.green());
                print_tree(&toc, true);
            }
        },
    }
    Ok(())
}

fn print_simple(entries: &[TocEntry], depth: usize) {
    for entry in entries {
        let indent = "  ".repeat(depth);
        println!(
            "{indent}h{} {} {}",
            entry.level,
            entry.title.bold(),
            entry.id.to_string().bright_black()
        );
        print_simple(&entry.children, depth + 1);
    }
}
