//! `doctree list`: enumerate documents with a stored structure.

use crate::output::OutputFormat;
use anyhow::{Context, Result};

pub fn execute(format: OutputFormat) -> Result<()> {
    let service = super::service()?;
    let documents = service
        .store()
        .list_documents()
        .context("Failed to list documents")?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&documents)?);
        },
        OutputFormat::Text => {
            if documents.is_empty() {
                println!("No documents stored");
            } else {
                for document in documents {
                    println!("{document}");
                }
            }
        },
    }
    Ok(())
}
