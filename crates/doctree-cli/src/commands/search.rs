//! `doctree search`: match header text and print each section.

use crate::output::{node_summary, print_flat_subtree, OutputFormat};
use anyhow::{Context, Result};
use colored::Colorize;
use doctree_core::Config;

pub fn execute(
    document: &str,
    query: &str,
    limit: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    let limit = limit.unwrap_or(config.defaults.max_search_results);

    let service = super::service()?;
    let mut matches = service
        .search_headers(document, query)
        .with_context(|| format!("Search failed for '{document}'"))?;
    matches.truncate(limit);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&matches)?);
        },
        OutputFormat::Text => {
            if matches.is_empty() {
                println!("No headers matching '{query}' in {}", document.green());
                return Ok(());
            }
            println!(
                "{} matching headers in {}\n",
                matches.len(),
                document.green()
            );
            for matched in &matches {
                println!(
                    "{} {}",
                    node_summary(&matched.header),
                    matched.header.id.to_string().bright_black()
                );
                print_flat_subtree(&matched.section[1..]);
                println!();
            }
        },
    }
    Ok(())
}
