//! CLI structure and argument parsing for `doctree`.
//!
//! Standard command-subcommand pattern built with clap derive macros:
//!
//! ```bash
//! # Build and persist a document's structure from converted HTML
//! doctree build report report.html
//!
//! # Inspect it
//! doctree structure report
//! doctree toc report --simple
//! doctree search report "introduction"
//! doctree get 7c9a1a6e-...
//!
//! # Tear it down
//! doctree remove report
//! ```
//!
//! Most commands accept `--format text|json`; text is the human-readable
//! default, json is stable for scripting.

use crate::output::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI for the `doctree` binary.
#[derive(Debug, Parser)]
#[command(
    name = "doctree",
    version,
    about = "Heading-structured document trees with queryable views"
)]
pub struct Cli {
    /// Enable verbose logging output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Enable debug logging output
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build and persist the structure for a document from an HTML file
    Build {
        /// Document id to store the structure under
        document: String,
        /// Path to the converted HTML file
        file: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Show the full stored structure as a nested tree
    Structure {
        /// Document id
        document: String,
        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Show the table of contents (header nodes only)
    Toc {
        /// Document id
        document: String,
        /// Emit the simplified form: id, title, and level only
        #[arg(long)]
        simple: bool,
        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Search header text and return each match with its section
    Search {
        /// Document id
        document: String,
        /// Case-insensitive substring to match against header text
        query: String,
        /// Cap the number of matches returned
        #[arg(long)]
        limit: Option<usize>,
        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Fetch a node and its full subtree by node id
    Get {
        /// Node id, as printed by structure/toc/search
        node_id: String,
        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Delete a document's stored structure (no-op if absent)
    Remove {
        /// Document id
        document: String,
    },
    /// List documents with a stored structure
    List {
        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
}
