//! # doctree-core
//!
//! Core functionality for doctree - heading-structured document trees with
//! queryable views.
//!
//! This crate turns a flat, linearly-ordered sequence of content elements
//! (extracted from an HTML rendering of a document) into a hierarchical
//! tree keyed to heading structure, persists it, and answers structural
//! queries against it: full structure, table of contents, header search
//! with section extraction, and subtree retrieval.
//!
//! ## Architecture
//!
//! - **Extraction**: streaming HTML tokenization into typed content
//!   elements (a pluggable collaborator; any element source works)
//! - **Tree Builder**: single-pass, heading-level-stack tree construction
//! - **Text Merger**: collapses runs of adjacent text siblings
//! - **Node Store**: all-or-nothing persistence behind a trait, with
//!   filesystem and in-memory implementations
//! - **Query Engine**: read-only projections of the persisted structure
//!
//! ## Quick Start
//!
//! ```rust
//! use doctree_core::{MemoryStore, StructureService, Result};
//!
//! fn main() -> Result<()> {
//!     let service = StructureService::new(MemoryStore::new());
//!     let created = service.build_structure(
//!         "guide",
//!         "<h1>Guide</h1><p>intro</p><h2>Setup</h2><p>steps</p>",
//!     )?;
//!     assert_eq!(created, 4);
//!
//!     let toc = service.get_toc("guide")?;
//!     assert_eq!(toc.len(), 1);
//!
//!     let matches = service.search_headers("guide", "setup")?;
//!     assert_eq!(matches.len(), 1);
//!     Ok(())
//! }
//! ```
//!
//! ## Concurrency
//!
//! Tree construction is pure and synchronous; distinct documents build
//! independently. Two builds for the *same* document cannot run
//! concurrently: the second fails with a conflict error until the first
//! completes. Queries are read-only and freely concurrent.

/// Tree construction from the flat element sequence
pub mod builder;
/// Global configuration
pub mod config;
/// Error types and result aliases
pub mod error;
/// HTML element extraction
pub mod extract;
/// Adjacent-text merge pass
pub mod merger;
/// Query engine and build orchestration
pub mod query;
/// Node persistence contract and implementations
pub mod store;
/// Core data types and structures
pub mod types;

// Re-export commonly used types
pub use builder::TreeBuilder;
pub use config::{Config, DefaultsConfig, PathsConfig};
pub use error::{Error, Result};
pub use extract::{ElementExtractor, HtmlExtractor};
pub use merger::{merge, TEXT_JOIN_SEPARATOR};
pub use query::StructureService;
pub use store::{BuildPermit, FsStore, MemoryStore, NodeStore};
pub use types::*;
