//! Command implementations, one module per subcommand.

pub mod build;
pub mod get;
pub mod list;
pub mod remove;
pub mod search;
pub mod structure;
pub mod toc;

use anyhow::{Context, Result};
use doctree_core::{Config, FsStore, StructureService};

/// Open the structure service over the configured data root.
pub(crate) fn service() -> Result<StructureService<FsStore>> {
    let config = Config::load().context("Failed to load configuration")?;
    let store = FsStore::with_root(config.paths.root).context("Failed to open data root")?;
    Ok(StructureService::new(store))
}
