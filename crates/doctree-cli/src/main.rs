//! doctree CLI - heading-structured document trees from the command line.
//!
//! This is the entry point for the `doctree` binary. Command
//! implementations live in separate modules under `commands`.

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_logging(&cli)?;
    execute_command(cli)
}

fn initialize_logging(cli: &Cli) -> Result<()> {
    let level = if cli.verbose || cli.debug {
        Level::DEBUG
    } else {
        Level::WARN
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn execute_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Build {
            document,
            file,
            format,
        } => commands::build::execute(&document, &file, format),
        Commands::Structure { document, format } => {
            commands::structure::execute(&document, format)
        },
        Commands::Toc {
            document,
            simple,
            format,
        } => commands::toc::execute(&document, simple, format),
        Commands::Search {
            document,
            query,
            limit,
            format,
        } => commands::search::execute(&document, &query, limit, format),
        Commands::Get { node_id, format } => commands::get::execute(&node_id, format),
        Commands::Remove { document } => commands::remove::execute(&document),
        Commands::List { format } => commands::list::execute(format),
    }
}
