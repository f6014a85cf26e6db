//! Command dispatch logic for notegraph

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use notegraph_core::config::IndexConfig;
use notegraph_core::error::Result;
use notegraph_core::index::NoteIndex;

use crate::cli::{Cli, Commands};
use crate::commands;

pub fn run(cli: &Cli, start: Instant) -> Result<()> {
    // Determine the repository root
    let root = cli
        .root
        .clone()
        .unwrap_or_else(|| env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let mut config = IndexConfig::discover(&root)?;
    if let Some(override_root) = config.root_override.take() {
        // A config-level root override only applies when the user did not
        // pass --root explicitly
        if cli.root.is_none() {
            return run_at(cli, &override_root, config, start);
        }
    }

    run_at(cli, &root, config, start)
}

fn run_at(cli: &Cli, root: &PathBuf, config: IndexConfig, start: Instant) -> Result<()> {
    let index = Arc::new(NoteIndex::new(config));

    tracing::debug!(elapsed = ?start.elapsed(), root = %root.display(), "resolve_root");

    match &cli.command {
        Commands::Complete { query, context } => {
            commands::complete::execute(cli, root, index, query, *context)
        }
        Commands::Links { note } => commands::links::execute(cli, root, index, note),
        Commands::List => commands::list::execute(cli, root, index),
        Commands::Tags => commands::tags::execute(cli, root, index),
        Commands::Stats => commands::stats::execute(cli, root, index),
    }
}
