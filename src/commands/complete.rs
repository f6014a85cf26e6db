//! `notegraph complete` command - ranked completion candidates

use std::path::Path;
use std::sync::Arc;

use notegraph_core::complete::{CompletionContext, CompletionService};
use notegraph_core::error::Result;
use notegraph_core::format::OutputFormat;
use notegraph_core::index::NoteIndex;

use crate::cli::Cli;

/// Execute the complete command
pub fn execute(
    cli: &Cli,
    root: &Path,
    index: Arc<NoteIndex>,
    query: &str,
    context: CompletionContext,
) -> Result<()> {
    let service = CompletionService::new(index);
    let items = service.complete(query, context, root);

    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        OutputFormat::Human => {
            if items.is_empty() {
                if !cli.quiet {
                    eprintln!("no matches for '{}'", query);
                }
                return Ok(());
            }
            for item in &items {
                if cli.verbose {
                    println!("{}\t{}\t{}", item.label, item.score, item.detail);
                } else {
                    println!("{}\t{}", item.label, item.detail);
                }
            }
        }
    }

    Ok(())
}
