//! `notegraph links` command - depth-1 neighborhood of a note

use std::path::Path;
use std::sync::Arc;

use notegraph_core::error::{NotegraphError, Result};
use notegraph_core::format::OutputFormat;
use notegraph_core::graph::LinkGraph;
use notegraph_core::index::NoteIndex;

use crate::cli::Cli;

/// Execute the links command
pub fn execute(cli: &Cli, root: &Path, index: Arc<NoteIndex>, note: &str) -> Result<()> {
    // The engine returns an empty neighborhood for unknown notes; at the
    // CLI boundary a missing note is a data error
    index.ensure_fresh(root);
    index
        .find_by_name(note)
        .ok_or_else(|| NotegraphError::NoteNotFound {
            name: note.to_string(),
        })?;

    let graph = LinkGraph::new(Arc::clone(&index));
    let neighborhood = graph.neighborhood(note, root);

    match cli.format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "note": note,
                "outgoing": neighborhood.outgoing,
                "incoming": neighborhood.incoming,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Human => {
            println!("outgoing ({}):", neighborhood.outgoing.len());
            for target in &neighborhood.outgoing {
                println!("  -> {}", target);
            }
            println!("incoming ({}):", neighborhood.incoming.len());
            for source in &neighborhood.incoming {
                println!("  <- {}", source);
            }
        }
    }

    Ok(())
}
