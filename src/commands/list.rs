//! `notegraph list` command - list indexed notes
//!
//! Deterministic ordering (sorted paths from discovery).

use std::path::Path;
use std::sync::Arc;

use notegraph_core::error::Result;
use notegraph_core::format::OutputFormat;
use notegraph_core::index::NoteIndex;

use crate::cli::Cli;

/// Execute the list command
pub fn execute(cli: &Cli, root: &Path, index: Arc<NoteIndex>) -> Result<()> {
    index.ensure_fresh(root);
    let notes = index.all_notes();

    match cli.format {
        OutputFormat::Json => {
            let output: Vec<_> = notes
                .iter()
                .map(|n| {
                    serde_json::json!({
                        "file_name": n.file_name,
                        "title": n.title,
                        "aliases": n.aliases,
                        "tags": n.tags,
                        "path": n.relative_path(root),
                        "outbound_links": n.outbound_links,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Human => {
            for note in &notes {
                let tags = if note.tags.is_empty() {
                    "-".to_string()
                } else {
                    note.tags.iter().cloned().collect::<Vec<_>>().join(",")
                };
                println!("{}\t{}\t{}", note.file_name, note.title, tags);
            }
            if !cli.quiet {
                eprintln!("{} notes", notes.len());
            }
        }
    }

    Ok(())
}
