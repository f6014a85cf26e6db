//! `notegraph tags` command - distinct tags with note counts

use std::path::Path;
use std::sync::Arc;

use notegraph_core::error::Result;
use notegraph_core::format::OutputFormat;
use notegraph_core::index::NoteIndex;

use crate::cli::Cli;

/// Execute the tags command
pub fn execute(cli: &Cli, root: &Path, index: Arc<NoteIndex>) -> Result<()> {
    index.ensure_fresh(root);
    let counts = index.tag_counts();

    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&counts)?);
        }
        OutputFormat::Human => {
            for (tag, count) in &counts {
                println!("#{} ({})", tag, count);
            }
        }
    }

    Ok(())
}
