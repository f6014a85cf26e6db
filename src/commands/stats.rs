//! `notegraph stats` command - index diagnostics

use std::path::Path;
use std::sync::Arc;

use notegraph_core::error::Result;
use notegraph_core::format::OutputFormat;
use notegraph_core::index::NoteIndex;

use crate::cli::Cli;

/// Execute the stats command
pub fn execute(cli: &Cli, root: &Path, index: Arc<NoteIndex>) -> Result<()> {
    index.ensure_fresh(root);
    let stats = index.stats();

    match cli.format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "root": root.display().to_string(),
                "note_count": stats.note_count,
                "cache_age_ms": stats.cache_age_ms,
                "cache_valid": stats.cache_valid,
                "root_exists": stats.root_exists,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Human => {
            println!("root:        {}", root.display());
            println!("notes:       {}", stats.note_count);
            println!("cache age:   {}ms", stats.cache_age_ms);
            println!("cache valid: {}", stats.cache_valid);
            println!("root exists: {}", stats.root_exists);
        }
    }

    Ok(())
}
