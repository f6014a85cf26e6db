//! CLI argument parsing for notegraph
//!
//! Uses clap with global flags: --root, --format, --quiet, --verbose

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use notegraph_core::complete::CompletionContext;
use notegraph_core::format::OutputFormat;

/// Notegraph - note indexing and link completion for markdown knowledge bases
#[derive(Parser, Debug)]
#[command(name = "notegraph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Repository root (defaults to the current directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Explicit log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rank completion candidates for a partial query
    Complete {
        /// Partial text typed so far (empty returns all candidates)
        #[arg(default_value = "")]
        query: String,

        /// Completion context
        #[arg(long, short, default_value = "wiki")]
        context: CompletionContext,
    },

    /// Show the depth-1 link neighborhood of a note
    Links {
        /// Note file name (stem, no extension)
        note: String,
    },

    /// List all indexed notes
    List,

    /// List distinct tags with note counts
    Tags,

    /// Show index statistics
    Stats,
}
