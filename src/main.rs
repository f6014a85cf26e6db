//! Notegraph - note indexing and link completion for markdown knowledge bases
//!
//! A command-line tool for fuzzy note completion, link-graph queries, and
//! index diagnostics over a directory of interlinked markdown files.

mod cli;
mod commands;

use std::env;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use cli::Cli;
use notegraph_core::error::{ExitCode as NotegraphExitCode, NotegraphError};
use notegraph_core::format::OutputFormat;
use notegraph_core::logging;

fn main() -> ExitCode {
    let start = Instant::now();

    let argv_format_json = argv_requests_json();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // `--format` is a global flag, but clap may fail parsing before we
            // can inspect `Cli.format`. If the user requested JSON output,
            // emit a structured error envelope.
            if argv_format_json {
                let app_error = match err.kind() {
                    // Help and version are informational, not errors
                    clap::error::ErrorKind::DisplayHelp
                    | clap::error::ErrorKind::DisplayVersion => err.exit(),
                    clap::error::ErrorKind::ValueValidation
                    | clap::error::ErrorKind::InvalidValue
                    | clap::error::ErrorKind::InvalidSubcommand
                    | clap::error::ErrorKind::UnknownArgument
                    | clap::error::ErrorKind::MissingRequiredArgument => {
                        NotegraphError::UsageError(err.to_string())
                    }
                    _ => NotegraphError::Other(err.to_string()),
                };

                let rendered = serde_json::to_string_pretty(&app_error.to_json())
                    .unwrap_or_else(|_| app_error.to_json().to_string());
                eprintln!("{}", rendered);
                return ExitCode::from(app_error.exit_code() as u8);
            }

            err.exit();
        }
    };

    // Initialize structured logging
    if let Err(e) = logging::init_tracing(cli.verbose, cli.log_level.as_deref(), cli.log_json) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::debug!(elapsed = ?start.elapsed(), "parse_args");

    match commands::dispatch::run(&cli, start) {
        Ok(()) => ExitCode::from(NotegraphExitCode::Success as u8),
        Err(e) => {
            let exit_code = e.exit_code();

            if cli.format == OutputFormat::Json {
                let rendered = serde_json::to_string_pretty(&e.to_json())
                    .unwrap_or_else(|_| e.to_json().to_string());
                eprintln!("{}", rendered);
            } else if !cli.quiet {
                eprintln!("error: {}", e);
            }

            ExitCode::from(exit_code as u8)
        }
    }
}

/// Scan raw argv for a JSON format request, before clap parsing
fn argv_requests_json() -> bool {
    let mut args = env::args();
    while let Some(arg) = args.next() {
        if arg == "--format" {
            if let Some(value) = args.next() {
                return value.eq_ignore_ascii_case("json");
            }
        } else if let Some(value) = arg.strip_prefix("--format=") {
            return value.eq_ignore_ascii_case("json");
        }
    }
    false
}
