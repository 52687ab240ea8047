//! CLI support for tick-lang
//!
//! Provides programmatic access to the `tick` subcommands so they can be
//! embedded in other tools.

mod check;
mod format;
mod load;

pub use check::{execute_check, CheckOptions, ProgramSummary};
pub use format::execute_format;
pub use load::{execute_load, LoadOutcome};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Parse error: {0}")]
    Parse(#[from] crate::ParseError),

    #[error("Load error: {0}")]
    Load(#[from] crate::load::LoadError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No input provided. Pass a file or pipe a TICKscript to stdin.")]
    NoInput,
}
