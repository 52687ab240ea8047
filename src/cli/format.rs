//! Reformat a TICKscript

use super::CliError;
use crate::{format_program, parse};

/// Parse the script and print it back in canonical layout.
pub fn execute_format(source: &str) -> Result<String, CliError> {
    let program = parse(source)?;
    Ok(format_program(&program))
}
