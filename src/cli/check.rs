//! Parse a TICKscript and report what it reads and how it runs

use std::fmt;

use serde::Serialize;

use super::CliError;
use crate::ast::VarType;
use crate::{parse, Dbrp, TaskType};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The TICKscript source
    pub source: String,
    /// Print the summary as JSON
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateVar {
    pub name: String,
    #[serde(rename = "type")]
    pub var_type: VarType,
}

/// What the task loader and runtime need to know about a script.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramSummary {
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub dbrps: Vec<Dbrp>,
    pub statements: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub template_vars: Vec<TemplateVar>,
}

impl fmt::Display for ProgramSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "type: {}", self.task_type)?;
        for dbrp in &self.dbrps {
            writeln!(f, "dbrp: {dbrp}")?;
        }
        for var in &self.template_vars {
            writeln!(f, "var: {} {}", var.name, var.var_type)?;
        }
        write!(f, "statements: {}", self.statements)
    }
}

/// Parse the script and render its summary as text or JSON.
pub fn execute_check(options: &CheckOptions) -> Result<String, CliError> {
    let program = parse(&options.source)?;

    let summary = ProgramSummary {
        task_type: program.task_type(),
        dbrps: program.dbrps(),
        statements: program.statements.len(),
        template_vars: program
            .template_vars()
            .into_iter()
            .map(|(name, var_type)| TemplateVar {
                name: name.to_string(),
                var_type,
            })
            .collect(),
    };

    if options.json {
        Ok(serde_json::to_string_pretty(&summary)?)
    } else {
        Ok(summary.to_string())
    }
}
