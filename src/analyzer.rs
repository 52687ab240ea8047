//! Read-only queries over a parsed [`Program`].

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ast::{Binding, Node, Program, Statement, VarType};
use crate::dbrp::Dbrp;

/// Execution mode of a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Stream,
    Batch,
    /// No recognizable source, or both `stream` and `batch` sources.
    Invalid,
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TaskType::Stream => "stream",
            TaskType::Batch => "batch",
            TaskType::Invalid => "invalid",
        })
    }
}

/// Pipeline source a program reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceKind {
    Stream,
    Batch,
}

impl SourceKind {
    /// Only the exact identifiers `stream` and `batch` are sources.
    pub fn from_source(name: &str) -> Option<Self> {
        match name {
            "stream" => Some(SourceKind::Stream),
            "batch" => Some(SourceKind::Batch),
            _ => None,
        }
    }
}

fn chain_source(node: &Node) -> Option<SourceKind> {
    node.as_chain()
        .and_then(|chain| SourceKind::from_source(&chain.source.name))
}

impl Program {
    /// Declared DBRPs in source order, duplicates included.
    pub fn dbrps(&self) -> Vec<Dbrp> {
        self.dbrps.iter().map(Dbrp::from).collect()
    }

    /// Sources of every pipeline written as a top-level statement or bound
    /// by a declaration.
    pub fn sources(&self) -> BTreeSet<SourceKind> {
        self.statements
            .iter()
            .filter_map(|statement| match statement {
                Statement::Expression(node) => chain_source(node),
                Statement::Declaration(decl) => decl.value().and_then(chain_source),
            })
            .collect()
    }

    /// Classifies the program from all of its sources. Mixed or missing
    /// sources give [`TaskType::Invalid`].
    pub fn task_type(&self) -> TaskType {
        let sources = self.sources();
        let task_type = match (
            sources.contains(&SourceKind::Stream),
            sources.contains(&SourceKind::Batch),
        ) {
            (true, false) => TaskType::Stream,
            (false, true) => TaskType::Batch,
            _ => TaskType::Invalid,
        };
        debug!(?sources, %task_type, "classified program");
        task_type
    }

    /// Template declarations (`var name type`) in source order.
    pub fn template_vars(&self) -> Vec<(&str, VarType)> {
        self.statements
            .iter()
            .filter_map(|statement| match statement {
                Statement::Declaration(decl) => match decl.binding {
                    Binding::Template(ty) => Some((decl.name.name.as_str(), ty)),
                    Binding::Value(_) => None,
                },
                Statement::Expression(_) => None,
            })
            .collect()
    }
}
