use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ast::{IdentifierNode, Meta, Node};

/// Top-level statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Variable declaration
    ///
    /// # Example
    /// ```text
    /// var data = stream|from().measurement('cpu')
    /// ```
    Declaration(DeclarationNode),

    /// Bare expression, usually a pipeline
    ///
    /// # Example
    /// ```text
    /// data|alert().crit(lambda: "usage_idle" < 10)
    /// ```
    Expression(Node),
}

impl Statement {
    pub fn meta(&self) -> &Meta {
        match self {
            Statement::Declaration(decl) => &decl.meta,
            Statement::Expression(node) => node.meta(),
        }
    }
}

/// `var <name> = <expression>` or the template form `var <name> <type>`.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclarationNode {
    pub name: IdentifierNode,
    pub binding: Binding,
    pub meta: Meta,
}

impl DeclarationNode {
    /// The bound expression, absent for template declarations.
    pub fn value(&self) -> Option<&Node> {
        match &self.binding {
            Binding::Value(node) => Some(node),
            Binding::Template(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Value(Node),
    /// Value supplied later through task variables.
    Template(VarType),
}

/// Type of a template variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarType {
    String,
    Duration,
    Int,
    Float,
    Bool,
    Lambda,
    List,
    Regex,
    Star,
}

impl VarType {
    pub fn from_name(name: &str) -> Option<Self> {
        let ty = match name {
            "string" => VarType::String,
            "duration" => VarType::Duration,
            "int" => VarType::Int,
            "float" => VarType::Float,
            "bool" => VarType::Bool,
            "lambda" => VarType::Lambda,
            "list" => VarType::List,
            "regex" => VarType::Regex,
            "star" => VarType::Star,
            _ => return None,
        };
        Some(ty)
    }

    pub fn name(self) -> &'static str {
        match self {
            VarType::String => "string",
            VarType::Duration => "duration",
            VarType::Int => "int",
            VarType::Float => "float",
            VarType::Bool => "bool",
            VarType::Lambda => "lambda",
            VarType::List => "list",
            VarType::Regex => "regex",
            VarType::Star => "star",
        }
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
