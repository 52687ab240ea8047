use crate::ast::{Meta, Statement};
use crate::lexer::Comment;

/// `dbrp "<database>"."<retention policy>"`
#[derive(Debug, Clone, PartialEq)]
pub struct DbrpNode {
    pub database: String,
    pub retention_policy: String,
    pub meta: Meta,
}

/// Root of a parsed script.
///
/// Built once per parse and never shared: every node below has exactly one
/// owner. `dbrps` keeps declaration order and duplicates.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub dbrps: Vec<DbrpNode>,
    pub statements: Vec<Statement>,
    /// Comments after the last statement.
    pub trailing_comment: Option<Comment>,
}

impl PartialEq for Program {
    fn eq(&self, other: &Self) -> bool {
        self.dbrps == other.dbrps && self.statements == other.statements
    }
}
