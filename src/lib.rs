pub mod analyzer;
pub mod ast;
pub mod cli;
pub mod dbrp;
pub mod lexer;
pub mod literal;
pub mod load;
pub mod output;
pub mod parser;

pub use analyzer::{SourceKind, TaskType};
pub use ast::{BinOp, Node, Program, Statement, Token, TokenKind};
pub use dbrp::{equal_as_sets, Dbrp};
pub use lexer::{tokenize, Comment, Lexer, Position};
pub use literal::{LiteralError, NumberValue};
pub use output::format_program;
pub use parser::{parse, ParseError, ParseErrorKind, Parser};
