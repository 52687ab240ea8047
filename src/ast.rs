//! # TICKscript - Abstract Syntax Tree
//!
//! This module defines the Abstract Syntax Tree (AST) for TICKscript, the
//! pipeline language of a stream/batch processing engine.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Expression nodes (literals, references, operations, pipelines)
//! - **[operators]** - Binary and unary operators
//! - **[statements]** - Variable declarations and bare expressions
//! - **[program]** - `dbrp` declarations and the program root
//!
//! ## Quick Start
//!
//! ```text
//! dbrp "telegraf"."autogen"
//!
//! var data = stream
//!     |from()
//!         .measurement('cpu')
//!
//! data
//!     |alert()
//!         .crit(lambda: "usage_idle" < 10)
//! ```
//!
//! ## Core Concepts
//!
//! ### Pipelines
//!
//! A pipeline starts at a source identifier and chains function calls:
//!
//! - `|name()` adds a node to the pipeline
//! - `.name()` sets a property of the current node
//! - `@name()` calls a user-defined function
//!
//! A program whose pipelines start at `stream` is a stream task, one whose
//! pipelines start at `batch` is a batch task.
//!
//! ### Literal Kinds
//!
//! Numbers, durations (`10s`), strings (`'cpu'`), references (`"host"`),
//! regexes (`/^cpu/`), booleans (`TRUE`), `*` and lists are distinct node
//! kinds, so duration arithmetic is never confused with plain numbers.
//!
//! ### Metadata
//!
//! Every node carries a [`Meta`] with its source position and the comment
//! written above it. Metadata never takes part in equality.
pub mod expressions;
pub mod operators;
pub mod program;
pub mod statements;
pub mod tokens;

pub use expressions::{
    BinaryNode, BoolNode, ChainNode, DurationNode, FunctionKind, FunctionNode, IdentifierNode,
    LambdaNode, ListNode, Meta, Node, NumberNode, ReferenceNode, RegexNode, StarNode, StringNode,
    UnaryNode,
};
pub use operators::{BinOp, UnaryOp};
pub use program::{DbrpNode, Program};
pub use statements::{Binding, DeclarationNode, Statement, VarType};
pub use tokens::{Token, TokenKind};
