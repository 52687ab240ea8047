use std::time::Duration;

use regex::Regex;

use crate::ast::{BinOp, UnaryOp};
use crate::lexer::{Comment, Position};
use crate::literal::{self, LiteralError, NumberValue};

/// Source metadata carried by every node.
///
/// Metadata is out of band: two nodes that differ only in position or
/// comment compare equal.
#[derive(Debug, Clone, Default)]
pub struct Meta {
    pub position: Position,
    pub comment: Option<Comment>,
}

impl Meta {
    pub fn new(position: Position) -> Self {
        Meta {
            position,
            comment: None,
        }
    }

    pub fn with_comment(position: Position, comment: Option<Comment>) -> Self {
        Meta { position, comment }
    }
}

impl PartialEq for Meta {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

/// Number literal, either an integer or a float.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberNode {
    pub value: NumberValue,
    pub meta: Meta,
}

impl NumberNode {
    /// Builds a number node from literal text.
    pub fn from_text(text: &str, meta: Meta) -> Result<Self, LiteralError> {
        Ok(NumberNode {
            value: literal::parse_number(text)?,
            meta,
        })
    }

    pub fn is_int(&self) -> bool {
        self.value.is_int()
    }

    pub fn is_float(&self) -> bool {
        self.value.is_float()
    }
}

/// Single quoted string literal.
#[derive(Debug, Clone, PartialEq)]
pub struct StringNode {
    pub value: String,
    /// Written with `'''` delimiters.
    pub triple_quoted: bool,
    pub meta: Meta,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DurationNode {
    pub value: Duration,
    pub meta: Meta,
}

/// Compiled regex literal.
#[derive(Debug, Clone)]
pub struct RegexNode {
    pub regex: Regex,
    pub meta: Meta,
}

impl PartialEq for RegexNode {
    fn eq(&self, other: &Self) -> bool {
        self.regex.as_str() == other.regex.as_str()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoolNode {
    pub value: bool,
    pub meta: Meta,
}

/// Bare name: a variable, a chain source or a template type.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentifierNode {
    pub name: String,
    pub meta: Meta,
}

/// Double quoted field or tag reference.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceNode {
    pub name: String,
    pub meta: Meta,
}

/// `*` used as an argument, e.g. `.groupBy(*)`.
#[derive(Debug, Clone, PartialEq)]
pub struct StarNode {
    pub meta: Meta,
}

/// `[a, b, ...]`
#[derive(Debug, Clone, PartialEq)]
pub struct ListNode {
    pub elements: Vec<Node>,
    pub meta: Meta,
}

/// `lambda: <expression>`
#[derive(Debug, Clone, PartialEq)]
pub struct LambdaNode {
    pub expression: Box<Node>,
    pub meta: Meta,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryNode {
    pub op: UnaryOp,
    pub operand: Box<Node>,
    pub meta: Meta,
}

impl UnaryNode {
    pub fn new(op: UnaryOp, operand: Node, meta: Meta) -> Self {
        UnaryNode {
            op,
            operand: Box::new(operand),
            meta,
        }
    }
}

/// Binary operation.
///
/// `left` is always the operand that appears first in the source.
/// `parenthesized` only records how the source was written; the tree shape
/// alone decides evaluation order.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryNode {
    pub op: BinOp,
    pub left: Box<Node>,
    pub right: Box<Node>,
    pub parenthesized: bool,
    pub meta: Meta,
}

impl BinaryNode {
    pub fn new(op: BinOp, left: Node, right: Node, parenthesized: bool, meta: Meta) -> Self {
        BinaryNode {
            op,
            left: Box::new(left),
            right: Box::new(right),
            parenthesized,
            meta,
        }
    }
}

/// How a function was invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    /// Plain call inside an expression: `sigma("value")`
    Global,
    /// `|name()` creates a new pipeline node
    Chain,
    /// `.name()` sets a property on the current pipeline node
    Property,
    /// `@name()` calls a user-defined function
    Dynamic,
}

impl FunctionKind {
    /// Operator written in front of the call, if any.
    pub fn prefix(self) -> &'static str {
        match self {
            FunctionKind::Global => "",
            FunctionKind::Chain => "|",
            FunctionKind::Property => ".",
            FunctionKind::Dynamic => "@",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionNode {
    pub kind: FunctionKind,
    pub name: String,
    pub args: Vec<Node>,
    pub meta: Meta,
}

/// Pipeline rooted at a source identifier.
///
/// # Example
/// ```text
/// stream
///     |from()
///         .measurement('cpu')
///     |window()
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ChainNode {
    pub source: IdentifierNode,
    pub calls: Vec<FunctionNode>,
    pub meta: Meta,
}

/// Expression node.
///
/// The set of node kinds is closed; consumers match on it exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    // Literals
    Number(NumberNode),
    String(StringNode),
    Duration(DurationNode),
    Regex(RegexNode),
    Bool(BoolNode),
    Star(StarNode),
    List(ListNode),

    // References
    Identifier(IdentifierNode),
    Reference(ReferenceNode),

    // Operations
    Lambda(LambdaNode),
    Unary(UnaryNode),
    Binary(BinaryNode),
    Function(FunctionNode),
    Chain(ChainNode),
}

impl Node {
    pub fn meta(&self) -> &Meta {
        match self {
            Node::Number(n) => &n.meta,
            Node::String(n) => &n.meta,
            Node::Duration(n) => &n.meta,
            Node::Regex(n) => &n.meta,
            Node::Bool(n) => &n.meta,
            Node::Star(n) => &n.meta,
            Node::List(n) => &n.meta,
            Node::Identifier(n) => &n.meta,
            Node::Reference(n) => &n.meta,
            Node::Lambda(n) => &n.meta,
            Node::Unary(n) => &n.meta,
            Node::Binary(n) => &n.meta,
            Node::Function(n) => &n.meta,
            Node::Chain(n) => &n.meta,
        }
    }

    pub fn meta_mut(&mut self) -> &mut Meta {
        match self {
            Node::Number(n) => &mut n.meta,
            Node::String(n) => &mut n.meta,
            Node::Duration(n) => &mut n.meta,
            Node::Regex(n) => &mut n.meta,
            Node::Bool(n) => &mut n.meta,
            Node::Star(n) => &mut n.meta,
            Node::List(n) => &mut n.meta,
            Node::Identifier(n) => &mut n.meta,
            Node::Reference(n) => &mut n.meta,
            Node::Lambda(n) => &mut n.meta,
            Node::Unary(n) => &mut n.meta,
            Node::Binary(n) => &mut n.meta,
            Node::Function(n) => &mut n.meta,
            Node::Chain(n) => &mut n.meta,
        }
    }

    pub fn position(&self) -> Position {
        self.meta().position
    }

    pub fn comment(&self) -> Option<&Comment> {
        self.meta().comment.as_ref()
    }

    pub fn as_chain(&self) -> Option<&ChainNode> {
        match self {
            Node::Chain(chain) => Some(chain),
            _ => None,
        }
    }
}
