use std::mem;

use thiserror::Error;
use tracing::debug;

use crate::{
    ast::{
        BinOp, BinaryNode, Binding, BoolNode, ChainNode, DbrpNode, DeclarationNode, DurationNode,
        FunctionKind, FunctionNode, IdentifierNode, LambdaNode, ListNode, Meta, Node, NumberNode,
        Program, ReferenceNode, RegexNode, StarNode, Statement, StringNode, Token, TokenKind,
        UnaryNode, UnaryOp, VarType,
    },
    lexer::{Comment, Lexer, Position},
    literal::{self, LiteralError},
};

/// Limit on nested expressions and on operators folded into one expression.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Syntax error. Parsing stops at the first one; no partial tree is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at {position}")]
pub struct ParseError {
    pub position: Position,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("unexpected {found}, expected {expected}")]
    UnexpectedToken { expected: String, found: String },

    /// A literal token whose text could not be interpreted.
    #[error(transparent)]
    Literal(#[from] LiteralError),

    /// Malformed input reported by the lexer.
    #[error("{0}")]
    Lex(String),

    #[error("expression nested deeper than {0} levels")]
    TooDeep(usize),
}

impl ParseError {
    pub fn new(position: Position, kind: ParseErrorKind) -> Self {
        ParseError { position, kind }
    }

    fn literal(position: Position, err: LiteralError) -> Self {
        ParseError::new(position, ParseErrorKind::Literal(err))
    }
}

/// Recursive-descent parser with one token of lookahead.
///
/// Consumes any token iterator; [`Lexer`] is the usual source.
pub struct Parser<T = Lexer>
where
    T: Iterator<Item = Token>,
{
    tokens: T,
    current_token: Token,
    depth: usize,
}

/// Parses a whole script.
pub fn parse(source: &str) -> Result<Program, ParseError> {
    let program = Parser::new(Lexer::new(source)).parse_program()?;
    debug!(
        dbrps = program.dbrps.len(),
        statements = program.statements.len(),
        "parsed TICKscript"
    );
    Ok(program)
}

impl<T> Parser<T>
where
    T: Iterator<Item = Token>,
{
    pub fn new(mut tokens: T) -> Self {
        let current_token = tokens
            .next()
            .unwrap_or_else(|| Token::new(TokenKind::Eof, "", Position::start()));
        Parser {
            tokens,
            current_token,
            depth: 0,
        }
    }

    /// Moves to the next token and returns the one just consumed.
    fn advance(&mut self) -> Token {
        let eof_position = self.current_token.position;
        let next = self
            .tokens
            .next()
            .unwrap_or_else(|| Token::new(TokenKind::Eof, "", eof_position));
        mem::replace(&mut self.current_token, next)
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current_token.kind == kind
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if !self.check(kind) {
            return Err(self.unexpected(kind.describe()));
        }
        Ok(self.advance())
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let token = &self.current_token;
        let kind = if token.kind == TokenKind::Error {
            ParseErrorKind::Lex(token.text.clone())
        } else {
            ParseErrorKind::UnexpectedToken {
                expected: expected.to_string(),
                found: token.to_string(),
            }
        };
        ParseError::new(token.position, kind)
    }

    fn meta_of(token: Token) -> Meta {
        Meta::with_comment(token.position, token.comment)
    }

    fn descend(&mut self) -> Result<(), ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError::new(
                self.current_token.position,
                ParseErrorKind::TooDeep(MAX_NESTING_DEPTH),
            ));
        }
        self.depth += 1;
        Ok(())
    }

    /// Parse a complete program: `dbrp` declarations first, then statements.
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::default();

        while self.check(TokenKind::Dbrp) {
            program.dbrps.push(self.parse_dbrp()?);
        }

        while !self.check(TokenKind::Eof) {
            program.statements.push(self.parse_statement()?);
        }

        program.trailing_comment = self.current_token.comment.take();
        Ok(program)
    }

    fn parse_dbrp(&mut self) -> Result<DbrpNode, ParseError> {
        let meta = Self::meta_of(self.advance()); // consume 'dbrp'
        let database = self.parse_dbrp_part()?;
        self.expect(TokenKind::Dot)?;
        let retention_policy = self.parse_dbrp_part()?;

        Ok(DbrpNode {
            database,
            retention_policy,
            meta,
        })
    }

    /// Database and retention policy names may be written as references or
    /// as strings.
    fn parse_dbrp_part(&mut self) -> Result<String, ParseError> {
        let result = match self.current_token.kind {
            TokenKind::Reference => literal::unquote_reference(&self.current_token.text),
            TokenKind::String => literal::unquote_string(&self.current_token.text),
            _ => return Err(self.unexpected("quoted database or retention policy name")),
        };
        let position = self.current_token.position;
        self.advance();
        result.map_err(|e| ParseError::literal(position, e))
    }

    fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        if self.check(TokenKind::Var) {
            return self.parse_declaration().map(Statement::Declaration);
        }
        self.parse_expression().map(Statement::Expression)
    }

    fn parse_declaration(&mut self) -> Result<DeclarationNode, ParseError> {
        let meta = Self::meta_of(self.advance()); // consume 'var'
        let name_token = self.expect(TokenKind::Identifier)?;
        let name = IdentifierNode {
            name: name_token.text,
            meta: Meta::new(name_token.position),
        };

        let binding = if self.check(TokenKind::Assign) {
            self.advance();
            Binding::Value(self.parse_expression()?)
        } else {
            let template_type = match self.current_token.kind {
                TokenKind::Identifier | TokenKind::Lambda => {
                    VarType::from_name(&self.current_token.text)
                }
                _ => None,
            };
            match template_type {
                Some(ty) => {
                    self.advance();
                    Binding::Template(ty)
                }
                None => return Err(self.unexpected("'=' or a template type")),
            }
        };

        Ok(DeclarationNode {
            name,
            binding,
            meta,
        })
    }

    pub fn parse_expression(&mut self) -> Result<Node, ParseError> {
        self.parse_binary(BinOp::Or.precedence())
    }

    fn parse_binary(&mut self, min_precedence: u8) -> Result<Node, ParseError> {
        let depth = self.depth;
        let result = self.parse_operators(min_precedence);
        self.depth = depth;
        result
    }

    /// Precedence climbing over [`BinOp::precedence`]. Operators of equal
    /// precedence associate to the left; the operand read first is `left`.
    fn parse_operators(&mut self, min_precedence: u8) -> Result<Node, ParseError> {
        let mut left = self.parse_unary()?;

        while let Some(op) = BinOp::from_token(self.current_token.kind) {
            if op.precedence() < min_precedence {
                break;
            }

            // Every fold deepens the left spine of the tree.
            self.descend()?;
            let mut meta = Self::meta_of(self.advance());
            if let Some(mut comment) = take_leading_comment(&mut left) {
                if let Some(own) = meta.comment.take() {
                    comment.lines.extend(own.lines);
                }
                meta.comment = Some(comment);
            }
            let right = self.parse_binary(op.precedence() + 1)?;
            left = Node::Binary(BinaryNode::new(op, left, right, false, meta));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Node, ParseError> {
        let depth = self.depth;
        let result = self.descend().and_then(|()| self.parse_prefixed());
        self.depth = depth;
        result
    }

    fn parse_prefixed(&mut self) -> Result<Node, ParseError> {
        let op = match self.current_token.kind {
            TokenKind::Minus => UnaryOp::Negate,
            TokenKind::Not => UnaryOp::Not,
            _ => return self.parse_primary(),
        };

        let meta = Self::meta_of(self.advance());
        let operand = self.parse_unary()?;
        Ok(Node::Unary(UnaryNode::new(op, operand, meta)))
    }

    /// Parse primary expressions: literals, references, lists, lambdas,
    /// parenthesized expressions, function calls and pipelines.
    fn parse_primary(&mut self) -> Result<Node, ParseError> {
        match self.current_token.kind {
            TokenKind::Number => {
                let token = self.advance();
                let position = token.position;
                let text = token.text.clone();
                NumberNode::from_text(&text, Self::meta_of(token))
                    .map(Node::Number)
                    .map_err(|e| ParseError::literal(position, e))
            }
            TokenKind::Duration => {
                let token = self.advance();
                let value = literal::parse_duration(&token.text)
                    .map_err(|e| ParseError::literal(token.position, e))?;
                Ok(Node::Duration(DurationNode {
                    value,
                    meta: Self::meta_of(token),
                }))
            }
            TokenKind::String => {
                let token = self.advance();
                let value = literal::unquote_string(&token.text)
                    .map_err(|e| ParseError::literal(token.position, e))?;
                Ok(Node::String(StringNode {
                    value,
                    triple_quoted: token.text.starts_with("'''"),
                    meta: Self::meta_of(token),
                }))
            }
            TokenKind::Reference => {
                let token = self.advance();
                let name = literal::unquote_reference(&token.text)
                    .map_err(|e| ParseError::literal(token.position, e))?;
                Ok(Node::Reference(ReferenceNode {
                    name,
                    meta: Self::meta_of(token),
                }))
            }
            TokenKind::Regex => {
                let token = self.advance();
                let regex = literal::parse_regex(&token.text)
                    .map_err(|e| ParseError::literal(token.position, e))?;
                Ok(Node::Regex(RegexNode {
                    regex,
                    meta: Self::meta_of(token),
                }))
            }
            TokenKind::Boolean => {
                let token = self.advance();
                Ok(Node::Bool(BoolNode {
                    value: token.text == "TRUE",
                    meta: Self::meta_of(token),
                }))
            }
            TokenKind::Star => {
                let token = self.advance();
                Ok(Node::Star(StarNode {
                    meta: Self::meta_of(token),
                }))
            }
            TokenKind::LBracket => {
                let meta = Self::meta_of(self.advance());
                let elements = self.parse_args(TokenKind::RBracket)?;
                Ok(Node::List(ListNode { elements, meta }))
            }
            TokenKind::Lambda => {
                let meta = Self::meta_of(self.advance());
                self.expect(TokenKind::Colon)?;
                let expression = self.parse_expression()?;
                Ok(Node::Lambda(LambdaNode {
                    expression: Box::new(expression),
                    meta,
                }))
            }
            TokenKind::LParen => {
                let open = self.advance();
                let mut expr = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                if expr.comment().is_none() {
                    expr.meta_mut().comment = open.comment;
                }
                Ok(match expr {
                    Node::Binary(mut binary) => {
                        binary.parenthesized = true;
                        Node::Binary(binary)
                    }
                    other => other,
                })
            }
            TokenKind::Identifier | TokenKind::Stream | TokenKind::Batch => {
                let kind = self.current_token.kind;
                let token = self.advance();

                if kind == TokenKind::Identifier && self.check(TokenKind::LParen) {
                    let meta = Self::meta_of(token.clone());
                    let args = self.parse_call_args()?;
                    return Ok(Node::Function(FunctionNode {
                        kind: FunctionKind::Global,
                        name: token.text,
                        args,
                        meta,
                    }));
                }

                let source = IdentifierNode {
                    name: token.text,
                    meta: Meta::with_comment(token.position, token.comment),
                };
                self.parse_chain(source, kind != TokenKind::Identifier)
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    /// Parses `|f()`, `.p()` and `@u()` calls following `source`. Without any
    /// call a variable is returned as a plain identifier; `stream` and
    /// `batch` always start a chain.
    fn parse_chain(
        &mut self,
        mut source: IdentifierNode,
        keyword: bool,
    ) -> Result<Node, ParseError> {
        let mut calls = Vec::new();

        loop {
            let kind = match self.current_token.kind {
                TokenKind::Pipe => FunctionKind::Chain,
                TokenKind::Dot => FunctionKind::Property,
                TokenKind::At => FunctionKind::Dynamic,
                _ => break,
            };

            let meta = Self::meta_of(self.advance());
            let name = self.expect(TokenKind::Identifier)?.text;
            let args = self.parse_call_args()?;
            calls.push(FunctionNode {
                kind,
                name,
                args,
                meta,
            });
        }

        if calls.is_empty() && !keyword {
            return Ok(Node::Identifier(source));
        }

        // The comment above a pipeline describes the whole chain.
        let meta = Meta::with_comment(source.meta.position, source.meta.comment.take());
        Ok(Node::Chain(ChainNode {
            source,
            calls,
            meta,
        }))
    }

    fn parse_call_args(&mut self) -> Result<Vec<Node>, ParseError> {
        self.expect(TokenKind::LParen)?;
        self.parse_args(TokenKind::RParen)
    }

    /// Comma separated expressions up to and including `close`.
    fn parse_args(&mut self, close: TokenKind) -> Result<Vec<Node>, ParseError> {
        let mut args = Vec::new();

        if !self.check(close) {
            loop {
                args.push(self.parse_expression()?);
                if self.check(TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }

        self.expect(close)?;
        Ok(args)
    }
}

/// The comment written above an expression belongs to its leftmost operand
/// until an operator claims it.
fn take_leading_comment(node: &mut Node) -> Option<Comment> {
    match node {
        Node::Binary(binary) => binary
            .meta
            .comment
            .take()
            .or_else(|| take_leading_comment(&mut binary.left)),
        other => other.meta_mut().comment.take(),
    }
}
