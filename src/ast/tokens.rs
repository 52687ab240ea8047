use std::fmt;

use crate::lexer::{Comment, Position};

/// Kind of a lexical token.
///
/// The lexer keeps the raw source text of every token next to its kind;
/// literal values are interpreted later by [`crate::literal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    /// Integer or floating-point number
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 0.5
    /// 42.
    /// ```
    Number,

    /// Duration literal: integer magnitude followed by a unit
    ///
    /// # Examples
    /// ```text
    /// 10s
    /// 5m
    /// 250ms
    /// ```
    Duration,

    /// String literal enclosed in single quotes (or triple single quotes)
    ///
    /// # Examples
    /// ```text
    /// 'cpu'
    /// '''SELECT mean("usage") FROM "cpu"'''
    /// ```
    String,

    /// Field or tag reference enclosed in double quotes
    ///
    /// # Examples
    /// ```text
    /// "usage_idle"
    /// "host"
    /// ```
    Reference,

    /// Regular expression enclosed in slashes
    ///
    /// # Examples
    /// ```text
    /// /^cpu[0-9]+$/
    /// ```
    Regex,

    /// Boolean literal (`TRUE` or `FALSE`)
    Boolean,

    // Identifiers and keywords
    /// Function, variable or property name
    Identifier,

    /// `var` declaration keyword
    Var,

    /// `dbrp` declaration keyword
    Dbrp,

    /// `stream` source keyword
    Stream,

    /// `batch` source keyword
    Batch,

    /// `lambda:` expression prefix
    Lambda,

    // Operators
    /// Assignment (`=`)
    Assign,
    /// Equality (`==`)
    EqEq,
    /// Inequality (`!=`)
    NotEq,
    /// Less than (`<`)
    Lt,
    /// Greater than (`>`)
    Gt,
    /// Less than or equal (`<=`)
    LtEq,
    /// Greater than or equal (`>=`)
    GtEq,
    /// Regex match (`=~`)
    RegexEq,
    /// Regex non-match (`!~`)
    RegexNotEq,
    /// Addition (`+`)
    Plus,
    /// Subtraction or negation (`-`)
    Minus,
    /// Multiplication, or the star literal in argument lists (`*`)
    Star,
    /// Division (`/`)
    Slash,
    /// Modulo (`%`)
    Percent,
    /// Logical AND (`AND`)
    And,
    /// Logical OR (`OR`)
    Or,
    /// Logical negation (`!` or `NOT`)
    Not,

    // Chain operators
    /// Pipeline operator, starts a new node in the chain
    ///
    /// # Examples
    /// ```text
    /// stream|from()|window()
    /// ```
    Pipe,

    /// Property method on the current chain node
    ///
    /// # Examples
    /// ```text
    /// |from().measurement('cpu')
    /// ```
    Dot,

    /// User-defined function call in a chain
    ///
    /// # Examples
    /// ```text
    /// |window()@movingAverage()
    /// ```
    At,

    // Delimiters
    /// Argument separator
    Comma,
    /// Colon following `lambda`
    Colon,
    /// Left parenthesis
    LParen,
    /// Right parenthesis
    RParen,
    /// Left bracket for list literals
    LBracket,
    /// Right bracket
    RBracket,

    /// Comment text (`// ...` or `/* ... */`).
    ///
    /// Never handed to the parser: the lexer folds comments into the
    /// [`Comment`] of the next significant token.
    Comment,

    /// Malformed input; the token text carries the message.
    Error,

    /// End of input
    Eof,
}

impl TokenKind {
    /// Human readable description used in parse errors.
    pub fn describe(self) -> &'static str {
        use TokenKind::*;
        match self {
            Number => "number",
            Duration => "duration",
            String => "string",
            Reference => "reference",
            Regex => "regex",
            Boolean => "boolean",
            Identifier => "identifier",
            Var => "'var'",
            Dbrp => "'dbrp'",
            Stream => "'stream'",
            Batch => "'batch'",
            Lambda => "'lambda'",
            Assign => "'='",
            EqEq => "'=='",
            NotEq => "'!='",
            Lt => "'<'",
            Gt => "'>'",
            LtEq => "'<='",
            GtEq => "'>='",
            RegexEq => "'=~'",
            RegexNotEq => "'!~'",
            Plus => "'+'",
            Minus => "'-'",
            Star => "'*'",
            Slash => "'/'",
            Percent => "'%'",
            And => "'AND'",
            Or => "'OR'",
            Not => "'!'",
            Pipe => "'|'",
            Dot => "'.'",
            At => "'@'",
            Comma => "','",
            Colon => "':'",
            LParen => "'('",
            RParen => "')'",
            LBracket => "'['",
            RBracket => "']'",
            Comment => "comment",
            Error => "error",
            Eof => "end of input",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A token with its raw text and source position.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,

    /// Source text of the token, delimiters included. For
    /// [`TokenKind::Error`] this is the error message instead.
    pub text: String,

    pub position: Position,

    /// Comments that directly preceded this token.
    pub comment: Option<Comment>,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: Position) -> Self {
        Token {
            kind,
            text: text.into(),
            position,
            comment: None,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => f.write_str("end of input"),
            TokenKind::Error => write!(f, "error: {}", self.text),
            kind => write!(f, "{} {:?}", kind, self.text),
        }
    }
}
