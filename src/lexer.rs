use std::fmt;

use crate::ast::{Token, TokenKind};
use crate::literal::split_duration;

/// Location of a token or node in the source text.
///
/// `offset` is a byte index; `line` and `column` are 1-based and count
/// characters. Positions are diagnostics only and never take part in
/// node equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Position {
            offset,
            line,
            column,
        }
    }

    /// Position of the first character of a source text.
    pub fn start() -> Self {
        Position::new(0, 1, 1)
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::start()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} char {}", self.line, self.column)
    }
}

/// Comment lines collected in front of a token, delimiters removed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Comment {
    pub lines: Vec<String>,
}

impl Comment {
    pub fn new(lines: Vec<String>) -> Self {
        Comment { lines }
    }
}

/// TICKscript tokenizer.
///
/// Tokens are produced lazily, one per [`Lexer::next_token`] call, and the
/// lexer cannot be rewound. Whitespace is dropped; comments are attached to
/// the next significant token. Malformed input never aborts the scan: it
/// becomes a [`TokenKind::Error`] token for the parser to report.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    offset: usize,
    line: usize,
    column: usize,
    /// Kind of the last significant token, used to tell regexes from division.
    last: Option<TokenKind>,
    finished: bool,
}

/// Start tokenizing `source`. The returned lexer yields tokens up to and
/// including [`TokenKind::Eof`].
pub fn tokenize(source: &str) -> Lexer {
    Lexer::new(source)
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            offset: 0,
            line: 1,
            column: 1,
            last: None,
            finished: false,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.position += 1;
            self.offset += ch.len_utf8();
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn here(&self) -> Position {
        Position::new(self.offset, self.line, self.column)
    }

    fn slice(&self, start: usize) -> String {
        self.input[start..self.position].iter().collect()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn regex_allowed(&self) -> bool {
        matches!(
            self.last,
            None | Some(
                TokenKind::RegexEq
                    | TokenKind::RegexNotEq
                    | TokenKind::LParen
                    | TokenKind::Comma
                    | TokenKind::Assign
                    | TokenKind::LBracket
            )
        )
    }

    fn read_identifier(&mut self) -> String {
        let start = self.position;
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                self.advance();
            } else {
                break;
            }
        }
        self.slice(start)
    }

    /// Reads a quoted literal and returns its raw text, delimiters included.
    fn read_quoted(&mut self, quote: char) -> Result<String, String> {
        let start = self.position;
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                '\\' => {
                    self.advance();
                    if self.current_char().is_none() {
                        break;
                    }
                    self.advance();
                }
                c if c == quote => {
                    self.advance();
                    return Ok(self.slice(start));
                }
                _ => self.advance(),
            }
        }

        Err(match quote {
            '"' => "unterminated reference".to_string(),
            '/' => "unterminated regex".to_string(),
            _ => "unterminated string".to_string(),
        })
    }

    fn read_triple_quoted(&mut self) -> Result<String, String> {
        let start = self.position;
        self.advance_by(3);

        while self.current_char().is_some() {
            if self.current_char() == Some('\'')
                && self.peek_char(1) == Some('\'')
                && self.peek_char(2) == Some('\'')
            {
                self.advance_by(3);
                return Ok(self.slice(start));
            }
            self.advance();
        }

        Err("unterminated string".to_string())
    }

    /// Numbers and durations share one scan; anything that is not
    /// `<digits><unit>` is handed to the number interpreter as is.
    fn read_number_or_duration(&mut self) -> (TokenKind, String) {
        let start = self.position;
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' || ch == 'µ' {
                self.advance();
            } else {
                break;
            }
        }

        let text = self.slice(start);
        if split_duration(&text).is_some() {
            (TokenKind::Duration, text)
        } else {
            (TokenKind::Number, text)
        }
    }

    fn read_line_comment(&mut self) -> String {
        self.advance_by(2);
        let start = self.position;
        while let Some(ch) = self.current_char() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
        self.slice(start)
    }

    fn read_block_comment(&mut self) -> Result<String, String> {
        self.advance_by(2);
        let start = self.position;
        while self.current_char().is_some() {
            if self.current_char() == Some('*') && self.peek_char(1) == Some('/') {
                let body = self.slice(start);
                self.advance_by(2);
                return Ok(body);
            }
            self.advance();
        }
        Err("unterminated block comment".to_string())
    }

    fn single(&mut self, kind: TokenKind, width: usize) -> (TokenKind, String) {
        let start = self.position;
        self.advance_by(width);
        (kind, self.slice(start))
    }

    /// Scans one token, comments included.
    fn next_raw_token(&mut self) -> Token {
        self.skip_whitespace();
        let position = self.here();

        let (kind, text) = match self.current_char() {
            None => (TokenKind::Eof, String::new()),
            Some('/') if self.peek_char(1) == Some('/') => {
                (TokenKind::Comment, self.read_line_comment())
            }
            Some('/') if self.peek_char(1) == Some('*') => match self.read_block_comment() {
                Ok(body) => (TokenKind::Comment, body),
                Err(msg) => (TokenKind::Error, msg),
            },
            Some('/') if self.regex_allowed() => match self.read_quoted('/') {
                Ok(raw) => (TokenKind::Regex, raw),
                Err(msg) => (TokenKind::Error, msg),
            },
            Some('/') => self.single(TokenKind::Slash, 1),
            Some('|') => self.single(TokenKind::Pipe, 1),
            Some('.') => self.single(TokenKind::Dot, 1),
            Some('@') => self.single(TokenKind::At, 1),
            Some(',') => self.single(TokenKind::Comma, 1),
            Some(':') => self.single(TokenKind::Colon, 1),
            Some('(') => self.single(TokenKind::LParen, 1),
            Some(')') => self.single(TokenKind::RParen, 1),
            Some('[') => self.single(TokenKind::LBracket, 1),
            Some(']') => self.single(TokenKind::RBracket, 1),
            Some('+') => self.single(TokenKind::Plus, 1),
            Some('-') => self.single(TokenKind::Minus, 1),
            Some('*') => self.single(TokenKind::Star, 1),
            Some('%') => self.single(TokenKind::Percent, 1),
            Some('=') => match self.peek_char(1) {
                Some('=') => self.single(TokenKind::EqEq, 2),
                Some('~') => self.single(TokenKind::RegexEq, 2),
                _ => self.single(TokenKind::Assign, 1),
            },
            Some('!') => match self.peek_char(1) {
                Some('=') => self.single(TokenKind::NotEq, 2),
                Some('~') => self.single(TokenKind::RegexNotEq, 2),
                _ => self.single(TokenKind::Not, 1),
            },
            Some('<') => match self.peek_char(1) {
                Some('=') => self.single(TokenKind::LtEq, 2),
                _ => self.single(TokenKind::Lt, 1),
            },
            Some('>') => match self.peek_char(1) {
                Some('=') => self.single(TokenKind::GtEq, 2),
                _ => self.single(TokenKind::Gt, 1),
            },
            Some('\'') => {
                let result = if self.peek_char(1) == Some('\'') && self.peek_char(2) == Some('\'')
                {
                    self.read_triple_quoted()
                } else {
                    self.read_quoted('\'')
                };
                match result {
                    Ok(raw) => (TokenKind::String, raw),
                    Err(msg) => (TokenKind::Error, msg),
                }
            }
            Some('"') => match self.read_quoted('"') {
                Ok(raw) => (TokenKind::Reference, raw),
                Err(msg) => (TokenKind::Error, msg),
            },
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                let ident = self.read_identifier();
                let kind = match ident.as_str() {
                    "var" => TokenKind::Var,
                    "dbrp" => TokenKind::Dbrp,
                    "stream" => TokenKind::Stream,
                    "batch" => TokenKind::Batch,
                    "lambda" => TokenKind::Lambda,
                    "TRUE" | "FALSE" => TokenKind::Boolean,
                    "AND" => TokenKind::And,
                    "OR" => TokenKind::Or,
                    "NOT" => TokenKind::Not,
                    _ => TokenKind::Identifier,
                };
                (kind, ident)
            }
            Some(ch) if ch.is_ascii_digit() => self.read_number_or_duration(),
            Some(ch) => {
                self.advance();
                (TokenKind::Error, format!("unexpected character {:?}", ch))
            }
        };

        Token::new(kind, text, position)
    }

    /// Returns the next significant token with any preceding comments
    /// attached. After [`TokenKind::Eof`] every call returns `Eof` again.
    pub fn next_token(&mut self) -> Token {
        let mut comment: Vec<String> = Vec::new();

        loop {
            let token = self.next_raw_token();
            if token.kind == TokenKind::Comment {
                comment.extend(token.text.lines().map(|line| line.trim().to_string()));
                continue;
            }

            self.last = Some(token.kind);
            let mut token = token;
            if !comment.is_empty() {
                token.comment = Some(Comment::new(comment));
            }
            return token;
        }
    }
}

impl Iterator for Lexer {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            self.finished = true;
        }
        Some(token)
    }
}

#[test]
fn test_keywords() {
    let kinds: Vec<TokenKind> = tokenize("var dbrp stream batch lambda TRUE AND OR NOT")
        .map(|t| t.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Var,
            TokenKind::Dbrp,
            TokenKind::Stream,
            TokenKind::Batch,
            TokenKind::Lambda,
            TokenKind::Boolean,
            TokenKind::And,
            TokenKind::Or,
            TokenKind::Not,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_pipe() {
    let mut lexer = Lexer::new("stream|from().measurement('cpu')");
    assert_eq!(lexer.next_token().kind, TokenKind::Stream);
    assert_eq!(lexer.next_token().kind, TokenKind::Pipe);
    assert_eq!(lexer.next_token().text, "from");
    assert_eq!(lexer.next_token().kind, TokenKind::LParen);
    assert_eq!(lexer.next_token().kind, TokenKind::RParen);
    assert_eq!(lexer.next_token().kind, TokenKind::Dot);
    assert_eq!(lexer.next_token().text, "measurement");
    assert_eq!(lexer.next_token().kind, TokenKind::LParen);
    assert_eq!(lexer.next_token().text, "'cpu'");
    assert_eq!(lexer.next_token().kind, TokenKind::RParen);
    assert_eq!(lexer.next_token().kind, TokenKind::Eof);
}
