//! Interpretation of literal token text.
//!
//! The lexer only delimits literals; turning their text into values happens
//! here, while the parser builds nodes. Every function is pure.

use std::time::Duration;

use regex::Regex;
use thiserror::Error;

/// Errors raised while interpreting literal text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralError {
    /// Hex prefix, more than one decimal point, or non-decimal digits.
    #[error("illegal number syntax: {0:?}")]
    IllegalNumberSyntax(String),

    #[error("invalid duration: {0:?}")]
    InvalidDuration(String),

    #[error("invalid string literal: {0:?}")]
    InvalidString(String),

    #[error("invalid regex {pattern:?}: {message}")]
    InvalidRegex { pattern: String, message: String },
}

/// Value of a number literal. Integers and floats are distinct variants,
/// so a literal can never be both.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberValue {
    Int(i64),
    Float(f64),
}

impl NumberValue {
    pub fn is_int(&self) -> bool {
        matches!(self, NumberValue::Int(_))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, NumberValue::Float(_))
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            NumberValue::Int(n) => Some(*n),
            NumberValue::Float(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            NumberValue::Float(n) => Some(*n),
            NumberValue::Int(_) => None,
        }
    }
}

/// Duration units in the order the formatter prefers them.
const DURATION_UNITS: [(&str, u64); 8] = [
    ("w", 7 * 24 * 3600 * 1_000_000),
    ("d", 24 * 3600 * 1_000_000),
    ("h", 3600 * 1_000_000),
    ("m", 60 * 1_000_000),
    ("s", 1_000_000),
    ("ms", 1_000),
    ("u", 1),
    ("µ", 1),
];

/// Interprets number literal text.
///
/// Text with one `.` is a float (`"42."` is `42.0`); text without one is a
/// base-10 integer, leading zeros included (`"04"` is `4`). A `0x` prefix
/// or a second `.` is rejected.
pub fn parse_number(text: &str) -> Result<NumberValue, LiteralError> {
    let illegal = || LiteralError::IllegalNumberSyntax(text.to_string());

    if text.contains("0x") {
        return Err(illegal());
    }

    let dots = text.matches('.').count();
    if dots > 1 {
        return Err(illegal());
    }
    if text.is_empty() || text == "." || !text.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(illegal());
    }

    match text.split_once('.') {
        Some((whole, fraction)) => {
            let whole = if whole.is_empty() { "0" } else { whole };
            let fraction = if fraction.is_empty() { "0" } else { fraction };
            format!("{whole}.{fraction}")
                .parse::<f64>()
                .map(NumberValue::Float)
                .map_err(|_| illegal())
        }
        None => text
            .parse::<i64>()
            .map(NumberValue::Int)
            .map_err(|_| illegal()),
    }
}

/// Splits `<magnitude><unit>` when the unit is a known duration unit.
pub(crate) fn split_duration(text: &str) -> Option<(&str, &str)> {
    let idx = text.find(|c: char| !(c.is_ascii_digit() || c == '.'))?;
    if idx == 0 {
        return None;
    }
    let (magnitude, unit) = text.split_at(idx);
    DURATION_UNITS
        .iter()
        .any(|(name, _)| *name == unit)
        .then_some((magnitude, unit))
}

/// Interprets duration literal text such as `10s` or `250ms`.
pub fn parse_duration(text: &str) -> Result<Duration, LiteralError> {
    let invalid = || LiteralError::InvalidDuration(text.to_string());

    let (magnitude, unit) = split_duration(text).ok_or_else(invalid)?;
    let magnitude: u64 = magnitude.parse().map_err(|_| invalid())?;
    let micros_per_unit = DURATION_UNITS
        .iter()
        .find(|(name, _)| *name == unit)
        .map(|(_, micros)| *micros)
        .ok_or_else(invalid)?;

    magnitude
        .checked_mul(micros_per_unit)
        .map(Duration::from_micros)
        .ok_or_else(invalid)
}

/// Renders a duration with the largest unit that divides it evenly.
pub fn format_duration(duration: Duration) -> String {
    let micros = duration.as_micros();
    if micros == 0 {
        return "0s".to_string();
    }
    for (unit, size) in DURATION_UNITS {
        let size = u128::from(size);
        if micros % size == 0 {
            return format!("{}{}", micros / size, unit);
        }
    }
    format!("{micros}u")
}

fn unescape(inner: &str, quote: char) -> String {
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.next() {
            Some(c) if c == quote || c == '\\' => result.push(c),
            Some(c) => {
                result.push('\\');
                result.push(c);
            }
            None => result.push('\\'),
        }
    }
    result
}

fn escape(value: &str, quote: char) -> String {
    let mut result = String::with_capacity(value.len() + 2);
    result.push(quote);
    for ch in value.chars() {
        if ch == quote || ch == '\\' {
            result.push('\\');
        }
        result.push(ch);
    }
    result.push(quote);
    result
}

/// Strips the quotes of a string literal. Triple quoted strings are raw.
pub fn unquote_string(raw: &str) -> Result<String, LiteralError> {
    if raw.len() >= 6 && raw.starts_with("'''") && raw.ends_with("'''") {
        return Ok(raw[3..raw.len() - 3].to_string());
    }
    if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        return Ok(unescape(&raw[1..raw.len() - 1], '\''));
    }
    Err(LiteralError::InvalidString(raw.to_string()))
}

/// Strips the double quotes of a reference literal.
pub fn unquote_reference(raw: &str) -> Result<String, LiteralError> {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return Ok(unescape(&raw[1..raw.len() - 1], '"'));
    }
    Err(LiteralError::InvalidString(raw.to_string()))
}

pub fn quote_string(value: &str) -> String {
    escape(value, '\'')
}

pub fn quote_reference(value: &str) -> String {
    escape(value, '"')
}

/// Compiles a `/pattern/` literal; `\/` stands for a literal slash.
pub fn parse_regex(raw: &str) -> Result<Regex, LiteralError> {
    let pattern = raw
        .strip_prefix('/')
        .and_then(|rest| rest.strip_suffix('/'))
        .ok_or_else(|| LiteralError::InvalidRegex {
            pattern: raw.to_string(),
            message: "missing '/' delimiters".to_string(),
        })?
        .replace("\\/", "/");

    Regex::new(&pattern).map_err(|e| LiteralError::InvalidRegex {
        pattern,
        message: e.to_string(),
    })
}

/// Inverse of [`parse_regex`] for the formatter.
pub fn quote_regex(pattern: &str) -> String {
    format!("/{}/", pattern.replace('/', "\\/"))
}
