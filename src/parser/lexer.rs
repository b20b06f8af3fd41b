//! G-code Lexer
//!
//! Scans a comment-free, whitespace-collapsed line left to right. Every
//! pattern is identified by its leading character, so no backtracking is
//! needed; characters that start no pattern are skipped.

use crate::parser::ast::{Argument, Word};

/// Token types recognized in a compact line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Letter followed by digits, signs or dots, e.g. "X-1.5"
    Word,
    /// Grbl system command, e.g. "$H", "$$"
    GrblCommand,
    /// TinyG/g2core JSON command, from `{` to the end of the line
    JsonCommand,
    /// bCNC/CNCjs command, from `%` to the end of the line
    PercentCommand,
    /// `*` followed by digits
    Checksum,
}

/// A token with its text content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

/// Tokenize a compact line
pub fn tokenize_line(compact: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let bytes = compact.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        let start = pos;
        let (kind, end) = match bytes[pos] {
            b'%' => (TokenKind::PercentCommand, bytes.len()),
            b'{' => (TokenKind::JsonCommand, bytes.len()),
            b'$' if bytes.get(pos + 1) == Some(&b'$') => (TokenKind::GrblCommand, pos + 2),
            b'$' => (
                TokenKind::GrblCommand,
                scan(bytes, pos + 1, |b| b.is_ascii_alphanumeric() || b == b'#'),
            ),
            b'*' => (TokenKind::Checksum, scan(bytes, pos + 1, |b| b.is_ascii_digit())),
            b if b.is_ascii_alphabetic() => (TokenKind::Word, scan(bytes, pos + 1, is_argument_byte)),
            _ => {
                pos += utf8_len(bytes[pos]);
                continue;
            }
        };

        // Letters and `*` need at least one trailing character to form a token
        let empty_tail = matches!(kind, TokenKind::Word | TokenKind::Checksum) && end == start + 1;
        if empty_tail {
            pos += 1;
            continue;
        }

        tokens.push(Token {
            kind,
            text: &compact[start..end],
        });
        pos = end;
    }

    tokens
}

fn scan(bytes: &[u8], from: usize, accept: impl Fn(u8) -> bool) -> usize {
    bytes[from..]
        .iter()
        .position(|&b| !accept(b))
        .map_or(bytes.len(), |offset| from + offset)
}

fn is_argument_byte(b: u8) -> bool {
    b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.')
}

fn utf8_len(lead: u8) -> usize {
    match lead {
        0xF0..=0xFF => 4,
        0xE0..=0xEF => 3,
        0xC0..=0xDF => 2,
        _ => 1,
    }
}

/// Words, commands and special fields of one line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenizedLine {
    pub words: Vec<Word>,
    pub cmds: Vec<String>,
    pub line_number: Option<i64>,
    pub checksum: Option<u32>,
}

/// Turn a compact line into words, commands and special fields
///
/// `raw_line` is what `%` and `{` commands record: those dialects may contain
/// characters the lexer does not split on, so the whole trimmed line is kept.
/// Only the first `N` and the first `*` are special; repeats become words.
pub fn tokenize(compact: &str, raw_line: &str, flatten: bool) -> TokenizedLine {
    let mut result = TokenizedLine::default();

    for token in tokenize_line(compact) {
        match token.kind {
            TokenKind::PercentCommand | TokenKind::JsonCommand => {
                result.cmds.push(raw_line.trim().to_string());
                continue;
            }
            TokenKind::GrblCommand => {
                result.cmds.push(token.text.to_string());
                continue;
            }
            TokenKind::Checksum | TokenKind::Word => {}
        }

        let mut chars = token.text.chars();
        let letter = match chars.next() {
            Some(c) => c.to_ascii_uppercase(),
            None => continue,
        };
        let argument = chars.as_str();

        if letter == 'N' && result.line_number.is_none() {
            if let Some(line_number) = parse_line_number(argument) {
                result.line_number = Some(line_number);
                continue;
            }
        }

        if letter == '*' && result.checksum.is_none() {
            if let Ok(checksum) = argument.parse::<u32>() {
                result.checksum = Some(checksum);
                continue;
            }
        }

        let word = Word::Pair(letter, Argument::from_text(argument));
        result.words.push(if flatten { word.flatten() } else { word });
    }

    result
}

/// Line numbers must be integral, e.g. "12" or "12.0"
fn parse_line_number(argument: &str) -> Option<i64> {
    let value = argument.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}
