//! Line Records
//!
//! Plain data produced for every logical line of G-code. No parsing logic
//! lives here, only the shapes and their serialized form.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The value following a word letter
///
/// Numeric text becomes a float; anything else (e.g. `X1.2.3`) is kept
/// verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Argument {
    Number(f64),
    Text(String),
}

impl Argument {
    /// Coerce raw argument text, keeping it as text when it is not numeric
    pub fn from_text(text: &str) -> Self {
        match text.parse::<f64>() {
            Ok(value) if value.is_finite() => Argument::Number(value),
            _ => Argument::Text(text.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Argument::Number(value) => Some(*value),
            Argument::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Argument::Number(_) => None,
            Argument::Text(text) => Some(text),
        }
    }
}

impl From<f64> for Argument {
    fn from(value: f64) -> Self {
        Argument::Number(value)
    }
}

impl From<&str> for Argument {
    fn from(text: &str) -> Self {
        Argument::Text(text.to_string())
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // -0 renders as 0
            Argument::Number(value) if *value == 0.0 => f.write_str("0"),
            Argument::Number(value) => write_number(f, *value),
            Argument::Text(text) => f.write_str(text),
        }
    }
}

/// Plain decimal inside `[1e-6, 1e21)`, exponent form with a signed
/// exponent outside it
fn write_number(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if (1e-6..1e21).contains(&value.abs()) {
        return write!(f, "{}", value);
    }

    let exponent_form = format!("{:e}", value);
    match exponent_form.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => write!(f, "{}e+{}", mantissa, exponent),
        _ => f.write_str(&exponent_form),
    }
}

/// A single letter-prefixed token such as `X10.5`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Word {
    /// `("X", 10.5)`
    Pair(char, Argument),
    /// `"X10.5"`, produced when flattening is requested
    Flat(String),
}

impl Word {
    pub fn new(letter: char, argument: impl Into<Argument>) -> Self {
        Word::Pair(letter, argument.into())
    }

    /// Collapse a pair into its flattened string form
    pub fn flatten(self) -> Self {
        match self {
            Word::Pair(letter, argument) => Word::Flat(format!("{}{}", letter, argument)),
            flat @ Word::Flat(_) => flat,
        }
    }

    pub fn letter(&self) -> Option<char> {
        match self {
            Word::Pair(letter, _) => Some(*letter),
            Word::Flat(text) => text.chars().next(),
        }
    }

    pub fn argument(&self) -> Option<&Argument> {
        match self {
            Word::Pair(_, argument) => Some(argument),
            Word::Flat(_) => None,
        }
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Word::Pair(letter, argument) => write!(f, "{}{}", letter, argument),
            Word::Flat(text) => f.write_str(text),
        }
    }
}

/// Everything extracted from one logical line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineRecord {
    /// Line text, rendered according to the line mode
    pub line: String,
    pub words: Vec<Word>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
    /// `$`, `%` and `{...}` control commands
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cmds: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<u32>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub checksum_failed: bool,
}

impl LineRecord {
    /// True when the line carried nothing but whitespace
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
            && self.comments.is_empty()
            && self.cmds.is_empty()
            && self.line_number.is_none()
            && self.checksum.is_none()
    }
}
