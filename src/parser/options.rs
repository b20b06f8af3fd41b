//! Parse Options
//!
//! Line-mode policy, word representation and batching knobs shared by every
//! entry point. Defaults live here as named constants instead of being
//! scattered through the parser and the stream.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Number of lines parsed per scheduling turn when streaming
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Size of each read issued against a byte source
pub const DEFAULT_READ_BUFFER_SIZE: usize = 64 * 1024;

/// Which textual rendering of a line ends up in `LineRecord::line`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LineMode {
    /// The line exactly as given, comments and whitespace included
    #[default]
    Original,
    /// Comments removed and the ends trimmed; inner whitespace kept
    Stripped,
    /// Comments and all whitespace removed
    Compact,
}

impl LineMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineMode::Original => "original",
            LineMode::Stripped => "stripped",
            LineMode::Compact => "compact",
        }
    }

    /// Resolve a mode name, falling back to `Original` for anything unknown
    pub fn from_name_or_default(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            log::warn!("Unknown line mode '{}', using '{}'", name, LineMode::Original);
            LineMode::Original
        })
    }
}

impl fmt::Display for LineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a line mode name is not recognized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLineMode(pub String);

impl fmt::Display for UnknownLineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown line mode '{}' (expected original, stripped or compact)",
            self.0
        )
    }
}

impl std::error::Error for UnknownLineMode {}

impl FromStr for LineMode {
    type Err = UnknownLineMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "original" => Ok(LineMode::Original),
            "stripped" => Ok(LineMode::Stripped),
            "compact" => Ok(LineMode::Compact),
            _ => Err(UnknownLineMode(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for LineMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(LineMode::from_name_or_default(&name))
    }
}

/// Options recognized by every parse entry point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    pub line_mode: LineMode,
    /// Emit words as `"G1"` strings instead of `("G", 1)` pairs
    pub flatten: bool,
    /// Lines parsed per scheduling turn by the stream driver
    pub batch_size: usize,
    /// Bytes requested per read from a stream or file
    pub read_buffer_size: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            line_mode: LineMode::Original,
            flatten: false,
            batch_size: DEFAULT_BATCH_SIZE,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }
}

impl ParseOptions {
    pub fn with_line_mode(mut self, line_mode: LineMode) -> Self {
        self.line_mode = line_mode;
        self
    }

    pub fn flattened(mut self) -> Self {
        self.flatten = true;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_read_buffer_size(mut self, read_buffer_size: usize) -> Self {
        self.read_buffer_size = read_buffer_size;
        self
    }

    /// Batch size actually used; zero means one line per turn
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.max(1)
    }

    pub fn effective_read_buffer_size(&self) -> usize {
        self.read_buffer_size.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_mode_from_str() {
        assert_eq!("stripped".parse::<LineMode>(), Ok(LineMode::Stripped));
        assert_eq!(" Compact ".parse::<LineMode>(), Ok(LineMode::Compact));
        assert!("verbose".parse::<LineMode>().is_err());
    }

    #[test]
    fn test_unknown_line_mode_falls_back_to_original() {
        assert_eq!(LineMode::from_name_or_default("bogus"), LineMode::Original);
        assert_eq!(LineMode::from_name_or_default("compact"), LineMode::Compact);
    }

    #[test]
    fn test_defaults() {
        let options = ParseOptions::default();
        assert_eq!(options.line_mode, LineMode::Original);
        assert!(!options.flatten);
        assert_eq!(options.batch_size, DEFAULT_BATCH_SIZE);
    }

    #[test]
    fn test_zero_batch_size_means_one() {
        let options = ParseOptions::default().with_batch_size(0);
        assert_eq!(options.effective_batch_size(), 1);
    }

    #[test]
    fn test_deserialize_partial_toml() {
        let options: ParseOptions = toml::from_str("line_mode = \"stripped\"\nflatten = true").unwrap();
        assert_eq!(options.line_mode, LineMode::Stripped);
        assert!(options.flatten);
        assert_eq!(options.batch_size, DEFAULT_BATCH_SIZE);
    }
}
