//! Chunked Line Reassembly
//!
//! Chunks arrive with boundaries that have nothing to do with line
//! boundaries. The reassembler keeps the unterminated tail of the input
//! between calls and hands back only complete lines.

use regex::Regex;

/// A run of characters closed by `\r\n`, `\r` or `\n`, or a trailing run
/// without a terminator
pub const LINE_PATTERN: &str = r"[^\r\n]*(?:\r\n|\r|\n)|[^\r\n]+$";

/// Reassembler lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReassemblerState {
    /// Nothing buffered
    Idle,
    /// A partial line is waiting for its terminator
    Buffering,
    /// End of input was signaled; no more chunks are accepted
    Draining,
}

/// Splits an arbitrarily chunked text stream into trimmed, non-empty lines
#[derive(Debug, Clone)]
pub struct LineReassembler {
    line_re: Regex,
    carry: String,
    last_chunk_ended_with_cr: bool,
    state: ReassemblerState,
}

impl Default for LineReassembler {
    fn default() -> Self {
        Self::new()
    }
}

impl LineReassembler {
    pub fn new() -> Self {
        Self::with_line_pattern(Regex::new(LINE_PATTERN).expect("LINE_PATTERN is a valid regex"))
    }

    /// Build a reassembler around an already compiled line pattern
    pub fn with_line_pattern(line_re: Regex) -> Self {
        Self {
            line_re,
            carry: String::new(),
            last_chunk_ended_with_cr: false,
            state: ReassemblerState::Idle,
        }
    }

    pub fn state(&self) -> ReassemblerState {
        self.state
    }

    /// The unterminated tail held over from previous chunks
    pub fn carry_over(&self) -> &str {
        &self.carry
    }

    /// Append a chunk and return every line it completed
    pub fn feed(&mut self, chunk: &str) -> Vec<String> {
        if chunk.is_empty() {
            return Vec::new();
        }
        if self.state == ReassemblerState::Draining {
            log::warn!("Ignoring {} bytes fed after end of input", chunk.len());
            return Vec::new();
        }

        self.carry.push_str(chunk);

        if !chunk.contains(['\r', '\n']) {
            self.last_chunk_ended_with_cr = false;
            self.state = ReassemblerState::Buffering;
            return Vec::new();
        }

        let mut fragments: Vec<&str> = self.line_re.find_iter(&self.carry).map(|m| m.as_str()).collect();

        // Second half of a CRLF whose CR already closed the previous line
        if self.last_chunk_ended_with_cr && fragments.first() == Some(&"\n") {
            fragments.remove(0);
        }

        let remainder = if self.carry.ends_with(['\r', '\n']) {
            String::new()
        } else {
            fragments.pop().map(str::to_string).unwrap_or_default()
        };

        let lines: Vec<String> = fragments
            .into_iter()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        self.last_chunk_ended_with_cr = self.carry.ends_with('\r');
        self.carry = remainder;
        self.state = if self.carry.is_empty() {
            ReassemblerState::Idle
        } else {
            ReassemblerState::Buffering
        };

        log::trace!(
            "Reassembled {} lines, carrying {} bytes",
            lines.len(),
            self.carry.len()
        );
        lines
    }

    /// Signal end of input and return the unterminated remainder, if any
    pub fn finish(&mut self) -> Option<String> {
        let remainder = std::mem::take(&mut self.carry);
        self.last_chunk_ended_with_cr = false;
        self.state = ReassemblerState::Draining;

        let line = remainder.trim();
        (!line.is_empty()).then(|| line.to_string())
    }

    /// Drop any buffered input without producing a line
    pub fn abort(&mut self) {
        if !self.carry.is_empty() {
            log::debug!("Discarding {} unflushed bytes", self.carry.len());
        }
        self.carry.clear();
        self.last_chunk_ended_with_cr = false;
        self.state = ReassemblerState::Draining;
    }
}
