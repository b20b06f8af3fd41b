//! G-code Line Parser
//!
//! Turns one line of text into a `LineRecord`: comments are extracted first,
//! the remainder is collapsed and tokenized, and a declared checksum is
//! verified against the raw line.

pub mod ast;
pub mod checksum;
pub mod comments;
pub mod lexer;
pub mod options;

pub use ast::{Argument, LineRecord, Word};
pub use checksum::compute_checksum;
pub use comments::{collapse_whitespace, extract_comments};
pub use lexer::{tokenize, tokenize_line, Token, TokenKind, TokenizedLine};
pub use options::{LineMode, ParseOptions, DEFAULT_BATCH_SIZE, DEFAULT_READ_BUFFER_SIZE};

/// Parse a single line of G-code into a record
///
/// The line mode only decides what lands in `line`; extraction always runs
/// on the comment-free, whitespace-collapsed text.
pub fn parse_line(line: &str, options: &ParseOptions) -> LineRecord {
    let (stripped, comments) = comments::extract_comments(line);
    let compact = comments::collapse_whitespace(&stripped);
    let tokens = lexer::tokenize(&compact, line, options.flatten);

    let checksum_failed = match tokens.checksum {
        Some(declared) => !checksum::validate(declared, line),
        None => false,
    };
    if checksum_failed {
        log::debug!("Checksum mismatch on line {:?}", line);
    }

    let line = match options.line_mode {
        LineMode::Original => line.to_string(),
        LineMode::Stripped => stripped,
        LineMode::Compact => compact,
    };

    LineRecord {
        line,
        words: tokens.words,
        comments,
        cmds: tokens.cmds,
        line_number: tokens.line_number,
        checksum: tokens.checksum,
        checksum_failed,
    }
}
