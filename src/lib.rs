//! G-code Parser
//!
//! Turns G-code text, files or arbitrarily chunked byte streams into one
//! structured record per line.
//!
//! This library provides:
//! - Comment extraction, word tokenizing and checksum validation per line
//! - Reassembly of complete lines from chunked input
//! - Sync and async parse entry points with pluggable line sinks
//! - Configuration and a small CLI

pub mod api;
pub mod cli;
pub mod config;
pub mod parser;
pub mod stream;

// Re-exports for clean public API
pub use api::{parse_file, parse_file_sync, parse_stream, parse_text, parse_text_sync};
pub use config::Config;
pub use parser::{compute_checksum, parse_line, Argument, LineMode, LineRecord, ParseOptions, Word};
pub use stream::{ChannelSink, FnSink, GCodeLineStream, LineReassembler, LineSink, NullSink, StreamCancelled};
