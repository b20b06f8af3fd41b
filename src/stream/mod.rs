//! Streaming G-code Parsing
//!
//! A `GCodeLineStream` is one parse session: it decodes byte chunks,
//! reassembles them into lines and parses each line. The async driver emits
//! records in batches and yields to the scheduler between batches so that a
//! huge chunk does not hold the thread for its whole length.

pub mod decoder;
pub mod reassembler;
pub mod sink;

use std::fmt;

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::parser::{parse_line, LineRecord, ParseOptions};

pub use decoder::Utf8ChunkDecoder;
pub use reassembler::{LineReassembler, ReassemblerState, LINE_PATTERN};
pub use sink::{ChannelSink, FnSink, LineSink, NullSink};

/// The sink asked to stop before the input was exhausted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamCancelled;

impl fmt::Display for StreamCancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("G-code parse cancelled by its line sink")
    }
}

impl std::error::Error for StreamCancelled {}

/// One streaming parse session
#[derive(Debug)]
pub struct GCodeLineStream {
    reassembler: LineReassembler,
    decoder: Utf8ChunkDecoder,
    options: ParseOptions,
}

impl GCodeLineStream {
    pub fn new(options: ParseOptions) -> Self {
        Self {
            reassembler: LineReassembler::new(),
            decoder: Utf8ChunkDecoder::new(),
            options,
        }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn state(&self) -> ReassemblerState {
        self.reassembler.state()
    }

    /// Feed a text chunk and parse every line it completes
    pub fn feed(&mut self, chunk: &str) -> Vec<LineRecord> {
        let lines = self.reassembler.feed(chunk);
        self.parse_all(&lines)
    }

    /// Feed a raw byte chunk
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Vec<LineRecord> {
        let text = self.decoder.decode(bytes);
        self.feed(&text)
    }

    /// End the session, parsing whatever was left without a terminator
    pub fn finish(&mut self) -> Vec<LineRecord> {
        let lines = self.drain();
        self.parse_all(&lines)
    }

    /// End the session without emitting the unterminated remainder
    pub fn abort(&mut self) {
        self.decoder = Utf8ChunkDecoder::new();
        self.reassembler.abort();
    }

    /// Feed bytes, emitting the completed records to `sink` in batches
    pub async fn push_bytes<S: LineSink + ?Sized>(
        &mut self,
        bytes: &[u8],
        sink: &mut S,
        results: &mut Vec<LineRecord>,
    ) -> Result<(), StreamCancelled> {
        let text = self.decoder.decode(bytes);
        let lines = self.reassembler.feed(&text);
        self.emit_batched(lines, sink, results).await
    }

    /// End the session, emitting the final records to `sink`
    pub async fn flush<S: LineSink + ?Sized>(
        &mut self,
        sink: &mut S,
        results: &mut Vec<LineRecord>,
    ) -> Result<(), StreamCancelled> {
        let lines = self.drain();
        self.emit_batched(lines, sink, results).await
    }

    fn drain(&mut self) -> Vec<String> {
        let tail = self.decoder.finish();
        let mut lines = self.reassembler.feed(&tail);
        lines.extend(self.reassembler.finish());
        lines
    }

    fn parse_all(&self, lines: &[String]) -> Vec<LineRecord> {
        lines
            .iter()
            .map(|line| parse_line(line, &self.options))
            .collect()
    }

    async fn emit_batched<S: LineSink + ?Sized>(
        &self,
        lines: Vec<String>,
        sink: &mut S,
        results: &mut Vec<LineRecord>,
    ) -> Result<(), StreamCancelled> {
        let mut batches = lines.chunks(self.options.effective_batch_size()).peekable();

        while let Some(batch) = batches.next() {
            for line in batch {
                let record = parse_line(line, &self.options);
                if sink.emit(&record).is_break() {
                    return Err(StreamCancelled);
                }
                results.push(record);
            }

            if batches.peek().is_some() {
                log::trace!("Yielding after a batch of {} lines", batch.len());
                tokio::task::yield_now().await;
            }
        }

        Ok(())
    }
}

/// Parse everything readable from `reader`
///
/// Records are emitted to `sink` as they are produced and returned together
/// once the reader hits end of input. A read error or a sink that breaks
/// ends the parse without flushing the partial last line.
pub async fn parse_stream<R, S>(
    mut reader: R,
    options: &ParseOptions,
    mut sink: S,
) -> Result<Vec<LineRecord>>
where
    R: AsyncRead + Unpin,
    S: LineSink,
{
    let mut stream = GCodeLineStream::new(options.clone());
    let mut results = Vec::new();
    let mut buf = vec![0u8; options.effective_read_buffer_size()];

    loop {
        let read = match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(read) => read,
            Err(err) => {
                stream.abort();
                return Err(err).context("Failed to read G-code input");
            }
        };

        if let Err(cancelled) = stream.push_bytes(&buf[..read], &mut sink, &mut results).await {
            stream.abort();
            return Err(cancelled.into());
        }
    }

    stream.flush(&mut sink, &mut results).await?;
    sink.finish(&results);

    log::debug!("Parsed {} lines", results.len());
    Ok(results)
}
