//! `gcode-parse` command
//!
//! Streams records to stdout as JSON lines while the input is parsed.

use std::io::{self, Write};
use std::ops::ControlFlow;

use anyhow::{Context, Result};

use crate::api;
use crate::config::{Config, Input};
use crate::parser::LineRecord;
use crate::stream::LineSink;

/// Writes each record as one line of JSON
pub struct JsonLinesSink<W: Write> {
    writer: W,
    checksum_failures: usize,
    write_error: Option<io::Error>,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            checksum_failures: 0,
            write_error: None,
        }
    }

    pub fn checksum_failures(&self) -> usize {
        self.checksum_failures
    }

    /// Flush buffered output, reporting the write failure that stopped the sink
    pub fn flush(&mut self) -> Result<()> {
        if let Some(err) = self.write_error.take() {
            return Err(err).context("Failed to write record");
        }
        self.writer.flush().context("Failed to flush output")
    }

    fn write_record(&mut self, record: &LineRecord) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")
    }
}

impl<W: Write> LineSink for JsonLinesSink<W> {
    fn emit(&mut self, record: &LineRecord) -> ControlFlow<()> {
        if record.checksum_failed {
            self.checksum_failures += 1;
            log::warn!("Checksum mismatch: {}", record.line);
        }

        match self.write_record(record) {
            Ok(()) => ControlFlow::Continue(()),
            Err(e) => {
                log::debug!("Stopping output after write failure: {}", e);
                self.write_error = Some(e);
                ControlFlow::Break(())
            }
        }
    }

    fn finish(&mut self, records: &[LineRecord]) {
        log::info!(
            "Parsed {} lines ({} checksum failures)",
            records.len(),
            self.checksum_failures
        );
    }
}

/// Run the parser according to `config`, printing to stdout
pub async fn run(config: Config) -> Result<()> {
    if let Some(path) = &config.config_file {
        log::debug!("Using config file {}", path.display());
    }

    let stdout = io::stdout();
    write_records(&config, io::BufWriter::new(stdout.lock())).await
}

/// Parse the configured input and write its records to `writer`
pub async fn write_records<W: Write>(config: &Config, writer: W) -> Result<()> {
    let mut sink = JsonLinesSink::new(writer);

    if config.sync {
        let records = match &config.input {
            Input::File(path) => api::parse_file_sync(path, &config.options)?,
            Input::Stdin => {
                let text = io::read_to_string(io::stdin()).context("Failed to read stdin")?;
                api::parse_text_sync(&text, &config.options)
            }
        };
        for record in &records {
            if sink.emit(record).is_break() {
                break;
            }
        }
        sink.flush()?;
        sink.finish(&records);
        return Ok(());
    }

    let parsed = match &config.input {
        Input::File(path) => api::parse_file(path, &config.options, &mut sink).await,
        Input::Stdin => api::parse_stream(tokio::io::stdin(), &config.options, &mut sink).await,
    };

    // A write failure cancels the parse; report it rather than the cancellation
    sink.flush()?;
    parsed.map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_line, ParseOptions};

    #[test]
    fn test_json_lines_sink() {
        let mut out = Vec::new();
        let mut sink = JsonLinesSink::new(&mut out);
        let options = ParseOptions::default();

        assert!(sink.emit(&parse_line("G0 X1", &options)).is_continue());
        assert!(sink.emit(&parse_line("N8 G1 X3.0 Y3.0*30", &options)).is_continue());
        assert_eq!(sink.checksum_failures(), 1);
        drop(sink);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["line"], "G0 X1");
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["checksumFailed"], true);
    }

    /// Accepts `capacity` bytes, then fails every write
    struct FullWriter {
        capacity: usize,
    }

    impl Write for FullWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.capacity == 0 {
                return Err(io::Error::new(io::ErrorKind::StorageFull, "no space left"));
            }
            let n = buf.len().min(self.capacity);
            self.capacity -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn circle_config(sync: bool) -> Config {
        let fixture = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/circle.gcode");
        Config {
            input: Input::File(fixture.into()),
            options: ParseOptions::default(),
            sync,
            log_level: "warn".to_string(),
            config_file: None,
        }
    }

    fn assert_storage_full(err: anyhow::Error) {
        let io_err = err.downcast_ref::<io::Error>().expect("io error");
        assert_eq!(io_err.kind(), io::ErrorKind::StorageFull);
    }

    #[test]
    fn test_sink_reports_write_failure() {
        let mut sink = JsonLinesSink::new(FullWriter { capacity: 10 });
        let options = ParseOptions::default();

        assert!(sink.emit(&parse_line("G0 X1 Y2 Z3", &options)).is_break());
        assert_storage_full(sink.flush().unwrap_err());
        assert!(sink.flush().is_ok());
    }

    #[test]
    fn test_flush_failure_is_reported() {
        let mut sink = JsonLinesSink::new(io::BufWriter::new(FullWriter { capacity: 0 }));
        assert!(sink.emit(&parse_line("G0 X1", &ParseOptions::default())).is_continue());
        assert_storage_full(sink.flush().unwrap_err());
    }

    #[tokio::test]
    async fn test_write_failure_fails_both_modes() {
        for sync in [true, false] {
            let err = write_records(&circle_config(sync), FullWriter { capacity: 50 })
                .await
                .unwrap_err();
            assert_storage_full(err);

            let err = write_records(&circle_config(sync), io::BufWriter::new(FullWriter { capacity: 0 }))
                .await
                .unwrap_err();
            assert_storage_full(err);
        }
    }

    #[tokio::test]
    async fn test_write_records_succeeds() {
        for sync in [true, false] {
            let mut out = Vec::new();
            write_records(&circle_config(sync), &mut out).await.unwrap();
            assert_eq!(String::from_utf8(out).unwrap().lines().count(), 7);
        }
    }
}
