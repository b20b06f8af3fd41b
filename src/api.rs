//! Parse Entry Points
//!
//! Thin wiring of in-memory text, files and async readers through the line
//! parser. The synchronous variants split the whole text at once; the async
//! variants always go through a `GCodeLineStream`.

use std::path::Path;

use anyhow::{Context, Result};
use tokio::io::AsyncRead;

use crate::parser::{parse_line, LineRecord, ParseOptions};
use crate::stream::{self, LineSink};

/// Parse a complete text, one record per non-blank line
///
/// Lines are split on `\n` and trimmed, so `\r\n` input is handled too.
pub fn parse_text_sync(text: &str, options: &ParseOptions) -> Vec<LineRecord> {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| parse_line(line, options))
        .collect()
}

/// Read a whole file and parse it with `parse_text_sync`
pub fn parse_file_sync(path: impl AsRef<Path>, options: &ParseOptions) -> Result<Vec<LineRecord>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read G-code file {}", path.display()))?;
    Ok(parse_text_sync(&text, options))
}

/// Parse an async byte source, notifying `sink` as records are produced
pub async fn parse_stream<R, S>(reader: R, options: &ParseOptions, sink: S) -> Result<Vec<LineRecord>>
where
    R: AsyncRead + Unpin,
    S: LineSink,
{
    stream::parse_stream(reader, options, sink).await
}

/// Parse in-memory text through the streaming path
pub async fn parse_text<S: LineSink>(text: &str, options: &ParseOptions, sink: S) -> Result<Vec<LineRecord>> {
    stream::parse_stream(text.as_bytes(), options, sink).await
}

/// Open `path` and parse it through the streaming path
pub async fn parse_file<S: LineSink>(
    path: impl AsRef<Path>,
    options: &ParseOptions,
    sink: S,
) -> Result<Vec<LineRecord>> {
    let path = path.as_ref();
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("Failed to open G-code file {}", path.display()))?;

    log::debug!("Parsing {}", path.display());
    stream::parse_stream(file, options, sink)
        .await
        .with_context(|| format!("Failed to parse G-code file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{LineMode, Word};
    use crate::stream::NullSink;

    #[test]
    fn test_parse_text_sync_empty() {
        assert!(parse_text_sync("", &ParseOptions::default()).is_empty());
        assert!(parse_text_sync("\n \r\n\t\n", &ParseOptions::default()).is_empty());
    }

    #[test]
    fn test_parse_text_sync_trims_crlf() {
        let results = parse_text_sync("G0 X1\r\nG1 Y2\r\n", &ParseOptions::default());
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].line, "G0 X1");
        assert_eq!(results[1].words, vec![Word::new('G', 1.0), Word::new('Y', 2.0)]);
    }

    #[test]
    fn test_parse_text_sync_honours_line_mode() {
        let options = ParseOptions::default().with_line_mode(LineMode::Compact);
        let results = parse_text_sync("G0 X 1 ; rapid", &options);
        assert_eq!(results[0].line, "G0X1");
    }

    #[tokio::test]
    async fn test_parse_text_matches_sync() {
        let text = "N1 G20 (inches)\r\nN2 G90\r\n$H\n%wait\nG0 X1";
        let options = ParseOptions::default();
        let streamed = parse_text(text, &options, NullSink).await.unwrap();
        assert_eq!(streamed, parse_text_sync(text, &options));
    }

    #[tokio::test]
    async fn test_parse_text_empty() {
        let results = parse_text("", &ParseOptions::default(), NullSink).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_parse_file_empty_path_is_an_error() {
        let err = parse_file("", &ParseOptions::default(), NullSink).await.unwrap_err();
        assert!(err.downcast_ref::<std::io::Error>().is_some());
    }
}
