//! Incremental UTF-8 decoding of byte chunks.

/// Decodes byte chunks into text, holding back a multi-byte character that
/// is split across two chunks
#[derive(Debug, Default, Clone)]
pub struct Utf8ChunkDecoder {
    pending: Vec<u8>,
}

impl Utf8ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode as much of `bytes` as possible; invalid sequences become U+FFFD
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);

        let mut text = String::with_capacity(self.pending.len());
        let mut input = self.pending.as_slice();

        loop {
            match std::str::from_utf8(input) {
                Ok(valid) => {
                    text.push_str(valid);
                    input = &[];
                    break;
                }
                Err(err) => {
                    let (valid, rest) = input.split_at(err.valid_up_to());
                    text.push_str(std::str::from_utf8(valid).unwrap_or_default());
                    match err.error_len() {
                        Some(len) => {
                            text.push(char::REPLACEMENT_CHARACTER);
                            input = &rest[len..];
                        }
                        // Incomplete sequence at the end: wait for more bytes
                        None => {
                            input = rest;
                            break;
                        }
                    }
                }
            }
        }

        self.pending = input.to_vec();
        text
    }

    /// Flush whatever is still pending at end of input
    pub fn finish(&mut self) -> String {
        let pending = std::mem::take(&mut self.pending);
        String::from_utf8_lossy(&pending).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passes_through() {
        let mut decoder = Utf8ChunkDecoder::new();
        assert_eq!(decoder.decode(b"G0 X1\n"), "G0 X1\n");
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn test_split_multibyte_character() {
        let bytes = "(température)".as_bytes();
        let split = bytes.iter().position(|&b| b == 0xC3).unwrap() + 1;

        let mut decoder = Utf8ChunkDecoder::new();
        let mut text = decoder.decode(&bytes[..split]);
        assert_eq!(text, "(temp");
        text.push_str(&decoder.decode(&bytes[split..]));
        assert_eq!(text, "(température)");
    }

    #[test]
    fn test_invalid_bytes_are_replaced() {
        let mut decoder = Utf8ChunkDecoder::new();
        assert_eq!(decoder.decode(b"G0\xFFX1"), "G0\u{FFFD}X1");
    }

    #[test]
    fn test_truncated_sequence_at_end_of_input() {
        let mut decoder = Utf8ChunkDecoder::new();
        assert_eq!(decoder.decode(b"G0\xE2\x82"), "G0");
        assert_eq!(decoder.finish(), "\u{FFFD}");
    }
}
