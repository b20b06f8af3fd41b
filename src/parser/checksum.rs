//! Checksum Validation
//!
//! RepRap-style special field: the checksum of a line is the XOR of its
//! UTF-16 code units up to, but not including, the `*` marker.

/// XOR of the UTF-16 code units of `text` before the first `*`
pub fn compute_checksum(text: &str) -> u32 {
    let payload = match text.find('*') {
        Some(idx) => &text[..idx],
        None => text,
    };

    payload.encode_utf16().fold(0, |cs, unit| cs ^ u32::from(unit))
}

/// Check a declared checksum against the line it was read from
pub fn validate(declared: u32, source_line: &str) -> bool {
    compute_checksum(source_line) == declared
}
