//! Comment Extraction
//!
//! Parenthetical comments may nest and may contain `;`. A semicolon outside
//! of parentheses comments out the rest of the line, parentheses included.

/// Remove comments from a line
///
/// Returns the trimmed remaining text and the trimmed comment bodies in the
/// order they were encountered. An unclosed `(` swallows the rest of the
/// line without producing a comment.
pub fn extract_comments(line: &str) -> (String, Vec<String>) {
    let mut stripped = String::with_capacity(line.len());
    let mut comments = Vec::new();
    let mut body = String::new();
    let mut depth = 0usize;

    for (idx, ch) in line.char_indices() {
        match ch {
            ';' if depth == 0 => {
                comments.push(line[idx + 1..].trim().to_string());
                break;
            }
            '(' => {
                if depth > 0 {
                    body.push(ch);
                }
                depth += 1;
            }
            ')' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    comments.push(body.trim().to_string());
                    body.clear();
                } else {
                    body.push(ch);
                }
            }
            _ if depth > 0 => body.push(ch),
            _ => stripped.push(ch),
        }
    }

    if depth > 0 {
        log::trace!("Dropping unterminated comment: {:?}", body);
    }

    (stripped.trim().to_string(), comments)
}

/// Remove every whitespace character
pub fn collapse_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}
