//! Lenient reader for JSON-with-comments files.
//!
//! Editor config files are JSONC: `//` line comments, `/* */` block
//! comments and trailing commas are all accepted by the editor. The reader
//! removes them before handing the text to `serde_json`. Both passes track
//! string literals, so `"https://example.com"` and `"a/*b"` survive intact.
//!
//! Comments are not preserved. Anything rewritten through this module loses
//! them.

use crate::fs::Filesystem;
use crate::{Error, Result};
use serde_json::{Map, Value};
use std::path::Path;

/// Errors from reading a JSONC document.
#[derive(Debug, thiserror::Error)]
pub enum JsoncError {
    #[error("no JSON {expected} found")]
    Missing { expected: &'static str },

    #[error("top-level value is not a JSON {expected}")]
    WrongType { expected: &'static str },

    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

impl JsoncError {
    /// Attach the offending file to the error.
    pub fn at(self, path: &Path) -> Error {
        Error::MalformedArtifact {
            path: path.to_path_buf(),
            reason: self.to_string(),
        }
    }
}

/// Remove `//` and `/* */` comments outside string literals.
///
/// Newlines inside block comments are kept so parse errors still report
/// the right line.
pub fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                while chars.next_if(|&next| next != '\n').is_some() {}
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                out.push(' ');
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    if next == '\n' {
                        out.push('\n');
                    }
                    prev = next;
                }
            }
            _ => out.push(c),
        }
    }

    out
}

/// Remove commas that directly precede `]` or `}` (ignoring whitespace).
pub fn strip_trailing_commas(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut in_string = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if in_string {
            out.push(c);
            if c == '\\' {
                if let Some(&escaped) = chars.get(i + 1) {
                    out.push(escaped);
                    i += 1;
                }
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
            out.push(c);
        } else if c == ',' {
            let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
            if !matches!(next, Some(']') | Some('}')) {
                out.push(c);
            }
        } else {
            out.push(c);
        }
        i += 1;
    }

    out
}

/// Strip comments and trailing commas.
pub fn clean(input: &str) -> String {
    strip_trailing_commas(&strip_comments(input.trim_start_matches('\u{feff}')))
}

/// Locate the span from the first `open` to the last `close`.
///
/// Text outside the span is dropped, unless the text before `open` starts
/// an enclosing array or object.
fn extract_span<'a>(
    text: &'a str,
    open: char,
    close: char,
    expected: &'static str,
) -> std::result::Result<&'a str, JsoncError> {
    let start = text.find(open);
    let end = text.rfind(close);
    match (start, end) {
        (Some(start), Some(end)) if start < end => {
            if text[..start].contains(['[', '{']) {
                return Err(JsoncError::WrongType { expected });
            }
            Ok(&text[start..=end])
        }
        _ => {
            if text.trim().is_empty() {
                Err(JsoncError::Missing { expected })
            } else {
                Err(JsoncError::WrongType { expected })
            }
        }
    }
}

/// Parse a JSONC document whose top level must be an array.
pub fn parse_array(input: &str) -> std::result::Result<Vec<Value>, JsoncError> {
    let cleaned = clean(input);
    let span = extract_span(&cleaned, '[', ']', "array")?;
    match serde_json::from_str(span)? {
        Value::Array(items) => Ok(items),
        _ => Err(JsoncError::WrongType { expected: "array" }),
    }
}

/// Parse a JSONC document whose top level must be an object.
///
/// Duplicate keys resolve to the last occurrence.
pub fn parse_object(input: &str) -> std::result::Result<Map<String, Value>, JsoncError> {
    let cleaned = clean(input);
    let span = extract_span(&cleaned, '{', '}', "object")?;
    match serde_json::from_str(span)? {
        Value::Object(map) => Ok(map),
        _ => Err(JsoncError::WrongType { expected: "object" }),
    }
}

/// Parse any JSONC value.
pub fn parse_value(input: &str) -> std::result::Result<Value, JsoncError> {
    Ok(serde_json::from_str(&clean(input))?)
}

/// Read and parse a JSONC object file through a [`Filesystem`].
pub fn read_object(fs: &dyn Filesystem, path: &Path) -> Result<Map<String, Value>> {
    let text = fs.read_to_string(path)?;
    parse_object(&text).map_err(|e| e.at(path))
}

/// Read and parse a JSONC array file through a [`Filesystem`].
pub fn read_array(fs: &dyn Filesystem, path: &Path) -> Result<Vec<Value>> {
    let text = fs.read_to_string(path)?;
    parse_array(&text).map_err(|e| e.at(path))
}
