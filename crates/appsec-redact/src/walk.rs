//! Reusable traversals over one nesting level of an object or array.

use core::ops::Range;

use crate::cursor::advance_to;
use crate::error::StepError;
use crate::scanner::{ScanOp, Scanner, is_string_end};

/// Enters the object at `i` and visits every direct key/value pair with the
/// byte ranges of the raw key text (quotes included) and raw value text
/// (verbatim and unparsed; it may itself be a container and may carry
/// surrounding whitespace). Nested containers inside a value are tracked only
/// to find where the value ends. Returns the index just past the closing
/// brace.
pub(crate) fn walk_object_fields(
    scanner: &mut Scanner,
    input: &str,
    i: usize,
    mut visit: impl FnMut(Range<usize>, Range<usize>),
) -> Result<usize, StepError> {
    let mut i = advance_to(scanner, input, i, ScanOp::BeginObject)?;
    let bytes = input.as_bytes();
    let mut key_from: Option<usize> = None;
    let mut key_to: Option<usize> = None;
    let mut value_from: Option<usize> = None;
    let mut depth = 0i32;
    while i < bytes.len() {
        let c = bytes[i];
        match scanner.step(c) {
            ScanOp::BeginObject | ScanOp::BeginArray => depth += 1,
            ScanOp::EndArray => depth -= 1,
            ScanOp::EndObject => {
                if depth != 0 {
                    depth -= 1;
                } else {
                    // The object we were walking just ended; the last pair
                    // has no trailing comma so it is visited here.
                    if let (Some(kf), Some(kt), Some(vf)) = (key_from, key_to, value_from) {
                        visit(kf..kt, vf..i);
                    }
                    return Ok(i + 1);
                }
            }
            ScanOp::BeginLiteral => {
                if depth == 0 && key_from.is_none() && c == b'"' {
                    key_from = Some(i);
                }
            }
            ScanOp::Continue => {
                if key_from.is_some() && key_to.is_none() && is_string_end(bytes, i) {
                    key_to = Some(i + 1);
                }
            }
            ScanOp::ObjectKey => {
                if depth == 0 {
                    value_from = Some(i + 1);
                }
            }
            ScanOp::ObjectValue => {
                if depth == 0 {
                    if let (Some(kf), Some(kt), Some(vf)) = (key_from, key_to, value_from) {
                        visit(kf..kt, vf..i);
                    }
                    key_from = None;
                    key_to = None;
                    value_from = None;
                }
            }
            ScanOp::Error => return Err(StepError::syntax(scanner.err(), i + 1)),
            ScanOp::ArrayValue | ScanOp::SkipSpace | ScanOp::End => {}
        }
        i += 1;
    }
    scanner.eof();
    Err(StepError::syntax(scanner.err(), i))
}

/// Walks the array starting the given fragment and visits the quoted byte
/// range of every string element at the array's own nesting level.
/// Non-string elements and nested containers are skipped without visiting,
/// and malformed input simply stops the walk. The scanner is reset: the
/// fragment is scanned as a document of its own.
pub(crate) fn walk_array_strings(
    scanner: &mut Scanner,
    input: &str,
    mut visit: impl FnMut(Range<usize>),
) {
    scanner.reset();
    let Ok(mut i) = advance_to(scanner, input, 0, ScanOp::BeginArray) else {
        return;
    };
    let bytes = input.as_bytes();
    let mut string_from: Option<usize> = None;
    let mut depth = 0i32;
    while i < bytes.len() {
        let c = bytes[i];
        match scanner.step(c) {
            ScanOp::BeginObject | ScanOp::BeginArray => depth += 1,
            ScanOp::EndObject => depth -= 1,
            ScanOp::EndArray => {
                if depth == 0 {
                    return;
                }
                depth -= 1;
            }
            ScanOp::BeginLiteral => {
                if depth == 0 && c == b'"' {
                    string_from = Some(i);
                }
            }
            ScanOp::Continue => {
                if let Some(from) = string_from {
                    if is_string_end(bytes, i) {
                        visit(from..i + 1);
                        string_from = None;
                    }
                }
            }
            ScanOp::Error => return,
            _ => {}
        }
        i += 1;
    }
}
