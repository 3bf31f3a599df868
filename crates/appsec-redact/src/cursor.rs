//! Drivers advancing a scanner until a target operation is observed.

use core::ops::Range;

use crate::error::StepError;
use crate::scanner::{ScanOp, Scanner, is_string_end};

/// Steps the scanner from `i` until `target` is produced, skipping
/// whitespace and literal continuations. Returns the index just past the
/// matched byte.
pub(crate) fn advance_to(
    scanner: &mut Scanner,
    input: &str,
    i: usize,
    target: ScanOp,
) -> Result<usize, StepError> {
    let (i, _) = advance_to_one_of(scanner, input, i, &[target])?;
    Ok(i)
}

/// Variadic form of [`advance_to`]: succeeds on any of `targets` and reports
/// which one matched. Producing any other structural operation yields
/// [`StepError::Unexpected`], which callers use to branch on what was
/// actually found. Running out of input on a complete document yields
/// `(input.len(), ScanOp::End)`.
pub(crate) fn advance_to_one_of(
    scanner: &mut Scanner,
    input: &str,
    mut i: usize,
    targets: &[ScanOp],
) -> Result<(usize, ScanOp), StepError> {
    let bytes = input.as_bytes();
    while i < bytes.len() {
        let op = scanner.step(bytes[i]);
        i += 1;
        match op {
            ScanOp::SkipSpace | ScanOp::Continue => {}
            ScanOp::Error => return Err(StepError::syntax(scanner.err(), i)),
            op if targets.contains(&op) => return Ok((i, op)),
            op => return Err(StepError::Unexpected { op, next: i }),
        }
    }
    match scanner.eof() {
        ScanOp::Error => Err(StepError::syntax(scanner.err(), i)),
        _ => Ok((i, ScanOp::End)),
    }
}

/// Steps the scanner from `i` until `target` is produced at the current
/// nesting depth, skipping whole nested objects and arrays without
/// interpreting them.
pub(crate) fn advance_until_at_depth0(
    scanner: &mut Scanner,
    input: &str,
    mut i: usize,
    target: ScanOp,
) -> Result<usize, StepError> {
    let bytes = input.as_bytes();
    let mut depth = 0i32;
    while i < bytes.len() {
        let op = scanner.step(bytes[i]);
        i += 1;
        match op {
            ScanOp::SkipSpace | ScanOp::Continue => {}
            ScanOp::Error => return Err(StepError::syntax(scanner.err(), i)),
            op if depth == 0 && op == target => return Ok(i),
            ScanOp::BeginObject | ScanOp::BeginArray => depth += 1,
            ScanOp::EndObject | ScanOp::EndArray => depth -= 1,
            _ => {}
        }
    }
    match scanner.eof() {
        ScanOp::Error => Err(StepError::syntax(scanner.err(), i)),
        _ => Ok(i),
    }
}

/// Locates the JSON string literal starting the given fragment and returns
/// its quoted byte range. A fragment whose first value is not a string
/// literal yields [`StepError::Unexpected`]. The scanner is reset: the
/// fragment is scanned as a document of its own.
pub(crate) fn scan_string(scanner: &mut Scanner, input: &str) -> Result<Range<usize>, StepError> {
    scanner.reset();
    let mut i = advance_to(scanner, input, 0, ScanOp::BeginLiteral)?;
    let from = i - 1;
    let bytes = input.as_bytes();
    if bytes[from] != b'"' {
        return Err(StepError::Unexpected {
            op: ScanOp::BeginLiteral,
            next: i,
        });
    }
    while i < bytes.len() {
        match scanner.step(bytes[i]) {
            ScanOp::Error => return Err(StepError::syntax(scanner.err(), i + 1)),
            ScanOp::Continue => {
                if is_string_end(bytes, i) {
                    return Ok(from..i + 1);
                }
            }
            op => return Err(StepError::Unexpected { op, next: i + 1 }),
        }
        i += 1;
    }
    scanner.eof();
    Err(StepError::syntax(scanner.err(), i))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_past_whitespace_to_target() {
        let mut scanner = Scanner::default();
        let input = "  [1]";
        let i = advance_to(&mut scanner, input, 0, ScanOp::BeginArray).unwrap();
        assert_eq!(i, 3);
    }

    #[test]
    fn unexpected_op_is_a_recoverable_signal() {
        let mut scanner = Scanner::default();
        let err = advance_to(&mut scanner, r#"{"a":1}"#, 0, ScanOp::BeginArray).unwrap_err();
        assert_eq!(
            err,
            StepError::Unexpected {
                op: ScanOp::BeginObject,
                next: 1
            }
        );
    }

    #[test]
    fn reports_which_target_matched() {
        let mut scanner = Scanner::default();
        let input = "[1,2]";
        let i = advance_to(&mut scanner, input, 0, ScanOp::BeginArray).unwrap();
        let i = advance_to(&mut scanner, input, i, ScanOp::BeginLiteral).unwrap();
        // The comma after "1".
        let (i, op) = advance_to_one_of(
            &mut scanner,
            input,
            i,
            &[ScanOp::ArrayValue, ScanOp::EndArray],
        )
        .unwrap();
        assert_eq!((i, op), (3, ScanOp::ArrayValue));
        let i = advance_to(&mut scanner, input, i, ScanOp::BeginLiteral).unwrap();
        let (_, op) = advance_to_one_of(
            &mut scanner,
            input,
            i,
            &[ScanOp::ArrayValue, ScanOp::EndArray],
        )
        .unwrap();
        assert_eq!(op, ScanOp::EndArray);
    }

    #[test]
    fn skips_nested_containers_wholesale() {
        let mut scanner = Scanner::default();
        let input = r#"[[1,[2]],{"a":[3]},4]"#;
        let i = advance_to(&mut scanner, input, 0, ScanOp::BeginArray).unwrap();
        // First element is a nested array: enter it, then skip to its end.
        let i = advance_to(&mut scanner, input, i, ScanOp::BeginArray).unwrap();
        let i = advance_until_at_depth0(&mut scanner, input, i, ScanOp::EndArray).unwrap();
        assert_eq!(&input[..i], "[[1,[2]]");
        // Second element is an object: same treatment.
        let (i, _) = advance_to_one_of(&mut scanner, input, i, &[ScanOp::ArrayValue]).unwrap();
        let i = advance_to(&mut scanner, input, i, ScanOp::BeginObject).unwrap();
        let i = advance_until_at_depth0(&mut scanner, input, i, ScanOp::EndObject).unwrap();
        assert_eq!(&input[..i], r#"[[1,[2]],{"a":[3]}"#);
    }

    #[test]
    fn exhaustion_on_complete_document_is_end() {
        let mut scanner = Scanner::default();
        let input = "[1]";
        let i = advance_to(&mut scanner, input, 0, ScanOp::BeginArray).unwrap();
        let i = advance_to(&mut scanner, input, i, ScanOp::BeginLiteral).unwrap();
        let (i, _) = advance_to_one_of(&mut scanner, input, i, &[ScanOp::EndArray]).unwrap();
        let (i, op) = advance_to_one_of(&mut scanner, input, i, &[ScanOp::ArrayValue]).unwrap();
        assert_eq!((i, op), (input.len(), ScanOp::End));
    }

    #[test]
    fn exhaustion_on_truncated_document_is_syntax() {
        let mut scanner = Scanner::default();
        let input = "[1";
        let i = advance_to(&mut scanner, input, 0, ScanOp::BeginArray).unwrap();
        let i = advance_to(&mut scanner, input, i, ScanOp::BeginLiteral).unwrap();
        let err = advance_to(&mut scanner, input, i, ScanOp::EndArray).unwrap_err();
        assert!(matches!(err, StepError::Syntax { .. }));
    }

    #[test]
    fn scan_string_returns_quoted_range() {
        let mut scanner = Scanner::default();
        assert_eq!(scan_string(&mut scanner, r#""abc""#).unwrap(), 0..5);
        assert_eq!(scan_string(&mut scanner, r#"  "a\"b"  "#).unwrap(), 2..8);
    }

    #[test]
    fn scan_string_rejects_non_strings() {
        let mut scanner = Scanner::default();
        assert!(matches!(
            scan_string(&mut scanner, "123"),
            Err(StepError::Unexpected { .. })
        ));
        assert!(matches!(
            scan_string(&mut scanner, r#"{"a":1}"#),
            Err(StepError::Unexpected { .. })
        ));
        assert!(matches!(
            scan_string(&mut scanner, r#""unterminated"#),
            Err(StepError::Syntax { .. })
        ));
    }
}
