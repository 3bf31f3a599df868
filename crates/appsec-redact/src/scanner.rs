//! Byte-at-a-time JSON scanner.
//!
//! The scanner is a finite-state machine fed one byte per [`Scanner::step`]
//! call. It classifies each byte as a structural operation without building
//! any document representation, which is what lets the redaction layer edit
//! the input textually while leaving every untouched byte identical.
//!
//! A single instance is shared between the top-level scan and the walkers:
//! after `reset()` the scanner only assumes it starts at the beginning of a
//! value, not at offset 0 of the whole document, so drivers can keep stepping
//! it mid-document.

use crate::error::SyntaxError;

/// Operation code produced for each consumed byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScanOp {
    /// Byte continues the current literal (including a string's closing
    /// quote) or carries no structural information of its own.
    Continue,
    /// Byte begins a literal: string, number, `true`, `false` or `null`.
    BeginLiteral,
    BeginObject,
    /// Byte is the colon terminating an object key.
    ObjectKey,
    /// Byte is the comma terminating an object member value.
    ObjectValue,
    EndObject,
    BeginArray,
    /// Byte is the comma terminating an array element.
    ArrayValue,
    EndArray,
    SkipSpace,
    /// The top-level value is already complete.
    End,
    Error,
}

/// Container context pushed when entering an object or array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    ObjectKey,
    ObjectValue,
    ArrayValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    BeginValue,
    BeginValueOrEmpty,
    BeginKey,
    BeginKeyOrEmpty,
    EndValue,
    EndTop,
    InString,
    StringEscape,
    /// Inside a `\u` escape; payload counts the hex digits consumed so far.
    UnicodeEscape(u8),
    Neg,
    Zero,
    Digits,
    Dot,
    Fraction,
    Exp,
    ExpSign,
    ExpDigits,
    /// Inside `true`/`false`/`null`; payload is the expected remainder.
    Keyword(&'static [u8]),
    Failed,
}

/// Stateful JSON scanner, reset per top-level call.
#[derive(Debug)]
pub(crate) struct Scanner {
    state: State,
    stack: Vec<Frame>,
    end_top: bool,
    err: Option<SyntaxError>,
}

impl Default for Scanner {
    fn default() -> Self {
        Self {
            state: State::BeginValue,
            stack: Vec::new(),
            end_top: false,
            err: None,
        }
    }
}

impl Scanner {
    /// Restores the initial state, discarding any latched error.
    pub(crate) fn reset(&mut self) {
        self.state = State::BeginValue;
        self.stack.clear();
        self.end_top = false;
        self.err = None;
    }

    /// The error latched by the first failing `step` or `eof` call.
    pub(crate) fn err(&self) -> Option<&SyntaxError> {
        self.err.as_ref()
    }

    /// Consumes one byte and returns the operation it produced. Once a
    /// syntax error is latched, every further call returns [`ScanOp::Error`].
    pub(crate) fn step(&mut self, c: u8) -> ScanOp {
        match self.state {
            State::Failed => ScanOp::Error,
            State::BeginValue => self.begin_value(c),
            State::BeginValueOrEmpty => {
                if is_space(c) {
                    ScanOp::SkipSpace
                } else if c == b']' {
                    self.end_value(c)
                } else {
                    self.begin_value(c)
                }
            }
            State::BeginKey => self.begin_key(c),
            State::BeginKeyOrEmpty => {
                if is_space(c) {
                    ScanOp::SkipSpace
                } else if c == b'}' {
                    // Empty object: rewrite the frame so end_value pops it.
                    if let Some(frame) = self.stack.last_mut() {
                        *frame = Frame::ObjectValue;
                    }
                    self.end_value(c)
                } else {
                    self.begin_key(c)
                }
            }
            State::EndValue => self.end_value(c),
            State::EndTop => {
                if is_space(c) {
                    ScanOp::End
                } else {
                    self.fail(c, "after top-level value")
                }
            }
            State::InString => match c {
                b'"' => {
                    self.state = State::EndValue;
                    ScanOp::Continue
                }
                b'\\' => {
                    self.state = State::StringEscape;
                    ScanOp::Continue
                }
                0x00..=0x1f => self.fail(c, "in string literal"),
                _ => ScanOp::Continue,
            },
            State::StringEscape => match c {
                b'b' | b'f' | b'n' | b'r' | b't' | b'\\' | b'/' | b'"' => {
                    self.state = State::InString;
                    ScanOp::Continue
                }
                b'u' => {
                    self.state = State::UnicodeEscape(0);
                    ScanOp::Continue
                }
                _ => self.fail(c, "in string escape code"),
            },
            State::UnicodeEscape(n) => {
                if c.is_ascii_hexdigit() {
                    self.state = if n == 3 {
                        State::InString
                    } else {
                        State::UnicodeEscape(n + 1)
                    };
                    ScanOp::Continue
                } else {
                    self.fail(c, "in \\u hexadecimal character escape")
                }
            }
            State::Neg => match c {
                b'0' => {
                    self.state = State::Zero;
                    ScanOp::Continue
                }
                b'1'..=b'9' => {
                    self.state = State::Digits;
                    ScanOp::Continue
                }
                _ => self.fail(c, "in numeric literal"),
            },
            State::Digits => match c {
                b'0'..=b'9' => ScanOp::Continue,
                _ => self.number_tail(c),
            },
            State::Zero => self.number_tail(c),
            State::Dot => match c {
                b'0'..=b'9' => {
                    self.state = State::Fraction;
                    ScanOp::Continue
                }
                _ => self.fail(c, "after decimal point in numeric literal"),
            },
            State::Fraction => match c {
                b'0'..=b'9' => ScanOp::Continue,
                b'e' | b'E' => {
                    self.state = State::Exp;
                    ScanOp::Continue
                }
                _ => self.end_value(c),
            },
            State::Exp => match c {
                b'+' | b'-' => {
                    self.state = State::ExpSign;
                    ScanOp::Continue
                }
                b'0'..=b'9' => {
                    self.state = State::ExpDigits;
                    ScanOp::Continue
                }
                _ => self.fail(c, "in exponent of numeric literal"),
            },
            State::ExpSign => match c {
                b'0'..=b'9' => {
                    self.state = State::ExpDigits;
                    ScanOp::Continue
                }
                _ => self.fail(c, "in exponent of numeric literal"),
            },
            State::ExpDigits => match c {
                b'0'..=b'9' => ScanOp::Continue,
                _ => self.end_value(c),
            },
            State::Keyword(rest) => match rest.split_first() {
                Some((&expected, tail)) if c == expected => {
                    self.state = if tail.is_empty() {
                        State::EndValue
                    } else {
                        State::Keyword(tail)
                    };
                    ScanOp::Continue
                }
                _ => self.fail(c, "in literal"),
            },
        }
    }

    /// Tells the scanner the end of the input has been reached. Returns
    /// [`ScanOp::End`] for a complete document and [`ScanOp::Error`]
    /// otherwise, latching an end-of-input error.
    pub(crate) fn eof(&mut self) -> ScanOp {
        if self.err.is_some() {
            return ScanOp::Error;
        }
        if self.end_top {
            return ScanOp::End;
        }
        // A trailing space closes any literal that can end a document.
        self.step(b' ');
        if self.end_top {
            return ScanOp::End;
        }
        if self.err.is_none() {
            self.err = Some(SyntaxError::UnexpectedEnd);
        }
        ScanOp::Error
    }

    fn begin_value(&mut self, c: u8) -> ScanOp {
        if is_space(c) {
            return ScanOp::SkipSpace;
        }
        match c {
            b'{' => {
                self.stack.push(Frame::ObjectKey);
                self.state = State::BeginKeyOrEmpty;
                ScanOp::BeginObject
            }
            b'[' => {
                self.stack.push(Frame::ArrayValue);
                self.state = State::BeginValueOrEmpty;
                ScanOp::BeginArray
            }
            b'"' => {
                self.state = State::InString;
                ScanOp::BeginLiteral
            }
            b'-' => {
                self.state = State::Neg;
                ScanOp::BeginLiteral
            }
            b'0' => {
                self.state = State::Zero;
                ScanOp::BeginLiteral
            }
            b'1'..=b'9' => {
                self.state = State::Digits;
                ScanOp::BeginLiteral
            }
            b't' => {
                self.state = State::Keyword(b"rue");
                ScanOp::BeginLiteral
            }
            b'f' => {
                self.state = State::Keyword(b"alse");
                ScanOp::BeginLiteral
            }
            b'n' => {
                self.state = State::Keyword(b"ull");
                ScanOp::BeginLiteral
            }
            _ => self.fail(c, "looking for beginning of value"),
        }
    }

    fn begin_key(&mut self, c: u8) -> ScanOp {
        if is_space(c) {
            return ScanOp::SkipSpace;
        }
        if c == b'"' {
            self.state = State::InString;
            return ScanOp::BeginLiteral;
        }
        self.fail(c, "looking for beginning of object key string")
    }

    fn end_value(&mut self, c: u8) -> ScanOp {
        let Some(frame) = self.stack.last_mut() else {
            // The top-level value just completed before this byte.
            self.state = State::EndTop;
            self.end_top = true;
            if is_space(c) {
                return ScanOp::End;
            }
            return self.fail(c, "after top-level value");
        };
        if is_space(c) {
            self.state = State::EndValue;
            return ScanOp::SkipSpace;
        }
        match *frame {
            Frame::ObjectKey => {
                if c == b':' {
                    *frame = Frame::ObjectValue;
                    self.state = State::BeginValue;
                    return ScanOp::ObjectKey;
                }
                self.fail(c, "after object key")
            }
            Frame::ObjectValue => {
                if c == b',' {
                    *frame = Frame::ObjectKey;
                    self.state = State::BeginKey;
                    return ScanOp::ObjectValue;
                }
                if c == b'}' {
                    self.pop_frame();
                    return ScanOp::EndObject;
                }
                self.fail(c, "after object key:value pair")
            }
            Frame::ArrayValue => {
                if c == b',' {
                    self.state = State::BeginValueOrEmpty;
                    return ScanOp::ArrayValue;
                }
                if c == b']' {
                    self.pop_frame();
                    return ScanOp::EndArray;
                }
                self.fail(c, "after array element")
            }
        }
    }

    fn number_tail(&mut self, c: u8) -> ScanOp {
        match c {
            b'.' => {
                self.state = State::Dot;
                ScanOp::Continue
            }
            b'e' | b'E' => {
                self.state = State::Exp;
                ScanOp::Continue
            }
            _ => self.end_value(c),
        }
    }

    fn pop_frame(&mut self) {
        self.stack.pop();
        if self.stack.is_empty() {
            self.state = State::EndTop;
            self.end_top = true;
        } else {
            self.state = State::EndValue;
        }
    }

    fn fail(&mut self, c: u8, context: &'static str) -> ScanOp {
        self.state = State::Failed;
        self.err = Some(SyntaxError::InvalidCharacter(c as char, context));
        ScanOp::Error
    }
}

fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\r')
}

/// Returns true when `bytes[i]` is the unescaped double quote ending a JSON
/// string: a quote preceded by an even run of backslashes.
pub(crate) fn is_string_end(bytes: &[u8], i: usize) -> bool {
    if bytes[i] != b'"' {
        return false;
    }
    let mut backslashes = 0;
    let mut j = i;
    while j > 0 && bytes[j - 1] == b'\\' {
        backslashes += 1;
        j -= 1;
    }
    backslashes % 2 == 0
}

#[cfg(test)]
mod tests {
    use super::{ScanOp, Scanner, is_string_end};
    use crate::error::SyntaxError;

    fn ops(input: &str) -> (Vec<ScanOp>, ScanOp) {
        let mut scanner = Scanner::default();
        let ops = input.bytes().map(|c| scanner.step(c)).collect();
        (ops, scanner.eof())
    }

    #[test]
    fn flat_object() {
        use ScanOp::{BeginLiteral, BeginObject, Continue, End, EndObject, ObjectKey};
        let (ops, eof) = ops(r#"{"a":1}"#);
        assert_eq!(
            ops,
            vec![
                BeginObject,
                BeginLiteral,
                Continue,
                Continue,
                ObjectKey,
                BeginLiteral,
                EndObject,
            ]
        );
        assert_eq!(eof, End);
    }

    #[test]
    fn array_separators() {
        use ScanOp::{ArrayValue, BeginArray, BeginLiteral, Continue, End, EndArray};
        let (ops, eof) = ops(r#"[1,"x"]"#);
        assert_eq!(
            ops,
            vec![
                BeginArray,
                BeginLiteral,
                ArrayValue,
                BeginLiteral,
                Continue,
                Continue,
                EndArray,
            ]
        );
        assert_eq!(eof, End);
    }

    #[test]
    fn empty_containers() {
        assert_eq!(ops("{}").1, ScanOp::End);
        assert_eq!(ops("[]").1, ScanOp::End);
        assert_eq!(ops("[ ]").1, ScanOp::End);
        assert_eq!(ops("{ }").1, ScanOp::End);
    }

    #[test]
    fn keywords_and_numbers() {
        assert_eq!(ops("true").1, ScanOp::End);
        assert_eq!(ops("false").1, ScanOp::End);
        assert_eq!(ops("null").1, ScanOp::End);
        assert_eq!(ops("-12.5e+3").1, ScanOp::End);
        assert_eq!(ops("0").1, ScanOp::End);
    }

    #[test]
    fn escaped_quote_does_not_end_string() {
        let (ops, eof) = ops(r#""a\"b""#);
        assert!(!ops.contains(&ScanOp::Error));
        assert_eq!(eof, ScanOp::End);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let mut scanner = Scanner::default();
        for c in br#"{"a":"x"#.iter() {
            assert_ne!(scanner.step(*c), ScanOp::Error);
        }
        assert_eq!(scanner.eof(), ScanOp::Error);
        assert_eq!(scanner.err(), Some(&SyntaxError::UnexpectedEnd));
    }

    #[test]
    fn invalid_byte_latches_error() {
        let mut scanner = Scanner::default();
        assert_eq!(scanner.step(b'{'), ScanOp::BeginObject);
        assert_eq!(scanner.step(b']'), ScanOp::Error);
        assert!(matches!(
            scanner.err(),
            Some(SyntaxError::InvalidCharacter(']', _))
        ));
        // Poisoned: further bytes keep reporting the error.
        assert_eq!(scanner.step(b'}'), ScanOp::Error);
    }

    #[test]
    fn trailing_garbage_fails_eof() {
        let (ops, eof) = ops("1 x");
        assert_eq!(ops, vec![ScanOp::BeginLiteral, ScanOp::End, ScanOp::Error]);
        assert_eq!(eof, ScanOp::Error);
    }

    #[test]
    fn reset_clears_latched_error() {
        let mut scanner = Scanner::default();
        scanner.step(b'x');
        assert!(scanner.err().is_some());
        scanner.reset();
        assert!(scanner.err().is_none());
        assert_eq!(scanner.step(b'7'), ScanOp::BeginLiteral);
    }

    #[test]
    fn string_end_backslash_parity() {
        let s = br#""a\"b""#;
        assert!(!is_string_end(s, 3)); // escaped quote
        assert!(is_string_end(s, 5));
        let t = br#""a\\""#;
        assert!(is_string_end(t, 4)); // quote after escaped backslash
        let u = br#""a\\\"""#;
        assert!(!is_string_end(u, 5)); // odd backslash run
    }
}
