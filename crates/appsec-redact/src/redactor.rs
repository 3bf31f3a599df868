//! The appsec semantic layer: finds `"parameters"` keys in an event payload
//! and rewrites the sensitive sub-values of each parameter object.

use core::ops::Range;

use regex::Regex;

use crate::cursor::{advance_to, advance_to_one_of, advance_until_at_depth0, scan_string};
use crate::diff::Diff;
use crate::error::StepError;
use crate::literal::{quote, unquote};
use crate::scanner::{ScanOp, Scanner, is_string_end};
use crate::walk::{walk_array_strings, walk_object_fields};

/// Replacement for one matched span inside a value.
const MASK: &str = "?";
/// Replacement literal for a whole string value.
const MASKED_STRING: &str = "\"?\"";

const PARAMETERS_KEY: &str = "\"parameters\"";
const KEY_PATH_KEY: &str = "\"key_path\"";
const HIGHLIGHT_KEY: &str = "\"highlight\"";
const VALUE_KEY: &str = "\"value\"";

/// Pattern configuration for the redactor.
///
/// Both matchers are optional and independent. The key pattern decides
/// whether a parameter's `key_path` names something sensitive, in which case
/// its `highlight` and `value` strings are replaced wholesale; the value
/// pattern redacts matching spans inside those strings otherwise.
#[derive(Debug, Clone, Default)]
pub struct RedactorConfig {
    /// Matches sensitive key names among the `key_path` elements.
    pub key_pattern: Option<Regex>,
    /// Matches sensitive substrings inside `highlight` and `value` strings.
    pub value_pattern: Option<Regex>,
}

/// Redacts sensitive parameter values from appsec event payloads.
///
/// The payload is a JSON-encoded text blob; only the targeted sub-ranges are
/// rewritten and every other byte is preserved verbatim, so downstream
/// consumers re-parsing the event see the original structure, ordering and
/// whitespace. A `Redactor` holds no per-call state and may be shared across
/// threads.
#[derive(Debug)]
pub struct Redactor {
    config: RedactorConfig,
}

impl Redactor {
    /// Creates a redactor from the given pattern configuration.
    #[must_use]
    pub fn new(config: RedactorConfig) -> Self {
        Self { config }
    }

    /// Redacts the sensitive parameter values of one event payload.
    ///
    /// With no matcher configured the input is returned unchanged without
    /// scanning. Malformed input fails open: the error is logged and the
    /// input comes back byte-identical. This function never panics and never
    /// returns a structurally truncated payload.
    #[must_use]
    pub fn redact(&self, input: &str) -> String {
        if self.config.key_pattern.is_none() && self.config.value_pattern.is_none() {
            return input.to_owned();
        }
        match self.redact_document(input) {
            Ok(output) => output,
            Err(err) => {
                tracing::error!(error = %err, "unexpected error while redacting the appsec event");
                input.to_owned()
            }
        }
    }

    /// One left-to-right scan of the whole input, entering the parameters
    /// walk whenever an object key literal `"parameters"` is observed, at any
    /// nesting depth. All edits accumulate in a single diff applied at the
    /// end, so a late syntax error discards everything.
    fn redact_document(&self, input: &str) -> Result<String, StepError> {
        let mut scanner = Scanner::default();
        let mut diff = Diff::default();
        let bytes = input.as_bytes();
        let mut key_from: Option<usize> = None;
        let mut key_to: Option<usize> = None;
        let mut i = 0;
        while i < bytes.len() {
            match scanner.step(bytes[i]) {
                ScanOp::Error => return Err(StepError::syntax(scanner.err(), i + 1)),
                ScanOp::BeginLiteral => {
                    // Possibly the beginning of an object key.
                    if bytes[i] == b'"' {
                        key_from = Some(i);
                        key_to = None;
                    }
                }
                ScanOp::Continue => {
                    if key_from.is_some() && is_string_end(bytes, i) {
                        key_to = Some(i);
                    }
                }
                ScanOp::ObjectKey => {
                    // The colon confirms the literal recorded above was a key.
                    if let (Some(kf), Some(kt)) = (key_from, key_to) {
                        if &input[kf..=kt] == PARAMETERS_KEY {
                            i = self.redact_parameters(&mut scanner, input, i + 1, &mut diff);
                            key_from = None;
                            key_to = None;
                            continue;
                        }
                    }
                    key_from = None;
                    key_to = None;
                }
                _ => {}
            }
            i += 1;
        }
        if scanner.eof() == ScanOp::Error {
            return Err(StepError::syntax(scanner.err(), i));
        }
        if diff.is_empty() {
            return Ok(input.to_owned());
        }
        Ok(diff.apply(input))
    }

    /// Walks the parameters array, accepting elements of unexpected types:
    /// non-object elements are skipped wholesale and only syntax errors stop
    /// the walk (poisoning the scanner, so the outer scan fails open).
    /// Returns the index scanning should resume from.
    fn redact_parameters(
        &self,
        scanner: &mut Scanner,
        input: &str,
        i: usize,
        diff: &mut Diff,
    ) -> usize {
        let mut i = match advance_to(scanner, input, i, ScanOp::BeginArray) {
            Ok(i) => i,
            Err(StepError::Unexpected { next, .. }) => return next,
            Err(StepError::Syntax { next, .. }) => return next,
        };
        while i < input.len() {
            match self.redact_parameter(scanner, input, i, diff) {
                Ok(next) => i = next,
                Err(StepError::Syntax { next, .. }) => return next,
                Err(StepError::Unexpected { op, next }) => {
                    i = next;
                    match op {
                        // The array ended where an element was expected; this
                        // is how the empty array terminates.
                        ScanOp::EndArray => return i,
                        ScanOp::BeginObject => {
                            match advance_until_at_depth0(scanner, input, i, ScanOp::EndObject) {
                                Ok(next) => i = next,
                                Err(_) => return i,
                            }
                        }
                        ScanOp::BeginArray => {
                            match advance_until_at_depth0(scanner, input, i, ScanOp::EndArray) {
                                Ok(next) => i = next,
                                Err(_) => return i,
                            }
                        }
                        // A literal element: the advance below passes over it.
                        ScanOp::BeginLiteral => {}
                        _ => return i,
                    }
                }
            }
            // Step to the next array element, or stop at the end of the array.
            match advance_to_one_of(scanner, input, i, &[ScanOp::ArrayValue, ScanOp::EndArray]) {
                Ok((next, ScanOp::ArrayValue)) => i = next,
                Ok((next, _)) => return next,
                Err(StepError::Unexpected { next, .. }) | Err(StepError::Syntax { next, .. }) => {
                    return next;
                }
            }
        }
        i
    }

    /// Walks one parameter object, capturing the raw value ranges of its
    /// `key_path`, `highlight` and `value` fields. Extra keys are allowed and
    /// any of the three may be absent. The whole object must be walked before
    /// redacting anything because the sensitivity of `highlight` and `value`
    /// depends on the `key_path`.
    fn redact_parameter(
        &self,
        scanner: &mut Scanner,
        input: &str,
        i: usize,
        diff: &mut Diff,
    ) -> Result<usize, StepError> {
        let mut key_path: Option<Range<usize>> = None;
        let mut highlight: Option<Range<usize>> = None;
        let mut value: Option<Range<usize>> = None;
        let i = walk_object_fields(scanner, input, i, |key, val| match &input[key] {
            KEY_PATH_KEY => key_path = Some(val),
            HIGHLIGHT_KEY => highlight = Some(val),
            VALUE_KEY => value = Some(val),
            _ => {}
        })?;
        // The captured fragments are scanned on their own, independently of
        // the document position, so one scratch scanner serves all of them.
        let mut fragments = Scanner::default();
        let sensitive = self.has_sensitive_key_path(&mut fragments, key_path.map(|r| &input[r]));
        if let Some(range) = highlight {
            let mut local = Diff::default();
            self.redact_highlights(&mut fragments, &input[range.clone()], &mut local, sensitive);
            diff.merge(local, range.start);
        }
        if let Some(range) = value {
            let mut local = Diff::default();
            self.redact_value(&mut fragments, &input[range.clone()], &mut local, sensitive);
            diff.merge(local, range.start);
        }
        Ok(i)
    }

    /// Whether the raw `key_path` text (a JSON array) contains any string
    /// element matching the key pattern. Non-string elements are ignored and
    /// the search stops at the first match.
    fn has_sensitive_key_path(&self, scanner: &mut Scanner, key_path: Option<&str>) -> bool {
        let Some(key_re) = &self.config.key_pattern else {
            return false;
        };
        let Some(key_path) = key_path else {
            return false;
        };
        if key_path.is_empty() {
            return false;
        }
        let mut found = false;
        walk_array_strings(scanner, key_path, |range| {
            if found {
                return;
            }
            let Some(element) = unquote(&key_path[range]) else {
                return;
            };
            if key_re.is_match(&element) {
                found = true;
            }
        });
        found
    }

    /// Redacts the `highlight` array of strings. A sensitive key path
    /// replaces every string element wholesale; otherwise only elements with
    /// spans matching the value pattern are rewritten. Non-string elements
    /// are left alone.
    fn redact_highlights(
        &self,
        scanner: &mut Scanner,
        fragment: &str,
        diff: &mut Diff,
        sensitive: bool,
    ) {
        let value_re = self.config.value_pattern.as_ref();
        if value_re.is_none() && !sensitive {
            return;
        }
        walk_array_strings(scanner, fragment, |range| {
            if sensitive {
                diff.add(range.start, range.end - 1, MASKED_STRING);
                return;
            }
            let Some(re) = value_re else {
                return;
            };
            let Some(element) = unquote(&fragment[range.clone()]) else {
                return;
            };
            if !re.is_match(&element) {
                return;
            }
            let masked = re.replace_all(&element, MASK);
            let Ok(quoted) = quote(&masked) else {
                return;
            };
            diff.add(range.start, range.end - 1, quoted);
        });
    }

    /// Redacts the `value` field, expected to be a single JSON string. Same
    /// policy as the highlights; a non-string or malformed value is skipped
    /// without an edit.
    fn redact_value(&self, scanner: &mut Scanner, fragment: &str, diff: &mut Diff, sensitive: bool) {
        let value_re = self.config.value_pattern.as_ref();
        if value_re.is_none() && !sensitive {
            return;
        }
        let Ok(range) = scan_string(scanner, fragment) else {
            return;
        };
        if sensitive {
            diff.add(range.start, range.end - 1, MASKED_STRING);
            return;
        }
        let Some(re) = value_re else {
            return;
        };
        let Some(value) = unquote(&fragment[range.clone()]) else {
            return;
        };
        if !re.is_match(&value) {
            return;
        }
        let masked = re.replace_all(&value, MASK);
        if let Ok(quoted) = quote(&masked) {
            diff.add(range.start, range.end - 1, quoted);
        }
    }
}
