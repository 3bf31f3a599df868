//! Selective redaction of sensitive values in appsec event payloads.
//!
//! Security rule-match events carry a `parameters` array whose entries echo
//! back application data (header values, body fragments, path segments) that
//! must be scrubbed of secrets before the event leaves the host. This crate
//! rewrites only those sensitive sub-values and leaves every other byte of
//! the payload untouched, so the surrounding JSON structure, field ordering
//! and whitespace survive byte-for-byte for downstream consumers that
//! re-parse it.
//!
//! The engine never materializes a parsed document: a byte-at-a-time scanner
//! classifies the input against the JSON grammar, structural walkers extract
//! the byte ranges of the relevant fields, and the replacements are collected
//! as a diff applied in one pass at the end. Malformed input fails open and
//! comes back unchanged.
//!
//! ```
//! use appsec_redact::{Redactor, RedactorConfig};
//! use regex::Regex;
//!
//! let redactor = Redactor::new(RedactorConfig {
//!     key_pattern: Some(Regex::new("(?i)password|token").unwrap()),
//!     value_pattern: None,
//! });
//! let event = r#"{"parameters":[{"key_path":["password"],"value":"hunter2"}]}"#;
//! assert_eq!(
//!     redactor.redact(event),
//!     r#"{"parameters":[{"key_path":["password"],"value":"?"}]}"#
//! );
//! ```

mod cursor;
mod diff;
mod error;
mod literal;
mod redactor;
mod scanner;
mod walk;

pub use redactor::{Redactor, RedactorConfig};
