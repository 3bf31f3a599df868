//! Scan failure taxonomy.

use thiserror::Error;

use crate::scanner::ScanOp;

/// A JSON grammar violation latched by the scanner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum SyntaxError {
    #[error("invalid character {0:?} {1}")]
    InvalidCharacter(char, &'static str),
    #[error("unexpected end of JSON input")]
    UnexpectedEnd,
}

/// Error surfaced by the cursor helpers and walkers.
///
/// `Unexpected` is a recoverable signal: the scanner produced a structural
/// operation other than the one the caller asked for. `next` is the index
/// just past the byte that produced it, so the caller can branch on `op` and
/// resume scanning from a well-defined position. `Syntax` aborts the whole
/// top-level call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum StepError {
    #[error("{err}")]
    Syntax { err: SyntaxError, next: usize },
    #[error("unexpected json scanner operation {op:?}")]
    Unexpected { op: ScanOp, next: usize },
}

impl StepError {
    /// Wraps the scanner's latched error, falling back to an end-of-input
    /// error when nothing was latched.
    pub(crate) fn syntax(err: Option<&SyntaxError>, next: usize) -> Self {
        StepError::Syntax {
            err: err.cloned().unwrap_or(SyntaxError::UnexpectedEnd),
            next,
        }
    }
}
