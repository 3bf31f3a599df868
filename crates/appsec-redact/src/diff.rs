//! Ordered byte-range replacements applied in one pass over the original
//! input.

/// One replacement of the inclusive byte range `[from, to]`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Edit {
    from: usize,
    to: usize,
    replacement: String,
}

/// A set of pairwise non-overlapping edits, kept sorted by start offset.
///
/// Edits are recorded against the original input and only materialized by
/// [`Diff::apply`], so every byte outside an edited range is copied through
/// untouched. Sub-scans build their own `Diff` against a borrowed fragment
/// and the caller splices it into the outer one with [`Diff::merge`].
#[derive(Debug, Default)]
pub(crate) struct Diff {
    edits: Vec<Edit>,
}

impl Diff {
    /// Records a replacement of the inclusive range `[from, to]`, keeping the
    /// edits sorted. The engine only ever produces edits over disjoint
    /// sub-ranges, so overlap never occurs.
    pub(crate) fn add(&mut self, from: usize, to: usize, replacement: impl Into<String>) {
        let at = self.edits.partition_point(|edit| edit.to <= from);
        self.edits.insert(
            at,
            Edit {
                from,
                to,
                replacement: replacement.into(),
            },
        );
    }

    /// Splices the edits of `other`, computed against a sub-fragment starting
    /// at `offset`, into this buffer.
    pub(crate) fn merge(&mut self, other: Diff, offset: usize) {
        for edit in other.edits {
            self.add(edit.from + offset, edit.to + offset, edit.replacement);
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Applies all edits to the input in a single pass.
    pub(crate) fn apply(&self, input: &str) -> String {
        let mut output = String::with_capacity(input.len());
        let mut from = 0;
        for edit in &self.edits {
            output.push_str(&input[from..edit.from]);
            output.push_str(&edit.replacement);
            from = edit.to + 1;
        }
        output.push_str(&input[from..]);
        output
    }
}
