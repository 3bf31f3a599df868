//! Quote/unquote helpers for JSON string literals.

/// Decodes a raw JSON string literal, surrounding quotes included, into its
/// logical value. Returns `None` on malformed escapes.
pub(crate) fn unquote(raw: &str) -> Option<String> {
    serde_json::from_str(raw).ok()
}

/// Encodes a logical string as a minimal valid JSON string literal.
pub(crate) fn quote(value: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string(value)
}

#[cfg(test)]
mod tests {
    use super::{quote, unquote};

    #[test]
    fn unquotes_escapes() {
        assert_eq!(unquote(r#""abc""#).as_deref(), Some("abc"));
        assert_eq!(unquote(r#""a\"b\\c""#).as_deref(), Some(r#"a"b\c"#));
        assert_eq!(unquote(r#""A""#).as_deref(), Some("A"));
        assert_eq!(unquote(r#""""#).as_deref(), Some(""));
    }

    #[test]
    fn rejects_malformed_literals() {
        assert_eq!(unquote(r#""a\x""#), None);
        assert_eq!(unquote(r#""open"#), None);
        assert_eq!(unquote("bare"), None);
    }

    #[test]
    fn quotes_minimally() {
        assert_eq!(quote("abc").unwrap(), r#""abc""#);
        assert_eq!(quote(r#"a"b"#).unwrap(), r#""a\"b""#);
    }

    #[test]
    fn round_trips() {
        for s in ["", "plain", "with \"quotes\"", "tab\tand\nnewline", "émoji ✓"] {
            assert_eq!(unquote(&quote(s).unwrap()).as_deref(), Some(s));
        }
    }
}
