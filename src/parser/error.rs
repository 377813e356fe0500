//! Error types for selection expression parsing.

use thiserror::Error;

/// Errors that can occur while parsing an index/range selection expression.
///
/// A parse error always invalidates the whole expression; callers must
/// re-prompt or abort rather than fall back to a partial selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The expression was empty after trimming.
    #[error("empty selection\n  Suggestion: enter indices like 1-3,5 or 'a' for all")]
    Empty,

    /// A comma-separated token could not be read as an index or range.
    #[error("invalid selection token '{token}': {reason}\n  Suggestion: {suggestion}")]
    InvalidToken {
        /// The offending token, trimmed
        token: String,
        /// Why the token was rejected
        reason: String,
        /// How to fix the issue
        suggestion: &'static str,
    },
}

impl ParseError {
    /// Creates an `InvalidToken` error for a token with a non-numeric part.
    #[must_use]
    pub fn not_a_number(token: &str, part: &str) -> Self {
        Self::InvalidToken {
            token: token.to_string(),
            reason: format!("'{part}' is not a number"),
            suggestion: "use whole numbers such as 3 or 1-4",
        }
    }

    /// Creates an `InvalidToken` error for a range without exactly two bounds.
    #[must_use]
    pub fn bad_range(token: &str) -> Self {
        Self::InvalidToken {
            token: token.to_string(),
            reason: "a range needs exactly one start and one end".to_string(),
            suggestion: "write ranges as start-end, e.g. 2-7",
        }
    }

    /// Creates an `InvalidToken` error for an empty token (e.g. `1,,2`).
    #[must_use]
    pub fn empty_token() -> Self {
        Self::InvalidToken {
            token: String::new(),
            reason: "empty entry between commas".to_string(),
            suggestion: "remove the extra comma",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_empty_display() {
        let msg = ParseError::Empty.to_string();
        assert!(msg.contains("empty selection"), "got: {msg}");
        assert!(msg.contains("Suggestion"), "got: {msg}");
    }

    #[test]
    fn test_parse_error_not_a_number_display() {
        let msg = ParseError::not_a_number("1-x", "x").to_string();
        assert!(msg.contains("'1-x'"), "got: {msg}");
        assert!(msg.contains("'x' is not a number"), "got: {msg}");
    }

    #[test]
    fn test_parse_error_bad_range_display() {
        let msg = ParseError::bad_range("1-2-3").to_string();
        assert!(msg.contains("1-2-3"), "got: {msg}");
        assert!(msg.contains("start-end"), "got: {msg}");
    }
}
