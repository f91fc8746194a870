//! Parse error type
//!
//! A parse error carries:
//! - A categorized error code
//! - The byte offset and line/column where parsing stopped
//! - A human-readable reason

use text_size::TextSize;
use thiserror::Error;

use super::codes::ErrorCode;
use crate::base::{LineIndex, Position};

/// A fatal error while turning document text into an element tree.
///
/// Parsing stops at the first error; there is no partial tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code} at {position}: {reason}")]
pub struct ParseError {
    /// Categorized error code
    pub code: ErrorCode,
    /// Byte offset into the document
    pub offset: TextSize,
    /// Line/column of `offset` (0-indexed; displayed 1-indexed)
    pub position: Position,
    /// Human-readable reason
    pub reason: String,
}

impl ParseError {
    /// Create a new parse error, computing the position from the source text
    pub fn new(code: ErrorCode, text: &str, offset: TextSize, reason: impl Into<String>) -> Self {
        let position = LineIndex::new(text).position(text, offset);
        Self {
            code,
            offset,
            position,
            reason: reason.into(),
        }
    }

    /// Create an error using the code's default message as the reason
    pub fn with_default_reason(code: ErrorCode, text: &str, offset: TextSize) -> Self {
        Self::new(code, text, offset, code.default_message())
    }

    /// Check if this error concerns element nesting rather than raw markup
    pub fn is_structural(&self) -> bool {
        self.code.is_structural()
    }
}
