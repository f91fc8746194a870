//! Error code definitions for parser diagnostics
//!
//! Error codes follow a naming convention: E{category}{number}
//! - E01xx: Markup errors reported by the XML reader
//! - E02xx: Structural errors (element nesting, document shape)

use std::fmt;

/// Error codes for parser diagnostics
///
/// Each error code represents a specific category of parse error,
/// enabling filtering and documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // E01xx: Markup errors
    // =========================================================================
    /// Malformed markup (syntax, attributes, escapes, encoding)
    E0101,

    // =========================================================================
    // E02xx: Structural errors
    // =========================================================================
    /// Element opened but never closed before end of input
    E0201,
    /// End tag does not match the open element
    E0202,
    /// Content outside the single root element
    E0203,
    /// No root element at all
    E0204,
}

impl ErrorCode {
    /// Get the string representation of the error code (e.g., "E0201")
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E0101 => "E0101",
            Self::E0201 => "E0201",
            Self::E0202 => "E0202",
            Self::E0203 => "E0203",
            Self::E0204 => "E0204",
        }
    }

    /// Get a short description of the error category
    pub fn category_description(&self) -> &'static str {
        match self {
            Self::E0101 => "markup error",
            Self::E0201 | Self::E0202 | Self::E0203 | Self::E0204 => "structural error",
        }
    }

    /// Get the default message template for this error code
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::E0101 => "malformed markup",
            Self::E0201 => "unterminated element",
            Self::E0202 => "mismatched end tag",
            Self::E0203 => "content outside the root element",
            Self::E0204 => "document has no root element",
        }
    }

    /// Check if this is a structural error (nesting-related)
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::E0201 | Self::E0202 | Self::E0203 | Self::E0204
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
