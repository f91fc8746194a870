//! Document parser for BPMN2 process definitions
//!
//! Turns raw document text into an ordered [`ElementTree`]. No semantic
//! interpretation happens here: a reference to a missing form or an
//! unknown element kind is not a parse error.
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     ↓
//! quick-xml pull reader → Start / Empty / End / Text events
//!     ↓
//! TreeReader → open-element stack → ElementTree
//!     ↓
//! HIR → Semantic model
//! ```
//!
//! Parsing is a pure function of its input and stops at the first error.

pub mod errors;
mod reader;

pub use errors::{ErrorCode, ParseError};

use crate::syntax::ElementTree;

/// Parse document text into an element tree.
pub fn parse(text: &str) -> Result<ElementTree, ParseError> {
    reader::TreeReader::new(text).read()
}
