//! Parser error handling module
//!
//! - Categorized error codes for filtering and documentation
//! - Position tracking (byte offset and line/column)

mod codes;
mod error;

pub use codes::ErrorCode;
pub use error::ParseError;
