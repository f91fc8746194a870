//! Foundation types for the bpmn-meta toolchain.
//!
//! This module provides fundamental types used throughout the engine:
//! - [`Position`], [`LineIndex`] - Line/column positions for diagnostics
//! - [`TextRange`], [`TextSize`] - Source ranges (byte offsets)
//! - Domain constants (defaults, reserved task inputs)
//!
//! This module has NO dependencies on other bpmn-meta modules.

pub mod constants;
mod position;

pub use position::{LineIndex, Position};

// Re-export text-size types for convenience
pub use text_size;
pub use text_size::{TextRange, TextSize};
