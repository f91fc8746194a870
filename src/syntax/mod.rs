//! Syntax: the ordered element tree produced by the parser.
//!
//! The tree is a faithful, uninterpreted view of the markup. Giving
//! meaning to elements is the job of [`crate::hir`].

mod tree;

pub use tree::{Descendants, ElementTree, XmlElement};

// Re-export Position from base for convenience
pub use crate::base::Position;
