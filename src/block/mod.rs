//! Block-level parser for Markdown.
//!
//! The block parser is line-oriented and handles:
//! - Front matter (skipped)
//! - Fenced code blocks
//! - ATX headings
//! - Single-level ordered and unordered lists
//! - Paragraphs (one block per line)

mod document;
mod event;
mod parser;

pub use document::{BlockId, Document, Iter};
pub use event::{Block, ListKind};
pub use parser::{BlockParser, Degradation, Malformed, ParseReport, split_front_matter};
