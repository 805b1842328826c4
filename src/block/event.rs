//! Block types.

use crate::arena::Span;

/// One structural unit of a parsed document.
///
/// Text fields are handles into the session's [`Arena`](crate::Arena).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    /// An ATX heading.
    Heading {
        /// Heading level (1-6).
        level: u8,
        /// Heading text, trimmed.
        text: Span,
    },

    /// A single line of paragraph text. Empty text renders nothing.
    Paragraph {
        /// Line content.
        text: Span,
    },

    /// Opens a list.
    ListStart {
        /// List type (ordered or unordered).
        kind: ListKind,
    },
    /// One list item.
    ListItem {
        /// Item text with the marker removed.
        text: Span,
    },
    /// Closes the innermost open list.
    ListEnd,

    /// A fenced code block.
    Code {
        /// Language tag from the opening fence, possibly empty.
        lang: Span,
        /// Normalized code body.
        body: Span,
    },
}

/// Type of list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    /// Unordered list (`-` or `*` markers).
    Unordered,
    /// Ordered list (digit markers).
    Ordered,
}

impl ListKind {
    /// HTML element name for this list kind.
    #[inline]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Unordered => "ul",
            Self::Ordered => "ol",
        }
    }
}
