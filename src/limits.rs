//! Recognition limits for block markers.

/// Deepest heading level; longer `#` runs are paragraph text.
pub const MAX_HEADING_LEVEL: usize = 6;

/// Maximum digits in ordered list marker (prevents big-integer markers)
pub const MAX_LIST_MARKER_DIGITS: usize = 9;

/// Leading spaces tolerated before a fence, heading or list marker.
/// Deeper indentation makes the line paragraph text.
pub const MAX_MARKER_INDENT: usize = 3;
