//! Block parser implementation.

use memchr::{memchr, memchr_iter};
use smallvec::SmallVec;

use crate::arena::Arena;
use crate::error::Result;
use crate::limits::{MAX_HEADING_LEVEL, MAX_LIST_MARKER_DIGITS, MAX_MARKER_INDENT};

use super::document::Document;
use super::event::{Block, ListKind};

/// Front matter delimiter line.
const FRONT_MATTER_DELIMITER: &str = "---";

/// Code fence marker.
const FENCE: &str = "```";

/// UTF-8 byte order mark, ignored at the start of input.
const BOM: char = '\u{feff}';

/// A construct that was not recognized and fell back to paragraph text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Malformed {
    /// A code fence with no closing fence line.
    UnterminatedFence,
    /// A `#` run longer than six followed by whitespace.
    HeadingTooDeep,
    /// A `-` or ordered marker glued to the item text (`-item`, `1.item`),
    /// or an ordered marker with too many digits.
    InvalidListMarker,
}

/// One degraded line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Degradation {
    /// 1-based line number in the full input, front matter included.
    pub line: usize,
    /// What was malformed.
    pub kind: Malformed,
}

/// Outcome of a successful parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport<'a> {
    /// Raw text between the front matter delimiters, if any was skipped.
    pub front_matter: Option<&'a str>,
    /// Lines that degraded to paragraph text.
    pub degradations: SmallVec<[Degradation; 4]>,
}

impl ParseReport<'_> {
    /// Whether any construct degraded to paragraph text.
    #[inline]
    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }
}

/// Split a leading `---` front matter block from the body.
///
/// Returns the raw front matter (without delimiters) and the body, with blank
/// lines directly after the closing delimiter removed. Without a closing
/// delimiter the whole input is body. A leading byte order mark is dropped.
///
/// # Example
/// ```
/// use inkpress::block::split_front_matter;
///
/// let (front, body) = split_front_matter("---\ntitle: A\n---\n\nBody");
/// assert_eq!(front, Some("title: A\n"));
/// assert_eq!(body, "Body");
/// ```
pub fn split_front_matter(input: &str) -> (Option<&str>, &str) {
    let input = input.strip_prefix(BOM).unwrap_or(input);
    let mut temp = LineCursor::new(input);
    match temp.next_line() {
        Some(line) if line.text == FRONT_MATTER_DELIMITER => {}
        _ => return (None, input),
    }

    let content_start = temp.offset();
    loop {
        let line_start = temp.offset();
        let Some(line) = temp.next_line() else {
            return (None, input);
        };
        if line.text != FRONT_MATTER_DELIMITER {
            continue;
        }

        let front = &input[content_start..line_start];
        loop {
            let mut peek = temp;
            match peek.next_line() {
                Some(line) if is_blank(line.text) => temp = peek,
                _ => break,
            }
        }
        return (Some(front), &input[temp.offset()..]);
    }
}

/// A line of input without its terminator.
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    text: &'a str,
    /// 1-based.
    number: usize,
}

/// Copyable line scanner. Clone it to look ahead, assign it back to commit.
#[derive(Debug, Clone, Copy)]
struct LineCursor<'a> {
    input: &'a str,
    pos: usize,
    number: usize,
}

impl<'a> LineCursor<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            number: 0,
        }
    }

    fn new_at(input: &'a str, pos: usize, number: usize) -> Self {
        debug_assert!(pos <= input.len());
        Self { input, pos, number }
    }

    #[inline]
    fn offset(&self) -> usize {
        self.pos
    }

    fn next_line(&mut self) -> Option<Line<'a>> {
        if self.pos >= self.input.len() {
            return None;
        }
        let rest = &self.input.as_bytes()[self.pos..];
        let end = match memchr(b'\n', rest) {
            Some(i) => self.pos + i,
            None => self.input.len(),
        };
        let text = &self.input[self.pos..end];
        let text = text.strip_suffix('\r').unwrap_or(text);
        self.pos = (end + 1).min(self.input.len());
        self.number += 1;
        Some(Line {
            text,
            number: self.number,
        })
    }
}

/// Result of matching a heading marker.
enum HeadingMatch<'a> {
    Heading { level: u8, text: &'a str },
    TooDeep,
    None,
}

/// Result of matching a list marker.
enum ListMatch<'a> {
    Item { kind: ListKind, text: &'a str },
    Malformed,
    None,
}

/// Block parser state.
pub struct BlockParser<'a> {
    /// Input text.
    input: &'a str,
    /// Kind of the list currently open, if any.
    list: Option<ListKind>,
    /// Scratch buffer for normalizing code bodies.
    code: String,
    /// Offset from which no closing fence exists.
    unclosed_from: usize,
    /// Report under construction.
    report: ParseReport<'a>,
}

impl<'a> BlockParser<'a> {
    /// Create a new block parser.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            list: None,
            code: String::new(),
            unclosed_from: usize::MAX,
            report: ParseReport::default(),
        }
    }

    /// Parse all blocks into `doc`, allocating their text in `arena`.
    ///
    /// Only allocation failure is an error; malformed constructs are listed
    /// in the returned report.
    pub fn parse(&mut self, arena: &mut Arena, doc: &mut Document) -> Result<ParseReport<'a>> {
        let (front_matter, body) = split_front_matter(self.input);
        let body_start = self.input.len() - body.len();
        let skipped_lines = memchr_iter(b'\n', &self.input.as_bytes()[..body_start]).count();
        self.report.front_matter = front_matter;

        let mut lines = LineCursor::new_at(self.input, body_start, skipped_lines);
        while let Some(line) = lines.next_line() {
            self.parse_line(line, &mut lines, arena, doc)?;
        }

        // Close any list still open at end of input
        self.close_list(doc)?;

        tracing::trace!(
            blocks = doc.len(),
            degraded = self.report.degradations.len(),
            front_matter = front_matter.is_some(),
            "parsed document"
        );
        Ok(std::mem::take(&mut self.report))
    }

    /// Parse a single line. Code blocks consume further lines from `lines`.
    fn parse_line(
        &mut self,
        line: Line<'a>,
        lines: &mut LineCursor<'a>,
        arena: &mut Arena,
        doc: &mut Document,
    ) -> Result<()> {
        // Check for fenced code block
        if let Some(lang) = fence_open(line.text) {
            if self.try_code_block(lang, lines, arena, doc)? {
                return Ok(());
            }
            self.degrade(line, Malformed::UnterminatedFence);
        }

        // Blank line closes any open list
        if is_blank(line.text) {
            return self.close_list(doc);
        }

        if let Some(rest) = strip_marker_indent(line.text) {
            // Check for ATX heading
            match atx_heading(rest) {
                HeadingMatch::Heading { level, text } => {
                    self.close_list(doc)?;
                    let text = arena.alloc_str(text)?;
                    doc.push(Block::Heading { level, text })?;
                    return Ok(());
                }
                HeadingMatch::TooDeep => self.degrade(line, Malformed::HeadingTooDeep),
                HeadingMatch::None => {}
            }

            // Check for list item
            match list_marker(rest) {
                ListMatch::Item { kind, text } => return self.list_item(kind, text, arena, doc),
                ListMatch::Malformed => self.degrade(line, Malformed::InvalidListMarker),
                ListMatch::None => {}
            }
        }

        // Otherwise, it's a paragraph line
        self.close_list(doc)?;
        let text = arena.alloc_str(line.text)?;
        doc.push(Block::Paragraph { text })?;
        Ok(())
    }

    /// Try to read a fenced code block whose opening line was just consumed.
    /// Returns false, consuming nothing, if no closing fence follows.
    fn try_code_block(
        &mut self,
        lang: &'a str,
        lines: &mut LineCursor<'a>,
        arena: &mut Arena,
        doc: &mut Document,
    ) -> Result<bool> {
        let body_start = lines.offset();
        if body_start >= self.unclosed_from {
            return Ok(false);
        }
        let mut temp = *lines;
        let body_end = loop {
            let line_start = temp.offset();
            match temp.next_line() {
                Some(line) if line.text.trim_ascii() == FENCE => break line_start,
                Some(_) => {}
                None => {
                    self.unclosed_from = body_start;
                    return Ok(false);
                }
            }
        };
        *lines = temp;

        self.close_list(doc)?;

        normalize_code(&self.input[body_start..body_end], &mut self.code);
        let lang = arena.alloc_str(lang)?;
        let body = arena.alloc_str(&self.code)?;
        doc.push(Block::Code { lang, body })?;
        Ok(true)
    }

    /// Emit a list item, opening (or switching) the list as needed.
    fn list_item(
        &mut self,
        kind: ListKind,
        text: &str,
        arena: &mut Arena,
        doc: &mut Document,
    ) -> Result<()> {
        if self.list != Some(kind) {
            self.close_list(doc)?;
            doc.push(Block::ListStart { kind })?;
            self.list = Some(kind);
        }
        let text = arena.alloc_str(text)?;
        doc.push(Block::ListItem { text })?;
        Ok(())
    }

    /// Close an open list.
    fn close_list(&mut self, doc: &mut Document) -> Result<()> {
        if self.list.take().is_some() {
            doc.push(Block::ListEnd)?;
        }
        Ok(())
    }

    fn degrade(&mut self, line: Line<'_>, kind: Malformed) {
        tracing::trace!(line = line.number, ?kind, "malformed construct kept as paragraph text");
        self.report.degradations.push(Degradation {
            line: line.number,
            kind,
        });
    }
}

/// Check for a blank line (empty or whitespace only).
#[inline]
fn is_blank(text: &str) -> bool {
    text.bytes().all(is_marker_space)
}

/// Whitespace that may follow a heading or list marker, vertical tab included.
#[inline]
fn is_marker_space(b: u8) -> bool {
    b.is_ascii_whitespace() || b == 0x0b
}

/// Trim marker whitespace from both ends.
#[inline]
fn trim_marker_space(text: &str) -> &str {
    text.trim_matches(|c: char| u8::try_from(c).is_ok_and(is_marker_space))
}

/// Strip up to three leading spaces. Returns None for deeper indentation.
#[inline]
fn strip_marker_indent(text: &str) -> Option<&str> {
    let indent = text.bytes().take_while(|&b| b == b' ').count();
    if indent > MAX_MARKER_INDENT {
        return None;
    }
    Some(&text[indent..])
}

/// Match an opening code fence, returning the trimmed language tag.
///
/// Backticks in the language tag make the line not a fence.
fn fence_open(text: &str) -> Option<&str> {
    let rest = strip_marker_indent(text)?;
    let lang = rest.strip_prefix(FENCE)?.trim_ascii();
    if lang.contains('`') {
        return None;
    }
    Some(lang)
}

/// Match an ATX heading: 1-6 `#` followed by whitespace.
fn atx_heading(rest: &str) -> HeadingMatch<'_> {
    let run = rest.bytes().take_while(|&b| b == b'#').count();
    if run == 0 {
        return HeadingMatch::None;
    }

    // Must be followed by whitespace
    let after = &rest[run..];
    if !after.as_bytes().first().is_some_and(|&b| is_marker_space(b)) {
        return HeadingMatch::None;
    }
    if run > MAX_HEADING_LEVEL {
        return HeadingMatch::TooDeep;
    }

    HeadingMatch::Heading {
        level: run as u8,
        text: trim_marker_space(after),
    }
}

/// Match a list marker: `-`/`*` or 1-9 digits plus `.`/`)`, then whitespace.
fn list_marker(rest: &str) -> ListMatch<'_> {
    let bytes = rest.as_bytes();
    let (kind, marker_len) = match bytes.first().copied() {
        Some(b'-' | b'*') => (ListKind::Unordered, 1),
        Some(b'0'..=b'9') => {
            let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
            if !matches!(bytes.get(digits).copied(), Some(b'.' | b')')) {
                return ListMatch::None;
            }
            if digits > MAX_LIST_MARKER_DIGITS {
                return ListMatch::Malformed;
            }
            (ListKind::Ordered, digits + 1)
        }
        _ => return ListMatch::None,
    };

    let after = &rest[marker_len..];
    match after.as_bytes().first().copied() {
        None => ListMatch::Item { kind, text: "" },
        Some(b) if is_marker_space(b) => ListMatch::Item {
            kind,
            text: trim_marker_space(after),
        },
        // Glued to a word: `-item`, `1.item`. `*` is left alone since it
        // usually starts emphasis.
        Some(b) if b.is_ascii_alphanumeric() && bytes[0] != b'*' => ListMatch::Malformed,
        Some(_) => ListMatch::None,
    }
}

/// Normalize a code body into `out`.
///
/// Each line loses its leading indentation, runs of whitespace collapse to a
/// single space, newlines are kept and trailing whitespace of the whole body
/// is trimmed.
fn normalize_code(body: &str, out: &mut String) {
    out.clear();
    for (i, line) in body.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let line = line.strip_suffix('\r').unwrap_or(line).trim_ascii_start();
        let mut in_space = false;
        for c in line.chars() {
            if c.is_ascii_whitespace() {
                if !in_space {
                    out.push(' ');
                    in_space = true;
                }
            } else {
                out.push(c);
                in_space = false;
            }
        }
    }
    let trimmed = out.trim_ascii_end().len();
    out.truncate(trimmed);
}
