//! HTML output writer and block renderer.
//!
//! The writer owns a geometrically growing buffer. Nothing else holds
//! references into it, so unlike the [`Arena`] it is free to relocate.

use crate::arena::Arena;
use crate::block::{Block, Document, ListKind};
use crate::config::ParserConfig;
use crate::error::{Error, Result};
use crate::escape;

/// HTML output writer with pre-allocated, reusable buffer.
///
/// # Example
/// ```
/// use inkpress::HtmlWriter;
///
/// let mut writer = HtmlWriter::with_capacity_for(1000);
/// writer.write_str("<p>");
/// writer.write_escaped("Hello <World>");
/// writer.write_str("</p>");
///
/// let html = writer.into_string();
/// assert_eq!(html, "<p>Hello &lt;World&gt;</p>");
/// ```
#[derive(Debug, Default)]
pub struct HtmlWriter {
    out: String,
}

impl HtmlWriter {
    /// Create a new writer with default capacity.
    #[inline]
    pub fn new() -> Self {
        Self {
            out: String::with_capacity(1024),
        }
    }

    /// Create with pre-allocated capacity based on expected input size.
    ///
    /// Typical HTML is ~1.25x input size; we reserve extra for safety.
    #[inline]
    pub fn with_capacity_for(input_len: usize) -> Self {
        Self {
            out: String::with_capacity(input_len + input_len / 4),
        }
    }

    /// Like [`with_capacity_for`](Self::with_capacity_for), reporting
    /// allocation failure instead of aborting.
    pub fn try_with_capacity_for(input_len: usize) -> Result<Self> {
        let capacity = input_len.saturating_add(input_len / 4);
        let mut out = String::new();
        out.try_reserve(capacity)
            .map_err(|_| Error::out_of_memory(capacity))?;
        Ok(Self { out })
    }

    /// Write a string without escaping.
    #[inline]
    pub fn write_str(&mut self, s: &str) {
        self.out.push_str(s);
    }

    /// Write text with HTML escaping.
    #[inline]
    pub fn write_escaped(&mut self, text: &str) {
        escape::escape_html_into(&mut self.out, text);
    }

    /// Current output length.
    #[inline]
    pub fn len(&self) -> usize {
        self.out.len()
    }

    /// Check if output is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    /// Get output as str.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.out
    }

    /// Take ownership as String.
    #[inline]
    pub fn into_string(self) -> String {
        self.out
    }

    // --- Common HTML Elements ---

    /// Write paragraph start: `<p>`
    #[inline]
    pub fn paragraph_start(&mut self) {
        self.write_str("<p>");
    }

    /// Write paragraph end: `</p>\n`
    #[inline]
    pub fn paragraph_end(&mut self) {
        self.write_str("</p>\n");
    }

    /// Write heading start: `<hN>`
    #[inline]
    pub fn heading_start(&mut self, level: u8) {
        debug_assert!((1..=6).contains(&level));
        self.write_str("<h");
        self.out.push(char::from(b'0' + level));
        self.out.push('>');
    }

    /// Write heading end: `</hN>\n`
    #[inline]
    pub fn heading_end(&mut self, level: u8) {
        debug_assert!((1..=6).contains(&level));
        self.write_str("</h");
        self.out.push(char::from(b'0' + level));
        self.write_str(">\n");
    }

    /// Write list start: `<ul>\n` or `<ol>\n`
    #[inline]
    pub fn list_start(&mut self, kind: ListKind) {
        self.out.push('<');
        self.write_str(kind.tag());
        self.write_str(">\n");
    }

    /// Write list end: `</ul>\n` or `</ol>\n`
    #[inline]
    pub fn list_end(&mut self, kind: ListKind) {
        self.write_str("</");
        self.write_str(kind.tag());
        self.write_str(">\n");
    }

    /// Write list item start: `<li>`
    #[inline]
    pub fn li_start(&mut self) {
        self.write_str("<li>");
    }

    /// Write list item end: `</li>\n`
    #[inline]
    pub fn li_end(&mut self) {
        self.write_str("</li>\n");
    }

    /// Write code block start with optional language class and theme.
    #[inline]
    pub fn code_block_start(&mut self, lang: Option<&str>, theme: Option<&str>) {
        match lang {
            Some(l) if !l.is_empty() => {
                self.write_str("<pre><code class=\"language-");
                self.write_escaped(l);
                self.out.push('"');
                if let Some(t) = theme {
                    self.write_str(" data-theme=\"");
                    self.write_escaped(t);
                    self.out.push('"');
                }
                self.out.push('>');
            }
            _ => {
                self.write_str("<pre><code>");
            }
        }
    }

    /// Write code block end: `</code></pre>\n`
    #[inline]
    pub fn code_block_end(&mut self) {
        self.write_str("</code></pre>\n");
    }
}

impl std::fmt::Write for HtmlWriter {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        self.out.push_str(s);
        Ok(())
    }
}

/// Render a document to an independently owned HTML string.
///
/// The returned string shares nothing with `arena`, so the arena may be
/// dropped as soon as this returns.
pub fn render_html(doc: &Document, arena: &Arena, config: &ParserConfig) -> Result<String> {
    let estimate = arena.stats().bytes_allocated + doc.len() * 12;
    let mut writer = HtmlWriter::try_with_capacity_for(estimate)?;
    render_to_writer(doc, arena, config, &mut writer);
    tracing::trace!(blocks = doc.len(), bytes = writer.len(), "rendered document");
    Ok(writer.into_string())
}

/// Render a document into a writer.
///
/// Tolerates block sequences from any producer: list tags always come out
/// balanced, even when `ListStart`/`ListEnd` blocks are missing or nested.
pub fn render_to_writer(
    doc: &Document,
    arena: &Arena,
    config: &ParserConfig,
    writer: &mut HtmlWriter,
) {
    let mut open_list: Option<ListKind> = None;

    for block in doc {
        render_block(block, arena, config, writer, &mut open_list);
    }

    // Close a list the producer left open
    if let Some(kind) = open_list.take() {
        writer.list_end(kind);
    }
}

/// Render a single block to HTML.
fn render_block(
    block: &Block,
    arena: &Arena,
    config: &ParserConfig,
    writer: &mut HtmlWriter,
    open_list: &mut Option<ListKind>,
) {
    match *block {
        Block::Heading { level, text } => {
            let level = level.clamp(1, 6);
            writer.heading_start(level);
            writer.write_str(arena.str(text));
            writer.heading_end(level);
        }
        Block::Paragraph { text } => {
            if !text.is_empty() {
                writer.paragraph_start();
                writer.write_str(arena.str(text));
                writer.paragraph_end();
            }
        }
        Block::ListStart { kind } => {
            // Flat lists only: a second start closes the first
            if let Some(open) = open_list.take() {
                writer.list_end(open);
            }
            writer.list_start(kind);
            *open_list = Some(kind);
        }
        Block::ListItem { text } => {
            writer.li_start();
            writer.write_str(arena.str(text));
            writer.li_end();
        }
        Block::ListEnd => {
            if let Some(kind) = open_list.take() {
                writer.list_end(kind);
            }
        }
        Block::Code { lang, body } => {
            let lang = config
                .enable_syntax_highlight
                .then(|| arena.str(lang));
            let theme = config.syntax_theme.as_deref();
            writer.code_block_start(lang, theme);
            writer.write_escaped(arena.str(body));
            writer.code_block_end();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Span;

    fn render(blocks: impl FnOnce(&mut Arena) -> Vec<Block>) -> String {
        render_with(&ParserConfig::default(), blocks)
    }

    fn render_with(
        config: &ParserConfig,
        blocks: impl FnOnce(&mut Arena) -> Vec<Block>,
    ) -> String {
        let mut arena = Arena::new();
        let doc: Document = blocks(&mut arena).into_iter().collect();
        render_html(&doc, &arena, config).unwrap()
    }

    #[test]
    fn test_writer_new() {
        let writer = HtmlWriter::new();
        assert!(writer.is_empty());
    }

    #[test]
    fn test_writer_capacity() {
        let writer = HtmlWriter::with_capacity_for(1000);
        assert!(writer.out.capacity() >= 1250);
        let writer = HtmlWriter::try_with_capacity_for(1000).unwrap();
        assert!(writer.out.capacity() >= 1250);
    }

    #[test]
    fn test_writer_heading_levels() {
        for level in 1..=6 {
            let mut writer = HtmlWriter::new();
            writer.heading_start(level);
            writer.heading_end(level);
            let expected = format!("<h{level}></h{level}>\n");
            assert_eq!(writer.as_str(), expected);
        }
    }

    #[test]
    fn test_writer_lists() {
        let mut writer = HtmlWriter::new();
        writer.list_start(ListKind::Ordered);
        writer.li_start();
        writer.write_str("x");
        writer.li_end();
        writer.list_end(ListKind::Ordered);
        assert_eq!(writer.as_str(), "<ol>\n<li>x</li>\n</ol>\n");
    }

    #[test]
    fn test_writer_code_block() {
        let mut writer = HtmlWriter::new();
        writer.code_block_start(Some("rust"), None);
        writer.write_escaped("fn main() {}");
        writer.code_block_end();
        assert_eq!(
            writer.as_str(),
            "<pre><code class=\"language-rust\">fn main() {}</code></pre>\n"
        );
    }

    #[test]
    fn test_writer_code_block_no_lang() {
        let mut writer = HtmlWriter::new();
        writer.code_block_start(Some(""), Some("github"));
        writer.write_escaped("code");
        writer.code_block_end();
        assert_eq!(writer.as_str(), "<pre><code>code</code></pre>\n");
    }

    #[test]
    fn test_render_heading_and_paragraph() {
        let html = render(|arena| {
            vec![
                Block::Heading { level: 2, text: arena.alloc_str("Title").unwrap() },
                Block::Paragraph { text: arena.alloc_str("Body & <b>raw</b>").unwrap() },
            ]
        });
        assert_eq!(html, "<h2>Title</h2>\n<p>Body & <b>raw</b></p>\n");
    }

    #[test]
    fn test_render_empty_paragraph_suppressed() {
        let html = render(|_| vec![Block::Paragraph { text: Span::EMPTY }]);
        assert_eq!(html, "");
    }

    #[test]
    fn test_render_out_of_range_level_clamped() {
        let html = render(|arena| {
            vec![Block::Heading { level: 9, text: arena.alloc_str("x").unwrap() }]
        });
        assert_eq!(html, "<h6>x</h6>\n");
    }

    #[test]
    fn test_render_list() {
        let html = render(|arena| {
            vec![
                Block::ListStart { kind: ListKind::Unordered },
                Block::ListItem { text: arena.alloc_str("a").unwrap() },
                Block::ListItem { text: arena.alloc_str("b").unwrap() },
                Block::ListEnd,
            ]
        });
        assert_eq!(html, "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n");
    }

    #[test]
    fn test_render_closes_unterminated_list() {
        let html = render(|arena| {
            vec![
                Block::ListStart { kind: ListKind::Ordered },
                Block::ListItem { text: arena.alloc_str("a").unwrap() },
            ]
        });
        assert_eq!(html, "<ol>\n<li>a</li>\n</ol>\n");
    }

    #[test]
    fn test_render_start_while_open_closes_first() {
        let html = render(|_| {
            vec![
                Block::ListStart { kind: ListKind::Ordered },
                Block::ListStart { kind: ListKind::Unordered },
                Block::ListEnd,
            ]
        });
        assert_eq!(html, "<ol>\n</ol>\n<ul>\n</ul>\n");
    }

    #[test]
    fn test_render_stray_list_end_ignored() {
        let html = render(|_| vec![Block::ListEnd, Block::ListEnd]);
        assert_eq!(html, "");
    }

    #[test]
    fn test_render_code_escapes_body() {
        let html = render(|arena| {
            vec![Block::Code {
                lang: arena.alloc_str("rust").unwrap(),
                body: arena.alloc_str("let v: Vec<u8> = a && b;").unwrap(),
            }]
        });
        assert_eq!(
            html,
            "<pre><code class=\"language-rust\">let v: Vec&lt;u8&gt; = a &amp;&amp; b;</code></pre>\n"
        );
    }

    #[test]
    fn test_render_code_without_highlighting() {
        let config = ParserConfig {
            enable_syntax_highlight: false,
            ..ParserConfig::default()
        };
        let html = render_with(&config, |arena| {
            vec![Block::Code {
                lang: arena.alloc_str("rust").unwrap(),
                body: arena.alloc_str("x").unwrap(),
            }]
        });
        assert_eq!(html, "<pre><code>x</code></pre>\n");
    }

    #[test]
    fn test_render_code_with_theme() {
        let config = ParserConfig {
            syntax_theme: Some("github".to_owned()),
            ..ParserConfig::default()
        };
        let html = render_with(&config, |arena| {
            vec![Block::Code {
                lang: arena.alloc_str("c").unwrap(),
                body: arena.alloc_str("x").unwrap(),
            }]
        });
        assert_eq!(
            html,
            "<pre><code class=\"language-c\" data-theme=\"github\">x</code></pre>\n"
        );
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut arena = Arena::new();
        let doc: Document = vec![
            Block::ListStart { kind: ListKind::Unordered },
            Block::ListItem { text: arena.alloc_str("a").unwrap() },
        ]
        .into_iter()
        .collect();
        let config = ParserConfig::default();
        let first = render_html(&doc, &arena, &config).unwrap();
        let second = render_html(&doc, &arena, &config).unwrap();
        assert_eq!(first, second);
    }
}
