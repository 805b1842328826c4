//! inkpress: Markdown to HTML fragments for static site assembly
//!
//! A deliberately small Markdown dialect: ATX headings, one-line paragraphs,
//! single-level lists and fenced code blocks, with YAML-style front matter
//! skipped. Parsing produces a typed, singly-linked block sequence whose text
//! lives in a chunked, pointer-stable [`Arena`]; rendering walks that
//! sequence once and returns an independently owned `String`.
//!
//! # Design Principles
//! - One session, one document: a [`Session`] owns its arena and blocks and
//!   drops them together
//! - Arena handles never dangle: chunks are never reallocated once issued
//! - Malformed constructs degrade to paragraphs; only allocation failure
//!   is an error
//! - No inline formatting: text is emitted as-is, callers pre-escape with
//!   [`escape_html`] when they need to

pub mod arena;
pub mod block;
pub mod config;
pub mod error;
pub mod escape;
pub mod limits;
pub mod render;

// Re-export primary types
pub use arena::{Arena, ArenaStats, Span};
pub use block::{Block, BlockParser, Degradation, Document, ListKind, ParseReport};
pub use config::ParserConfig;
pub use error::{AllocCause, Error, Result};
pub use escape::{escape_html, is_valid_path, sanitize_html};
pub use render::HtmlWriter;

use smallvec::SmallVec;

/// Convert Markdown to HTML.
///
/// This is the primary API for simple use cases.
///
/// # Example
/// ```
/// let html = inkpress::to_html("# Hello\n\nWorld").unwrap();
/// assert_eq!(html, "<h1>Hello</h1>\n<p>World</p>\n");
/// ```
pub fn to_html(input: &str) -> Result<String> {
    to_html_with_config(input, ParserConfig::default())
}

/// Convert Markdown to HTML with a configuration.
pub fn to_html_with_config(input: &str, config: ParserConfig) -> Result<String> {
    let mut session = Session::with_arena(config, Arena::with_capacity_for(input.len()));
    session.parse(input)?;
    session.render()
}

/// Result of [`parse`]: the HTML plus what the parser reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult<'a> {
    /// Rendered HTML.
    pub html: String,
    /// Raw front matter text, for an external metadata extractor.
    pub front_matter: Option<&'a str>,
    /// Lines that degraded to paragraph text.
    pub degradations: SmallVec<[Degradation; 4]>,
}

impl ParseResult<'_> {
    /// Whether any construct degraded to paragraph text.
    #[inline]
    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }
}

/// Convert Markdown to HTML, also returning the skipped front matter and
/// any degraded constructs.
///
/// # Example
/// ```
/// let result = inkpress::parse("---\ntitle: Hello\n---\n# Content").unwrap();
/// assert_eq!(result.front_matter, Some("title: Hello\n"));
/// assert_eq!(result.html, "<h1>Content</h1>\n");
/// ```
pub fn parse(input: &str) -> Result<ParseResult<'_>> {
    parse_with_config(input, ParserConfig::default())
}

/// [`parse`] with a configuration.
pub fn parse_with_config(input: &str, config: ParserConfig) -> Result<ParseResult<'_>> {
    let mut session = Session::with_arena(config, Arena::with_capacity_for(input.len()));
    let ParseReport {
        front_matter,
        degradations,
    } = session.parse(input)?;
    let html = session.render()?;
    Ok(ParseResult {
        html,
        front_matter,
        degradations,
    })
}

/// One parsing session: an arena and the document built in it.
///
/// Create one per document; drop it once the HTML has been extracted.
/// Sessions share nothing, so independent documents can be processed on
/// independent threads.
///
/// # Example
/// ```
/// use inkpress::{ParserConfig, Session};
///
/// let mut session = Session::new(ParserConfig::default());
/// let report = session.parse("- a\n- b").unwrap();
/// assert!(!report.is_degraded());
/// assert_eq!(session.document().len(), 4);
///
/// let html = session.render().unwrap();
/// drop(session);
/// assert_eq!(html, "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n");
/// ```
#[derive(Debug)]
pub struct Session {
    config: ParserConfig,
    arena: Arena,
    document: Document,
}

impl Session {
    /// Create a session with a default arena.
    pub fn new(config: ParserConfig) -> Self {
        Self::with_arena(config, Arena::new())
    }

    /// Create a session around a caller-configured arena (chunk size, limit).
    pub fn with_arena(config: ParserConfig, arena: Arena) -> Self {
        Self {
            config,
            arena,
            document: Document::new(),
        }
    }

    /// Parse `input`, appending its blocks to this session's document.
    ///
    /// On allocation failure the parse is aborted, every block it appended
    /// is removed again and the error returned. The document is left as it
    /// was before the call.
    pub fn parse<'a>(&mut self, input: &'a str) -> Result<ParseReport<'a>> {
        let len = self.document.len();
        let result = BlockParser::new(input).parse(&mut self.arena, &mut self.document);
        if result.is_err() {
            tracing::debug!(
                dropped = self.document.len() - len,
                "parse failed, document rolled back"
            );
            self.document.truncate(len);
        }
        result
    }

    /// Render the document to an independently owned HTML string.
    pub fn render(&self) -> Result<String> {
        render::render_html(&self.document, &self.arena, &self.config)
    }

    /// The parsed blocks.
    #[inline]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The arena holding block text.
    #[inline]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Resolve a block text handle.
    #[inline]
    pub fn text(&self, span: Span) -> &str {
        self.arena.str(span)
    }

    /// The session configuration.
    #[inline]
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }
}
