//! Parser configuration.

use serde::Deserialize;

/// Options record passed by value when a session is created.
///
/// Missing keys take their defaults and unknown keys are ignored, so older
/// and newer configuration files both load.
///
/// # Example
/// ```
/// use inkpress::ParserConfig;
///
/// let config = ParserConfig {
///     syntax_theme: Some("github".to_owned()),
///     ..ParserConfig::default()
/// };
/// assert!(config.enable_syntax_highlight);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Reserved: table of contents generation.
    pub enable_toc: bool,
    /// Reserved: footnote support.
    pub enable_footnotes: bool,
    /// Emit `class="language-…"` on fenced code blocks.
    pub enable_syntax_highlight: bool,
    /// Theme name emitted as `data-theme` on highlighted code blocks.
    pub syntax_theme: Option<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            enable_toc: true,
            enable_footnotes: true,
            enable_syntax_highlight: true,
            syntax_theme: None,
        }
    }
}
