//! HTML escaping and sanitization utilities.
//!
//! Fast-path optimized: scans for first escapable character,
//! then bulk-copies segments between escapes.

use memchr::memmem;
use memchr::{memchr, memchr3};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Lookup table for escapable characters in text content.
/// Index by byte value, true if needs escaping.
const TEXT_ESCAPE_TABLE: [bool; 256] = {
    let mut table = [false; 256];
    table[b'<' as usize] = true;
    table[b'>' as usize] = true;
    table[b'&' as usize] = true;
    table[b'"' as usize] = true;
    table
};

/// Longest entity produced by [`escape_html`].
const MAX_ENTITY_LEN: usize = 6;

/// Substrings [`sanitize_html`] blanks out.
const DENYLIST: [&str; 3] = ["<script", "javascript:", "onerror="];

/// Replacement byte for denylisted substrings.
const FILLER: u8 = b'X';

/// Bytes left unencoded by [`url_encode`]: ASCII alphanumerics and `-_.~`.
const URL_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[inline]
fn entity(b: u8) -> Option<&'static str> {
    match b {
        b'<' => Some("&lt;"),
        b'>' => Some("&gt;"),
        b'&' => Some("&amp;"),
        b'"' => Some("&quot;"),
        _ => None,
    }
}

/// Escape HTML text into an output buffer.
///
/// Escapes `<`, `>`, `&` and `"`; every other byte passes through.
///
/// # Example
/// ```
/// use inkpress::escape::escape_html_into;
///
/// let mut out = String::new();
/// escape_html_into(&mut out, "<script>");
/// assert_eq!(out, "&lt;script&gt;");
/// ```
#[inline]
pub fn escape_html_into(out: &mut String, input: &str) {
    if input.is_empty() {
        return;
    }

    let bytes = input.as_bytes();
    let mut pos = match first_escape(bytes) {
        Some(p) => p,
        None => {
            out.push_str(input);
            return;
        }
    };

    out.reserve(input.len() + input.len() / 8);
    out.push_str(&input[..pos]);

    while pos < bytes.len() {
        // Scan for any escapable character using lookup table
        let scan_start = pos;
        while pos < bytes.len() && !TEXT_ESCAPE_TABLE[bytes[pos] as usize] {
            pos += 1;
        }

        // Copy non-escaped portion. Escapable bytes are ASCII, so both ends
        // are char boundaries.
        if pos > scan_start {
            out.push_str(&input[scan_start..pos]);
        }

        // Handle escape if found
        if let Some(seq) = bytes.get(pos).copied().and_then(entity) {
            out.push_str(seq);
            pos += 1;
        }
    }
}

/// Escape HTML text, returning a new string.
///
/// The result is never longer than `6 * input.len()`.
///
/// # Example
/// ```
/// use inkpress::escape_html;
///
/// assert_eq!(escape_html("<a>&\"b\""), "&lt;a&gt;&amp;&quot;b&quot;");
/// ```
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + input.len() / 8);
    escape_html_into(&mut out, input);
    out
}

/// Check if a string needs any escaping.
#[inline]
pub fn needs_escape(input: &str) -> bool {
    first_escape(input.as_bytes()).is_some()
}

#[inline]
fn first_escape(input: &[u8]) -> Option<usize> {
    let a = memchr3(b'<', b'>', b'&', input);
    let b = memchr(b'"', input);
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// Blank out `<script`, `javascript:` and `onerror=` in place.
///
/// Every case-sensitive occurrence is overwritten with the same number of
/// `X` bytes, so offsets into the string stay valid. This is a best-effort
/// denylist for trusted-but-careless input, NOT a security boundary: it
/// misses other casings, other event handlers and encoded payloads.
///
/// # Example
/// ```
/// use inkpress::sanitize_html;
///
/// let mut html = String::from("<script>alert(1)</script>");
/// sanitize_html(&mut html);
/// assert_eq!(html, "XXXXXXX>alert(1)</script>");
/// ```
pub fn sanitize_html(html: &mut String) {
    // SAFETY: only complete occurrences of ASCII patterns are overwritten,
    // byte for byte, with ASCII, so the buffer stays valid UTF-8.
    let bytes = unsafe { html.as_mut_vec() };
    for pattern in DENYLIST {
        let finder = memmem::Finder::new(pattern);
        let mut start = 0;
        while let Some(i) = finder.find(&bytes[start..]) {
            let at = start + i;
            bytes[at..at + pattern.len()].fill(FILLER);
            start = at + pattern.len();
        }
    }
}

/// HTML-escape into at most `capacity` bytes.
///
/// Output is cut before the first entity or character that would not fit
/// whole, so a truncated result never ends in a partial escape.
///
/// # Example
/// ```
/// use inkpress::escape::html_encode;
///
/// assert_eq!(html_encode("a<b", 16), "a&lt;b");
/// assert_eq!(html_encode("a<b", 4), "a");
/// ```
pub fn html_encode(input: &str, capacity: usize) -> String {
    let mut out = String::with_capacity(capacity.min(input.len() * MAX_ENTITY_LEN));
    for c in input.chars() {
        let mut buf = [0u8; 4];
        let piece = match u8::try_from(c).ok().and_then(entity) {
            Some(seq) => seq,
            None => c.encode_utf8(&mut buf),
        };
        if out.len() + piece.len() > capacity {
            break;
        }
        out.push_str(piece);
    }
    out
}

/// Percent-encode for URL contexts into at most `capacity` bytes.
///
/// ASCII alphanumerics and `-_.~` pass through; every other byte becomes
/// `%XX`. A truncated result never ends in a partial `%XX` sequence.
///
/// # Example
/// ```
/// use inkpress::escape::url_encode;
///
/// assert_eq!(url_encode("hello world", 64), "hello%20world");
/// assert_eq!(url_encode("hello world", 7), "hello");
/// ```
pub fn url_encode(input: &str, capacity: usize) -> String {
    let mut out = String::with_capacity(capacity.min(input.len() * 3));
    for piece in utf8_percent_encode(input, URL_ENCODE_SET) {
        let room = capacity - out.len();
        if piece.len() <= room {
            out.push_str(piece);
            continue;
        }
        // Escapes are atomic; unencoded runs are ASCII and may be split.
        if !piece.starts_with('%') {
            out.push_str(&piece[..room]);
        }
        break;
    }
    out
}

/// Reject paths containing `..`, `//` or `~`.
///
/// Guards file-reading callers against traversal outside their root.
///
/// # Example
/// ```
/// use inkpress::is_valid_path;
///
/// assert!(is_valid_path("posts/hello.md"));
/// assert!(!is_valid_path("../etc/passwd"));
/// ```
pub fn is_valid_path(path: &str) -> bool {
    !(path.contains("..") || path.contains("//") || path.contains('~'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_basic() {
        assert_eq!(escape_html("Hello, World!"), "Hello, World!");
    }

    #[test]
    fn test_escape_all() {
        assert_eq!(escape_html("<a>&\"b\""), "&lt;a&gt;&amp;&quot;b&quot;");
    }

    #[test]
    fn test_escape_single_quote_passes() {
        assert_eq!(escape_html("it's"), "it's");
    }

    #[test]
    fn test_escape_empty() {
        assert_eq!(escape_html(""), "");
    }

    #[test]
    fn test_escape_consecutive() {
        assert_eq!(escape_html("<<<"), "&lt;&lt;&lt;");
    }

    #[test]
    fn test_escape_at_boundaries() {
        assert_eq!(escape_html("<"), "&lt;");
        assert_eq!(escape_html("hello<"), "hello&lt;");
        assert_eq!(escape_html("<hello"), "&lt;hello");
    }

    #[test]
    fn test_escape_unicode() {
        assert_eq!(escape_html("Grüße <tag> 日本"), "Grüße &lt;tag&gt; 日本");
    }

    #[test]
    fn test_escape_into_appends() {
        let mut out = String::from("x=");
        escape_html_into(&mut out, "\"1\"");
        assert_eq!(out, "x=&quot;1&quot;");
    }

    #[test]
    fn test_needs_escape() {
        assert!(!needs_escape("hello"));
        assert!(needs_escape("<hello>"));
        assert!(needs_escape("a & b"));
        assert!(needs_escape("\""));
        assert!(!needs_escape(""));
    }

    #[test]
    fn test_sanitize_patterns() {
        let mut html = String::from("<a href=\"javascript:go()\" onerror=x><script");
        sanitize_html(&mut html);
        assert_eq!(html, "<a href=\"XXXXXXXXXXXgo()\" XXXXXXXXx>XXXXXXX");
    }

    #[test]
    fn test_sanitize_keeps_length_and_other_case() {
        let input = "<SCRIPT> <script <script";
        let mut html = String::from(input);
        sanitize_html(&mut html);
        assert_eq!(html.len(), input.len());
        assert_eq!(html, "<SCRIPT> XXXXXXX XXXXXXX");
    }

    #[test]
    fn test_sanitize_unicode_neighbors() {
        let mut html = String::from("é<scriptü");
        sanitize_html(&mut html);
        assert_eq!(html, "éXXXXXXXü");
    }

    #[test]
    fn test_html_encode_truncates_whole_entities() {
        assert_eq!(html_encode("<>", 8), "&lt;&gt;");
        assert_eq!(html_encode("<>", 7), "&lt;");
        assert_eq!(html_encode("&", 4), "");
        assert_eq!(html_encode("abc", 0), "");
    }

    #[test]
    fn test_html_encode_keeps_chars_whole() {
        assert_eq!(html_encode("aé", 2), "a");
        assert_eq!(html_encode("aé", 3), "aé");
    }

    #[test]
    fn test_url_encode() {
        assert_eq!(url_encode("a-b_c.d~e", 64), "a-b_c.d~e");
        assert_eq!(url_encode("a b/c?d=e", 64), "a%20b%2Fc%3Fd%3De");
        assert_eq!(url_encode("é", 64), "%C3%A9");
    }

    #[test]
    fn test_url_encode_truncates_whole_escapes() {
        assert_eq!(url_encode("ab cd", 4), "ab");
        assert_eq!(url_encode("ab cd", 5), "ab%20");
        assert_eq!(url_encode("abcdef", 3), "abc");
        assert_eq!(url_encode("é", 5), "%C3");
    }

    #[test]
    fn test_is_valid_path() {
        assert!(is_valid_path("posts/2024/hello.md"));
        assert!(is_valid_path("a.b/c.md"));
        assert!(!is_valid_path("posts/../secret"));
        assert!(!is_valid_path("posts//x.md"));
        assert!(!is_valid_path("~/notes.md"));
    }
}
