//! Rendering collaborators: markdown to HTML, and plain-text page layout

pub mod markdown;
pub mod pdf;

/// Escape text for inclusion in HTML element content or attribute values
pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing into a String never fails
    pulldown_cmark_escape::escape_html(&mut out, text).unwrap_or_default();
    out
}
