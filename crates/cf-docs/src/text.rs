//! HTML reduction and search excerpts.

use regex::RegexBuilder;

/// Render HTML as plain text with all whitespace runs collapsed to a single
/// space.
pub fn html_to_text(html: &str) -> String {
    let rendered = html2text::from_read(html.as_bytes(), 200);
    collapse_whitespace(&rendered)
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Find the first case-insensitive occurrence of `term` and return it with
/// up to `radius` characters on each side, wrapped in `...`.
///
/// Returns `None` when the term is empty or absent.
pub fn excerpt(text: &str, term: &str, radius: usize) -> Option<String> {
    if term.is_empty() {
        return None;
    }
    let re = RegexBuilder::new(&regex::escape(term))
        .case_insensitive(true)
        .build()
        .ok()?;
    let hit = re.find(text)?;

    let start = text[..hit.start()]
        .char_indices()
        .rev()
        .nth(radius.saturating_sub(1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    let start = if radius == 0 { hit.start() } else { start };
    let end = text[hit.end()..]
        .char_indices()
        .nth(radius)
        .map(|(i, _)| hit.end() + i)
        .unwrap_or(text.len());

    Some(format!("...{}...", &text[start..end]))
}
