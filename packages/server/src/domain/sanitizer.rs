//! Markup escaping applied once to every accepted message text.

/// Replace markup-significant characters (`& < > " '`) with HTML entities.
///
/// Single pass: an already escaped `&amp;` becomes `&amp;amp;`.
pub fn escape_html(text: &str) -> String {
    html_escape::encode_quoted_attribute(text).into_owned()
}
