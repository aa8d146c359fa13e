//! Output helpers available to every compiled template
//!
//! These are the only functions generated code can reach besides `include`.
//! Templates compiled by the macros call them through `::ztpl::helpers`, the
//! script engine exposes them as `escape_html`, `trim_eol` and
//! `trim_whitespace`.

use std::borrow::Cow;

/// Replaces `&`, `<`, `>`, `"` and `'` with their shortest HTML entities
///
/// ```rust
/// assert_eq!(ztpl::helpers::escape_html("<p>hi</p>"), "&lt;p&gt;hi&lt;/p&gt;");
/// ```
pub fn escape_html(src: &str) -> Cow<'_, str> {
    let mut escaped = String::new();
    let mut last = 0;
    for (i, c) in src.char_indices() {
        let entity = match c {
            '&' => "&amp;",
            '<' => "&lt;",
            '>' => "&gt;",
            '"' => "&#34;",
            '\'' => "&#39;",
            _ => continue,
        };
        escaped.push_str(&src[last..i]);
        escaped.push_str(entity);
        last = i + 1;
    }
    if last == 0 {
        return Cow::Borrowed(src);
    }
    escaped.push_str(&src[last..]);
    Cow::Owned(escaped)
}

/// Strips carriage returns and line feeds from both ends
pub fn trim_eol(src: &str) -> &str {
    src.trim_matches(['\r', '\n'])
}

/// Strips spaces, tabs, carriage returns, line feeds and form feeds from both ends
pub fn trim_whitespace(src: &str) -> &str {
    src.trim_matches([' ', '\t', '\r', '\n', '\u{c}'])
}
