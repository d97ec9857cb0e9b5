//! HTML helper functions

use std::ops::Range;

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Reverse [`html_escape`] for text pulled back out of rendered pages
pub fn html_unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

/// Strip HTML tags from a string
pub fn strip_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;

    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    result
}

/// Locate the inner content of the first element opened by `opener`
/// (e.g. `<div class="post-content">`), matching nested elements of the same
/// tag name so the range ends at the correct closing tag.
///
/// Returns the byte range of the inner content.
pub fn find_element_inner(html: &str, opener: &str) -> Option<Range<usize>> {
    let tag = opener
        .trim_start_matches('<')
        .split(|c: char| c.is_whitespace() || c == '>')
        .next()
        .filter(|t| !t.is_empty())?;
    let open_pat = format!("<{}", tag);
    let close_pat = format!("</{}>", tag);

    let inner_start = html.find(opener)? + opener.len();
    let mut depth = 1usize;
    let mut pos = inner_start;

    while depth > 0 {
        let rest = &html[pos..];
        let next_close = rest.find(&close_pat)?;
        let next_open = find_open_tag(rest, &open_pat);

        match next_open {
            Some(open) if open < next_close => {
                depth += 1;
                pos += open + open_pat.len();
            }
            _ => {
                depth -= 1;
                if depth == 0 {
                    return Some(inner_start..pos + next_close);
                }
                pos += next_close + close_pat.len();
            }
        }
    }

    None
}

/// Find `<tag` followed by whitespace, `>` or `/`, so `<div` doesn't match `<divider`
fn find_open_tag(haystack: &str, open_pat: &str) -> Option<usize> {
    let mut offset = 0;
    while let Some(found) = haystack[offset..].find(open_pat) {
        let at = offset + found;
        let after = haystack[at + open_pat.len()..].chars().next();
        match after {
            Some(c) if c.is_whitespace() || c == '>' || c == '/' => return Some(at),
            _ => offset = at + open_pat.len(),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_roundtrip() {
        let raw = r#"Tom & "Jerry" <3 'cheese'"#;
        let escaped = html_escape(raw);
        assert_eq!(
            escaped,
            "Tom &amp; &quot;Jerry&quot; &lt;3 &#39;cheese&#39;"
        );
        assert_eq!(html_unescape(&escaped), raw);
    }

    #[test]
    fn test_unescape_keeps_literal_entities() {
        // "&amp;lt;" is the escaped form of the literal text "&lt;"
        assert_eq!(html_unescape("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(strip_html("<p>Hello <b>World</b></p>"), "Hello World");
    }

    #[test]
    fn test_find_element_nested() {
        let html = r#"<main><div class="post-content"><div class="note">hi</div><p>x</p></div><div>after</div></main>"#;
        let range = find_element_inner(html, r#"<div class="post-content">"#).unwrap();
        assert_eq!(&html[range], r#"<div class="note">hi</div><p>x</p>"#);
    }

    #[test]
    fn test_find_element_ignores_lookalike_tags() {
        let html = r#"<div class="post-content"><divider></divider>text</div>"#;
        let range = find_element_inner(html, r#"<div class="post-content">"#).unwrap();
        assert_eq!(&html[range], "<divider></divider>text");
    }

    #[test]
    fn test_find_element_unclosed() {
        let html = r#"<div class="post-content"><p>never closed"#;
        assert!(find_element_inner(html, r#"<div class="post-content">"#).is_none());
    }
}
