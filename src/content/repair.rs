//! Re-render raw Markdown left inside already-wrapped pages
//!
//! Older runs inserted HTML-looking bodies verbatim, so a page could end up
//! with `## heading` or `* item` lines inside its post content.

use lazy_static::lazy_static;
use regex::Regex;

use super::markdown::without_code;
use super::MarkdownRenderer;
use crate::helpers::find_element_inner;

/// Opening tag of the element holding the post body
pub const POST_CONTENT_OPENER: &str = r#"<div class="post-content">"#;

lazy_static! {
    static ref RAW_MARKDOWN: Regex =
        Regex::new(r"(?m)^#{1,5}[ \t]+\S|^\*[ \t]+\S|<p>#{1,5}\s|<https?://").unwrap();
}

/// Returns the page with its post content re-rendered, or `None` when the
/// content holds no raw Markdown (or the page has no post content element).
/// Text inside `<pre>` and `<code>` never counts as Markdown.
pub fn repair_rendered(html: &str, renderer: &MarkdownRenderer) -> Option<String> {
    let range = find_element_inner(html, POST_CONTENT_OPENER)?;
    let inner = html[range.clone()].trim();

    if !RAW_MARKDOWN.is_match(&without_code(inner)) {
        return None;
    }

    let converted = renderer.render(inner);
    if converted == inner {
        return None;
    }

    let mut repaired = String::with_capacity(html.len() + converted.len());
    repaired.push_str(&html[..range.start]);
    repaired.push_str("\n        ");
    repaired.push_str(&converted);
    repaired.push_str("\n      ");
    repaired.push_str(&html[range.end..]);
    Some(repaired)
}
