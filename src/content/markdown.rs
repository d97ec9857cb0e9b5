//! Minimal Markdown rendering
//!
//! The CMS emits a small Markdown dialect. Only headings, bold, italic,
//! links, bare URLs, flat bullet lists and inline code are understood; there
//! are no nested or ordered lists, tables or blockquotes.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::borrow::Cow;

lazy_static! {
    /// `<p>## text</p>`, produced when an editor wrapped a heading line
    static ref PARAGRAPH_HEADING: Regex = Regex::new(r"(?s)<p>(#{1,5})\s+(.*?)</p>").unwrap();
    static ref HEADING: Regex = Regex::new(r"(?m)^(#{1,5})[ \t]+(.+)$").unwrap();
    static ref DOUBLE_ESCAPED_BREAK: Regex = Regex::new(r"\\\s*\\\s*\n").unwrap();
    static ref ESCAPED_BREAK: Regex = Regex::new(r"\\\s*\n").unwrap();
    static ref EMPTY_PARAGRAPH: Regex = Regex::new(r"<p>\s*</p>").unwrap();
    static ref BOLD: Regex = Regex::new(r"\*\*(.+?)\*\*").unwrap();
    static ref ITALIC: Regex = Regex::new(r"\*([^*\s][^*\n]*?)\*").unwrap();
    static ref LINK: Regex = Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap();
    static ref BARE_URL: Regex = Regex::new(r"<(https?://[^\s>]+)>").unwrap();
    static ref LIST_ITEM: Regex = Regex::new(r"^\*[ \t]+(\S.*?)\s*$").unwrap();
    static ref INLINE_CODE: Regex = Regex::new(r"`([^`]+)`").unwrap();
    static ref BLOCK_SEPARATOR: Regex = Regex::new(r"\n(?:[ \t]*\n)+").unwrap();
    static ref BLOCK_TAG: Regex = Regex::new(
        r"^(?:</?(?:h[1-6]|p|ul|ol|li|div|pre|blockquote|table|figure|section|aside|details|hr)[\s>/]|<!--)"
    )
    .unwrap();
    /// Existing `<pre>` and `<code>` elements; their text is never rendered
    static ref CODE_SPAN: Regex =
        Regex::new(r"(?is)<pre\b[^>]*>.*?</pre>|<code\b[^>]*>.*?</code>").unwrap();
    static ref CODE_MARKER: Regex = Regex::new(r"\x00([0-9]+)\x00").unwrap();
    static ref OPEN_TAG: Regex = Regex::new(r"(?i)<[a-z][a-z0-9-]*(?:\s[^<>]*)?/?>").unwrap();
}

/// Returns true when `body` contains an HTML element open tag.
///
/// Bodies that pass this check are inserted as-is instead of going through
/// [`MarkdownRenderer::render`]. A bare `<https://...>` URL is not a tag.
/// Mixed content (a few tags in otherwise raw Markdown) is left unconverted.
pub fn looks_like_html(body: &str) -> bool {
    OPEN_TAG.is_match(body)
}

/// Remove `<pre>` and `<code>` elements so only prose is left to inspect
pub(crate) fn without_code(text: &str) -> Cow<'_, str> {
    CODE_SPAN.replace_all(text, "")
}

/// Code elements lifted out of the text while the rules run
struct CodeSpans<'a> {
    spans: Vec<&'a str>,
}

impl<'a> CodeSpans<'a> {
    /// Replace each code element with a numbered marker
    fn mask(text: &'a str) -> (Self, String) {
        let mut spans = Vec::new();
        let mut masked = String::with_capacity(text.len());
        let mut last = 0;
        for m in CODE_SPAN.find_iter(text) {
            masked.push_str(&text[last..m.start()]);
            masked.push_str(&format!("\u{0}{}\u{0}", spans.len()));
            spans.push(m.as_str());
            last = m.end();
        }
        masked.push_str(&text[last..]);
        (CodeSpans { spans }, masked)
    }

    fn get(&self, caps: &Captures) -> Option<&'a str> {
        caps[1].parse::<usize>().ok().and_then(|i| self.spans.get(i).copied())
    }

    fn restore(&self, text: &str) -> String {
        if self.spans.is_empty() {
            return text.to_string();
        }
        CODE_MARKER
            .replace_all(text, |caps: &Captures| {
                self.get(caps).map_or_else(|| caps[0].to_string(), str::to_string)
            })
            .into_owned()
    }

    /// Whether `block` opens with a block element, looking through a leading marker
    fn opens_block(&self, block: &str) -> bool {
        if BLOCK_TAG.is_match(block) {
            return true;
        }
        CODE_MARKER
            .captures(block)
            .filter(|caps| caps.get(0).map_or(false, |m| m.start() == 0))
            .and_then(|caps| self.get(&caps))
            .map_or(false, |span| BLOCK_TAG.is_match(span))
    }
}

/// Markdown renderer for the CMS dialect
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownRenderer;

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self
    }

    /// Render markdown to HTML
    ///
    /// Feeding the output back in is a no-op: blocks that already start with a
    /// block element are not re-wrapped and existing `<li>` lines are not
    /// gathered into another list. `<pre>` and `<code>` elements pass through
    /// byte-for-byte.
    pub fn render(&self, markdown: &str) -> String {
        if markdown.trim().is_empty() {
            return String::new();
        }

        let normalized = markdown.replace("\r\n", "\n");
        let (code, text) = CodeSpans::mask(&normalized);

        // Order matters: headings before emphasis (a `#` line may hold bold
        // text), bold before italic, and emphasis before list markers.
        let text = PARAGRAPH_HEADING.replace_all(&text, |caps: &Captures| {
            let level = caps[1].len();
            format!("<h{level}>{}</h{level}>", caps[2].trim())
        });
        let text = DOUBLE_ESCAPED_BREAK.replace_all(&text, "\n\n");
        let text = ESCAPED_BREAK.replace_all(&text, "\n");
        let text = HEADING.replace_all(&text, |caps: &Captures| {
            let level = caps[1].len();
            format!("<h{level}>{}</h{level}>", caps[2].trim())
        });
        let text = EMPTY_PARAGRAPH.replace_all(&text, "");
        let text = BOLD.replace_all(&text, "<strong>$1</strong>");
        let text = ITALIC.replace_all(&text, "<em>$1</em>");
        let text = LINK.replace_all(&text, r#"<a href="$2">$1</a>"#);
        let text = BARE_URL.replace_all(&text, r#"<a href="$1" target="_blank" rel="noopener">$1</a>"#);
        let text = convert_lists(&text);
        let text = INLINE_CODE.replace_all(&text, "<code>$1</code>");

        code.restore(&wrap_paragraphs(&text, &code))
    }
}

/// Turn `* item` lines into `<li>` and wrap each run in a single `<ul>`.
///
/// Lists are set off by blank lines so they become their own block.
fn convert_lists(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 64);
    let mut in_list = false;

    for line in text.split('\n') {
        match LIST_ITEM.captures(line) {
            Some(caps) => {
                if !in_list {
                    if !out.is_empty() && !out.ends_with("\n\n") {
                        out.push('\n');
                    }
                    out.push_str("<ul>\n");
                    in_list = true;
                }
                out.push_str("<li>");
                out.push_str(&caps[1]);
                out.push_str("</li>\n");
            }
            None => {
                if in_list {
                    out.push_str("</ul>\n\n");
                    in_list = false;
                }
                out.push_str(line);
                out.push('\n');
            }
        }
    }
    if in_list {
        out.push_str("</ul>\n");
    }

    out
}

/// Wrap blank-line separated blocks in `<p>` unless they are block elements
fn wrap_paragraphs(text: &str, code: &CodeSpans) -> String {
    BLOCK_SEPARATOR
        .split(text)
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(|block| {
            if code.opens_block(block) {
                block.to_string()
            } else {
                format!("<p>{}</p>", block)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(md: &str) -> String {
        MarkdownRenderer::new().render(md)
    }

    #[test]
    fn test_bold_and_italic() {
        assert_eq!(
            render("**Hi** *there*"),
            "<p><strong>Hi</strong> <em>there</em></p>"
        );
    }

    #[test]
    fn test_headings() {
        let html = render("# One\n\n### Three\n\n##### Five\n\n###### Six");
        assert!(html.contains("<h1>One</h1>"));
        assert!(html.contains("<h3>Three</h3>"));
        assert!(html.contains("<h5>Five</h5>"));
        // six hashes is not a heading
        assert!(html.contains("<p>###### Six</p>"));
    }

    #[test]
    fn test_heading_inside_paragraph() {
        let html = render("<p>##### <strong>Note</strong></p>");
        assert_eq!(html, "<h5><strong>Note</strong></h5>");
    }

    #[test]
    fn test_heading_with_bold() {
        assert_eq!(render("## **Big**"), "<h2><strong>Big</strong></h2>");
    }

    #[test]
    fn test_escaped_line_breaks() {
        let html = render("first\\\n\\\nsecond\\\nthird");
        assert_eq!(html, "<p>first</p>\n<p>second\nthird</p>");
    }

    #[test]
    fn test_links() {
        let html = render("See [the docs](https://example.com/docs) or <https://example.com>.");
        assert_eq!(
            html,
            r#"<p>See <a href="https://example.com/docs">the docs</a> or <a href="https://example.com" target="_blank" rel="noopener">https://example.com</a>.</p>"#
        );
    }

    #[test]
    fn test_list() {
        let html = render("Intro:\n* one\n* *two*\n\nAfter");
        assert_eq!(
            html,
            "<p>Intro:</p>\n<ul>\n<li>one</li>\n<li><em>two</em></li>\n</ul>\n<p>After</p>"
        );
    }

    #[test]
    fn test_separate_lists() {
        let html = render("* a\n\ntext\n\n* b");
        assert_eq!(html.matches("<ul>").count(), 2);
    }

    #[test]
    fn test_inline_code() {
        assert_eq!(
            render("Run `cargo build` now"),
            "<p>Run <code>cargo build</code> now</p>"
        );
    }

    #[test]
    fn test_lone_asterisks_untouched() {
        assert_eq!(render("2 * 3 * 4"), "<p>2 * 3 * 4</p>");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(render(""), "");
        assert_eq!(render("  \n\n "), "");
    }

    #[test]
    fn test_render_twice_is_stable() {
        let md = "# Title\n\nSome **bold** text.\n\n* one\n* two\n\nA [link](/x) and `code`.";
        let once = render(md);
        let twice = render(&once);
        assert_eq!(once, twice);
        assert!(!twice.contains("<p><p>"));
        assert_eq!(twice.matches("<ul>").count(), 1);
    }

    #[test]
    fn test_code_elements_untouched() {
        let html = "<p>Run this:</p>\n<pre><code>\n# install deps\nls *.rs *.md\n</code></pre>";
        assert_eq!(render(html), html);

        let html = render("Use <code>**kwargs</code> and **bold**");
        assert_eq!(html, "<p>Use <code>**kwargs</code> and <strong>bold</strong></p>");
    }

    #[test]
    fn test_preformatted_block_with_blank_lines() {
        let html = render("Intro\n\n<pre>\n# not a heading\n\n* not a list\n</pre>");
        assert_eq!(
            html,
            "<p>Intro</p>\n<pre>\n# not a heading\n\n* not a list\n</pre>"
        );
    }

    #[test]
    fn test_block_elements_not_wrapped() {
        assert_eq!(
            render("<div class=\"note\">\n**Hi**\n</div>"),
            "<div class=\"note\">\n<strong>Hi</strong>\n</div>"
        );
        assert_eq!(render("<blockquote>quoted</blockquote>"), "<blockquote>quoted</blockquote>");
        assert_eq!(render("<ol>\n<li>x</li>\n</ol>"), "<ol>\n<li>x</li>\n</ol>");

        let html = render("<div class=\"note\">\n\nText\n\n</div>");
        assert_eq!(html, "<div class=\"note\">\n<p>Text</p>\n</div>");
    }

    #[test]
    fn test_looks_like_html() {
        assert!(looks_like_html("<p>hello</p>"));
        assert!(looks_like_html("text <br/> more"));
        assert!(looks_like_html(r#"<div class="x">"#));
        assert!(!looks_like_html("plain **markdown**"));
        assert!(!looks_like_html("visit <https://example.com>"));
        assert!(!looks_like_html("a < b and c > d"));
    }
}
