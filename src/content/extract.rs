//! Recover index fields from posts that were already wrapped into HTML

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;

use crate::helpers::{html_escape, html_unescape, parse_date_string, strip_html};

lazy_static! {
    static ref TITLE: Regex = Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap();
    static ref POST_TITLE: Regex =
        Regex::new(r#"(?is)<h1[^>]*class="post-title"[^>]*>(.*?)</h1>"#).unwrap();
    static ref SPAN: Regex = Regex::new(r"(?is)<span[^>]*>.*?</span>").unwrap();
    static ref TIME_DATETIME: Regex =
        Regex::new(r#"(?is)<time[^>]*\sdatetime="([^"]+)""#).unwrap();
    static ref DISPLAY_DATE: Regex =
        Regex::new(r"<span>\s*([A-Za-z]+ \d{1,2}, \d{4})\s*</span>").unwrap();
    static ref META_DESCRIPTION: Regex =
        Regex::new(r#"(?is)<meta\s+name="description"\s+content="([^"]*)"\s*/?>"#).unwrap();
    static ref TAG: Regex = Regex::new(r#"(?is)<span class="tag">(.*?)</span>"#).unwrap();
}

/// Fields recovered from a rendered page
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedPost {
    pub title: String,
    pub date: DateTime<Utc>,
    pub summary: String,
    pub tags: Vec<String>,
}

/// Pull title, date, summary and tags out of a rendered page.
///
/// Never fails: anything missing falls back to `Untitled`, the current time,
/// an empty summary or no tags.
pub fn extract_rendered(html: &str, site_name: &str) -> ExtractedPost {
    let title = extract_title(html, site_name).unwrap_or_else(|| {
        tracing::debug!("No title found, using \"Untitled\"");
        "Untitled".to_string()
    });

    let date = extract_date(html).unwrap_or_else(|| {
        tracing::debug!("No date found for {:?}, using current time", title);
        Utc::now()
    });

    let summary = META_DESCRIPTION
        .captures(html)
        .map(|caps| html_unescape(caps[1].trim()))
        .unwrap_or_default();

    let tags = TAG
        .captures_iter(html)
        .map(|caps| html_unescape(strip_html(&caps[1]).trim()))
        .filter(|tag| !tag.is_empty())
        .collect();

    ExtractedPost {
        title,
        date,
        summary,
        tags,
    }
}

fn extract_title(html: &str, site_name: &str) -> Option<String> {
    let from_title = TITLE
        .captures(html)
        .map(|caps| strip_site_suffix(caps[1].trim(), site_name).to_string());
    let from_heading = || POST_TITLE.captures(html).map(|caps| caps[1].to_string());

    from_title
        .filter(|t| !clean_title(t).is_empty())
        .or_else(from_heading)
        .map(|t| clean_title(&t))
        .filter(|t| !t.is_empty())
}

/// Drop inner `<span>` elements (icons, badges) and any other markup
fn clean_title(raw: &str) -> String {
    let without_spans = SPAN.replace_all(raw, "");
    html_unescape(strip_html(&without_spans).trim())
}

/// `title` is still escaped, so the site name is matched in escaped form first
fn strip_site_suffix<'a>(title: &'a str, site_name: &str) -> &'a str {
    if site_name.is_empty() {
        return title;
    }
    let escaped = html_escape(site_name);
    for name in [escaped.as_str(), site_name] {
        for sep in [" — ", " - ", " | "] {
            if let Some(stripped) = title.strip_suffix(&format!("{sep}{name}")) {
                return stripped.trim_end();
            }
        }
    }
    title
}

fn extract_date(html: &str) -> Option<DateTime<Utc>> {
    TIME_DATETIME
        .captures(html)
        .and_then(|caps| parse_date_string(&caps[1]))
        .or_else(|| {
            DISPLAY_DATE
                .captures(html)
                .and_then(|caps| parse_date_string(&caps[1]))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Shipping &amp; Handling — Lamide</title>
  <meta name="description" content="Notes on &quot;shipping&quot;" />
</head>
<body>
  <h1 class="post-title">Shipping &amp; Handling</h1>
  <div class="post-meta"><time datetime="2025-03-15T00:00:00.000Z">March 15, 2025</time></div>
  <div class="post-tags"><span class="tag">product</span><span class="tag"> </span><span class="tag">ai</span></div>
  <div class="post-content"><p>Body</p></div>
</body>
</html>"#;

    #[test]
    fn test_extract_full_page() {
        let post = extract_rendered(PAGE, "Lamide");
        assert_eq!(post.title, "Shipping & Handling");
        assert_eq!(
            post.date.format("%Y-%m-%d").to_string(),
            "2025-03-15"
        );
        assert_eq!(post.summary, r#"Notes on "shipping""#);
        assert_eq!(post.tags, vec!["product", "ai"]);
    }

    #[test]
    fn test_legacy_page_layout() {
        let html = r#"<title>Welcome to the Blog — Lamide</title>
<meta name="description" content="An introduction"/>
<div class="post-meta"><span>January 15, 2025</span></div>"#;
        let post = extract_rendered(html, "Lamide");
        assert_eq!(post.title, "Welcome to the Blog");
        assert_eq!(post.date.format("%Y-%m-%d").to_string(), "2025-01-15");
        assert_eq!(post.summary, "An introduction");
    }

    #[test]
    fn test_heading_fallback_strips_spans() {
        let html = r#"<h1 class="post-title"><span class="icon">*</span> Launch day</h1>"#;
        let post = extract_rendered(html, "Lamide");
        assert_eq!(post.title, "Launch day");
    }

    #[test]
    fn test_missing_everything_degrades() {
        let before = Utc::now();
        let post = extract_rendered("not html at all", "Lamide");
        assert_eq!(post.title, "Untitled");
        assert!(post.date >= before);
        assert_eq!(post.summary, "");
        assert!(post.tags.is_empty());
    }

    #[test]
    fn test_escaped_site_name_suffix() {
        let html = "<title>Hello — Tom &amp; Jerry</title>";
        assert_eq!(extract_rendered(html, "Tom & Jerry").title, "Hello");

        let html = "<title>Quotes &amp; more | &quot;Q&quot; &lt;Blog&gt;</title>";
        assert_eq!(extract_rendered(html, "\"Q\" <Blog>").title, "Quotes & more");
    }

    #[test]
    fn test_no_tag_spans_yields_empty_list() {
        let html = "<title>Only a title</title>";
        let post = extract_rendered(html, "");
        assert_eq!(post.title, "Only a title");
        assert_eq!(post.tags, Vec::<String>::new());
    }
}
