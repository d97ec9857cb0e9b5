//! Front-matter parsing
//!
//! Posts written by the CMS start with a `---` delimited block of flat
//! `key: value` lines. Values may be quoted. Lists are written inline as
//! `[a, b]` or as `- item` lines under a key with no value.
//! This is deliberately not YAML: nested structures are not supported and
//! lines that don't look like `key: value` are ignored.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::helpers::parse_date_string;

const DELIMITER: &str = "---";

/// A front-matter value: either a plain string or a `[...]` list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetaValue {
    Text(String),
    List(Vec<String>),
}

impl MetaValue {
    /// Parse the raw text to the right of `key:`
    fn parse(raw: &str) -> Self {
        let value = strip_quotes(raw.trim());

        if value.len() >= 2 && value.starts_with('[') && value.ends_with(']') {
            let inner = &value[1..value.len() - 1];
            if inner.trim().is_empty() {
                return MetaValue::List(Vec::new());
            }
            let items = inner
                .split(',')
                .map(|item| {
                    item.trim()
                        .trim_matches(|c| c == '"' || c == '\'')
                        .trim()
                        .to_string()
                })
                .collect();
            return MetaValue::List(items);
        }

        MetaValue::Text(value.to_string())
    }

    /// Flatten to a single string (lists are joined with ", ")
    fn into_text(self) -> String {
        match self {
            MetaValue::Text(text) => text,
            MetaValue::List(items) => items.join(", "),
        }
    }

    /// Interpret as a list; a bare string is a one-element list
    fn into_list(self) -> Vec<String> {
        match self {
            MetaValue::List(items) => items,
            MetaValue::Text(text) if text.trim().is_empty() => Vec::new(),
            MetaValue::Text(text) => vec![text],
        }
    }

    fn to_source(&self) -> String {
        match self {
            MetaValue::Text(text) => serialize_text(text),
            MetaValue::List(items) => {
                let items: Vec<String> = items
                    .iter()
                    .map(|item| {
                        if item.is_empty() {
                            "\"\"".to_string()
                        } else {
                            item.clone()
                        }
                    })
                    .collect();
                format!("[{}]", items.join(", "))
            }
        }
    }
}

/// Front-matter data from a CMS post
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub date: Option<String>,
    pub summary: Option<String>,
    /// Raw tag list as written; may contain empty entries, see [`FrontMatter::tags`]
    pub tags: Option<Vec<String>>,

    /// Unrecognized keys, kept in source order
    #[serde(flatten)]
    pub extra: IndexMap<String, MetaValue>,
}

impl FrontMatter {
    /// Split `content` into front-matter and body.
    ///
    /// Returns `None` when the content doesn't open with a `---` line or the
    /// block is never closed; callers treat such files as rendered HTML.
    pub fn parse(content: &str) -> Option<(Self, &str)> {
        let mut lines = content.split_inclusive('\n');
        let first = lines.next()?;
        if first.trim_end() != DELIMITER || !first.ends_with('\n') {
            return None;
        }

        let block_start = first.len();
        let mut offset = block_start;
        for line in lines {
            if line.trim_end() == DELIMITER {
                let block = &content[block_start..offset];
                let body = &content[offset + line.len()..];
                return Some((Self::parse_block(block), body));
            }
            offset += line.len();
        }

        None
    }

    fn parse_block(block: &str) -> Self {
        let mut entries: IndexMap<String, MetaValue> = IndexMap::new();
        // key whose value was left empty, so `- item` lines below belong to it
        let mut open_key: Option<String> = None;

        for line in block.lines() {
            if let Some(item) = dash_item(line) {
                if let Some(value) = open_key.as_ref().and_then(|key| entries.get_mut(key)) {
                    match value {
                        MetaValue::List(items) => items.push(item),
                        MetaValue::Text(_) => *value = MetaValue::List(vec![item]),
                    }
                }
                continue;
            }
            open_key = None;

            let Some((key, raw_value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            if raw_value.trim().is_empty() {
                open_key = Some(key.to_string());
            }
            entries.insert(key.to_string(), MetaValue::parse(raw_value));
        }

        let mut fm = FrontMatter::default();
        for (key, value) in entries {
            match key.as_str() {
                "title" => fm.title = Some(value.into_text()),
                "date" => fm.date = Some(value.into_text()),
                "summary" => fm.summary = Some(value.into_text()),
                "tags" => fm.tags = Some(value.into_list()),
                _ => {
                    fm.extra.insert(key, value);
                }
            }
        }

        fm
    }

    /// Serialize back to a `---` delimited block (with trailing newline)
    pub fn to_block(&self) -> String {
        let mut out = String::from(DELIMITER);
        out.push('\n');

        let mut push = |key: &str, value: String| {
            out.push_str(key);
            out.push(':');
            if !value.is_empty() {
                out.push(' ');
                out.push_str(&value);
            }
            out.push('\n');
        };

        if let Some(title) = &self.title {
            push("title", serialize_text(title));
        }
        if let Some(date) = &self.date {
            push("date", serialize_text(date));
        }
        if let Some(summary) = &self.summary {
            push("summary", serialize_text(summary));
        }
        if let Some(tags) = &self.tags {
            push("tags", MetaValue::List(tags.clone()).to_source());
        }
        for (key, value) in &self.extra {
            push(key.as_str(), value.to_source());
        }

        out.push_str(DELIMITER);
        out.push('\n');
        out
    }

    /// Non-empty title, if any
    pub fn title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|title| !title.is_empty())
    }

    /// Trimmed summary, empty when absent
    pub fn summary(&self) -> &str {
        self.summary.as_deref().map(str::trim).unwrap_or_default()
    }

    /// Tags with empty and whitespace-only entries dropped
    pub fn tags(&self) -> Vec<String> {
        self.tags
            .iter()
            .flatten()
            .map(|tag| tag.trim())
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Parse the date string into a DateTime
    pub fn parse_date(&self) -> Option<DateTime<Utc>> {
        self.date.as_deref().and_then(parse_date_string)
    }
}

/// The item of a `- item` line, unquoted
fn dash_item(line: &str) -> Option<String> {
    let line = line.trim();
    if line == "-" {
        return Some(String::new());
    }
    line.strip_prefix("- ")
        .map(|item| strip_quotes(item.trim()).to_string())
}

/// Remove one layer of matching single or double quotes
fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Quote a text value when writing it bare would change how it parses back
fn serialize_text(text: &str) -> String {
    let needs_quotes = text != text.trim()
        || text.starts_with(['"', '\'', '['])
        || text.contains('\n');
    if needs_quotes {
        format!("\"{}\"", text.replace('\n', " "))
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frontmatter() {
        let content = r#"---
title: Hello World
date: 2025-01-15
summary: "A first post: with a colon"
tags: [announcement, blog]
layout: post
---

This is the content.
"#;

        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title(), Some("Hello World"));
        assert_eq!(fm.date.as_deref(), Some("2025-01-15"));
        assert_eq!(fm.summary(), "A first post: with a colon");
        assert_eq!(fm.tags(), vec!["announcement", "blog"]);
        assert_eq!(
            fm.extra.get("layout"),
            Some(&MetaValue::Text("post".to_string()))
        );
        assert_eq!(body, "\nThis is the content.\n");
    }

    #[test]
    fn test_empty_tags_dropped() {
        let content = "---\ntags: [announcement, \"\", blog]\n---\nbody";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(
            fm.tags,
            Some(vec![
                "announcement".to_string(),
                String::new(),
                "blog".to_string()
            ])
        );
        assert_eq!(fm.tags(), vec!["announcement", "blog"]);
    }

    #[test]
    fn test_single_quoted_values() {
        let content = "---\ntitle: 'It''s fine'\ntags: ['a', ' b ']\n---\n";
        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title(), Some("It''s fine"));
        assert_eq!(fm.tags(), vec!["a", "b"]);
        assert_eq!(body, "");
    }

    #[test]
    fn test_single_string_tag() {
        let content = "---\ntags: Notes\n---\n";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.tags(), vec!["Notes"]);
    }

    #[test]
    fn test_empty_list_and_empty_value() {
        let content = "---\ntags: []\nsummary:\n---\n";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.tags, Some(Vec::new()));
        assert_eq!(fm.summary.as_deref(), Some(""));
        assert!(fm.tags().is_empty());
    }

    #[test]
    fn test_crlf_line_endings() {
        let content = "---\r\ntitle: Windows\r\n---\r\nBody\r\n";
        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title(), Some("Windows"));
        assert_eq!(body, "Body\r\n");
    }

    #[test]
    fn test_not_front_matter() {
        assert!(FrontMatter::parse("<!DOCTYPE html>\n<html></html>").is_none());
        assert!(FrontMatter::parse("").is_none());
        // delimiter must be the whole line
        assert!(FrontMatter::parse("----\ntitle: x\n----\n").is_none());
        assert!(FrontMatter::parse("--- title: x\n---\n").is_none());
    }

    #[test]
    fn test_unclosed_block_is_not_front_matter() {
        let content = "---\ntitle: Never closed\n\nSome text";
        assert!(FrontMatter::parse(content).is_none());
    }

    #[test]
    fn test_body_may_contain_delimiters() {
        let content = "---\ntitle: x\n---\nabove\n---\nbelow\n";
        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title(), Some("x"));
        assert_eq!(body, "above\n---\nbelow\n");
    }

    #[test]
    fn test_lines_without_key_ignored() {
        let content = "---\ntitle: x\njust prose\n: no key\n  - stray item\n---\n";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title(), Some("x"));
        assert!(fm.extra.is_empty());
    }

    #[test]
    fn test_dash_lists() {
        let content = "---\ntags:\n  - ai\n  - \"product\"\n-\ntitle: Lists\nseries:\n- one\n- two\nempty:\n---\n";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(
            fm.tags,
            Some(vec!["ai".to_string(), "product".to_string(), String::new()])
        );
        assert_eq!(fm.tags(), vec!["ai", "product"]);
        assert_eq!(fm.title(), Some("Lists"));
        assert_eq!(
            fm.extra.get("series"),
            Some(&MetaValue::List(vec!["one".to_string(), "two".to_string()]))
        );
        assert_eq!(fm.extra.get("empty"), Some(&MetaValue::Text(String::new())));
    }

    #[test]
    fn test_dash_list_roundtrip() {
        let (fm, _) = FrontMatter::parse("---\ntags:\n  - ai\n  - blog\n---\n").unwrap();
        let (reparsed, _) = FrontMatter::parse(&fm.to_block()).unwrap();
        assert_eq!(reparsed, fm);
        assert_eq!(fm.to_block(), "---\ntags: [ai, blog]\n---\n");
    }

    #[test]
    fn test_parse_date() {
        let content = "---\ndate: 2024-12-20\n---\n";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        let dt = fm.parse_date().unwrap();
        assert_eq!(dt.format("%Y-%m-%d").to_string(), "2024-12-20");

        let (missing, _) = FrontMatter::parse("---\ntitle: x\n---\n").unwrap();
        assert!(missing.parse_date().is_none());
    }

    #[test]
    fn test_block_roundtrip() {
        let inputs = [
            "---\ntitle: Hello\ndate: 2025-01-01\nsummary: Short\ntags: [a, b]\n---\n",
            "---\ntags: [announcement, \"\", blog]\nauthor: me\nseries: [one, two]\n---\n",
            "---\ntitle: \"  padded  \"\nsummary: \"[not a list]\"\nurl: https://example.com/x\n---\n",
            "---\ntitle: '\"quoted\"'\ntags: []\nempty:\n---\n",
            "---\ncover: \"'half\n---\n",
        ];

        for input in inputs {
            let (fm, _) = FrontMatter::parse(input).unwrap();
            let block = fm.to_block();
            let (reparsed, body) = FrontMatter::parse(&block)
                .unwrap_or_else(|| panic!("serialized block did not parse: {block:?}"));
            assert_eq!(reparsed, fm, "roundtrip changed {input:?} via {block:?}");
            assert_eq!(body, "");
        }
    }
}
