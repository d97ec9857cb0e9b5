//! Post page template with named `{{ placeholder }}` slots
//!
//! Placeholders are resolved in a single pass, so text inserted for one slot
//! is never scanned for further placeholders.

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::WrapError;
use crate::helpers::html_escape;

/// Template written by `postwrap init`
pub const DEFAULT_TEMPLATE: &str = include_str!("post.html");

/// Every placeholder a template may use
pub const PLACEHOLDERS: &[&str] = &[
    "title",
    "summary",
    "date",
    "date_iso",
    "tags",
    "content",
    "slug",
    "path",
    "site_name",
];

/// Placeholders a post page can't do without
const REQUIRED: &[&str] = &["title", "content"];

lazy_static! {
    static ref PLACEHOLDER: Regex =
        Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").unwrap();
}

/// Values substituted into the template for one post
#[derive(Debug, Clone, Default)]
pub struct PostContext {
    pub title: String,
    pub summary: String,
    /// Display form, e.g. "March 15, 2025"
    pub date: String,
    pub date_iso: String,
    pub tags: Vec<String>,
    /// Rendered HTML body
    pub content: String,
    pub slug: String,
    pub path: String,
    pub site_name: String,
}

impl PostContext {
    /// Resolve a placeholder; text is escaped, `tags` and `content` are markup
    fn resolve(&self, name: &str) -> Option<String> {
        let value = match name {
            "title" => html_escape(&self.title),
            "summary" => html_escape(&self.summary),
            "date" => html_escape(&self.date),
            "date_iso" => html_escape(&self.date_iso),
            "slug" => html_escape(&self.slug),
            "path" => html_escape(&self.path),
            "site_name" => html_escape(&self.site_name),
            "tags" => tag_markup(&self.tags),
            "content" => self.content.trim().to_string(),
            _ => return None,
        };
        Some(value)
    }
}

/// `<span class="tag">` markup for each tag
pub fn tag_markup(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .map(|tag| format!(r#"<span class="tag">{}</span>"#, html_escape(tag)))
        .collect()
}

/// A loaded post template
#[derive(Debug, Clone)]
pub struct PostTemplate {
    path: PathBuf,
    source: String,
}

impl PostTemplate {
    /// Load the template file; a missing file is fatal
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(WrapError::TemplateMissing(path.to_path_buf()).into());
        }
        let source = fs::read_to_string(path)
            .with_context(|| format!("reading template {:?}", path))?;
        let template = Self::from_source(path, source);
        template.check();
        Ok(template)
    }

    /// Build a template from an in-memory string
    pub fn from_source(path: impl Into<PathBuf>, source: String) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }

    /// Placeholder names used by the template, sorted and deduplicated
    pub fn placeholders(&self) -> BTreeSet<String> {
        PLACEHOLDER
            .captures_iter(&self.source)
            .map(|caps| caps[1].to_string())
            .collect()
    }

    /// Warn about unknown placeholders and missing required ones
    fn check(&self) {
        let used = self.placeholders();
        for name in &used {
            if !PLACEHOLDERS.contains(&name.as_str()) {
                tracing::warn!(
                    "Template {:?} uses unknown placeholder {{{{ {} }}}}, it will be left as-is",
                    self.path,
                    name
                );
            }
        }
        for name in REQUIRED {
            if !used.contains(*name) {
                tracing::warn!(
                    "Template {:?} has no {{{{ {} }}}} placeholder",
                    self.path,
                    name
                );
            }
        }
    }

    /// Render a full page for one post
    pub fn render(&self, ctx: &PostContext) -> String {
        PLACEHOLDER
            .replace_all(&self.source, |caps: &Captures| {
                ctx.resolve(&caps[1]).unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}
