//! Post index models

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::WrapError;
use crate::helpers::serialize_iso;

/// Characters escaped in a URL path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// One post in the blog index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostIndexEntry {
    /// Post title
    pub title: String,

    /// File name without extension
    pub slug: String,

    /// Publication date, written as an ISO 8601 timestamp
    #[serde(serialize_with = "serialize_iso")]
    pub date: DateTime<Utc>,

    /// Short description
    #[serde(default)]
    pub summary: String,

    /// Post tags, never containing empty entries
    #[serde(default)]
    pub tags: Vec<String>,

    /// Site-relative URL of the rendered page
    pub path: String,
}

impl PostIndexEntry {
    /// Create an entry for `file_name`, deriving `slug` and `path` from it
    pub fn new(
        file_name: &str,
        posts_url: &str,
        title: String,
        date: DateTime<Utc>,
        summary: String,
        tags: Vec<String>,
    ) -> Self {
        Self {
            title,
            slug: slug_from_file_name(file_name),
            date,
            summary,
            tags: tags
                .into_iter()
                .map(|tag| tag.trim().to_string())
                .filter(|tag| !tag.is_empty())
                .collect(),
            path: post_path(posts_url, file_name),
        }
    }
}

/// The `index.json` document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostIndex {
    /// Entries, newest first
    #[serde(default)]
    pub items: Vec<PostIndexEntry>,
}

impl PostIndex {
    /// Build an index, sorting entries by date descending (ties by slug)
    pub fn new(mut items: Vec<PostIndexEntry>) -> Self {
        items.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)));
        Self { items }
    }

    /// Pretty-printed JSON with a trailing newline
    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Replace the index file at `path`, creating its directory if needed
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| WrapError::IndexWrite {
                path: path.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, json).map_err(|source| WrapError::IndexWrite {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }

    /// Read an index file; a document without `items` is an empty index
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("reading index {:?}", path))?;
        let index = serde_json::from_str(&content)
            .with_context(|| format!("parsing index {:?}", path))?;
        Ok(index)
    }
}

/// File name without its extension
pub fn slug_from_file_name(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(file_name)
        .to_string()
}

/// Site-relative URL of a post file
pub fn post_path(posts_url: &str, file_name: &str) -> String {
    let encoded = utf8_percent_encode(file_name, PATH_SEGMENT);
    format!("{}/{}", posts_url.trim_end_matches('/'), encoded)
}
