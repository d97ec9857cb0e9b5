//! Post loader - discovers post files and turns them into index entries

use anyhow::Result;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{extract_rendered, FrontMatter, PostIndex, PostIndexEntry};
use crate::error::WrapError;
use crate::Site;

/// What a post file currently holds
#[derive(Debug)]
pub enum PostSource<'a> {
    /// CMS document that hasn't been wrapped yet
    FrontMatter { front_matter: FrontMatter, body: &'a str },
    /// Page rendered by an earlier run (or anything else that isn't front matter)
    Rendered(&'a str),
}

impl<'a> PostSource<'a> {
    /// Classify raw file content
    pub fn classify(content: &'a str) -> Self {
        match FrontMatter::parse(content) {
            Some((front_matter, body)) => PostSource::FrontMatter { front_matter, body },
            None => PostSource::Rendered(content),
        }
    }
}

/// Loads posts from the posts directory
pub struct PostLoader<'a> {
    site: &'a Site,
}

impl<'a> PostLoader<'a> {
    /// Create a new post loader
    pub fn new(site: &'a Site) -> Self {
        Self { site }
    }

    /// All `*.html` files directly in the posts directory, minus the template
    /// and excluded names, sorted by file name
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let posts_dir = &self.site.posts_dir;
        if !posts_dir.is_dir() {
            return Err(WrapError::PostsDirMissing(posts_dir.clone()).into());
        }

        let files: Vec<PathBuf> = WalkDir::new(posts_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|path| is_html_file(path))
            .filter(|path| {
                file_name(path)
                    .map(|name| !self.site.config.is_excluded(name))
                    .unwrap_or(false)
            })
            .collect();

        tracing::debug!("Discovered {} post files in {:?}", files.len(), posts_dir);
        Ok(files)
    }

    /// Build the index entry for one file's content
    pub fn index_entry(&self, file_name: &str, content: &str) -> PostIndexEntry {
        let config = &self.site.config;

        match PostSource::classify(content) {
            PostSource::FrontMatter { front_matter, .. } => {
                let date = front_matter.parse_date().unwrap_or_else(|| {
                    if let Some(raw) = &front_matter.date {
                        tracing::warn!("{}: unparseable date {:?}, using current time", file_name, raw);
                    }
                    Utc::now()
                });
                PostIndexEntry::new(
                    file_name,
                    &config.posts_url,
                    front_matter.title().unwrap_or("Untitled").to_string(),
                    date,
                    front_matter.summary().to_string(),
                    front_matter.tags(),
                )
            }
            PostSource::Rendered(html) => {
                let post = extract_rendered(html, &config.site_name);
                PostIndexEntry::new(
                    file_name,
                    &config.posts_url,
                    post.title,
                    post.date,
                    post.summary,
                    post.tags,
                )
            }
        }
    }

    /// Read every post and build the full index.
    ///
    /// Files that vanish or can't be read are skipped with a warning.
    pub fn load_index(&self) -> Result<PostIndex> {
        let mut entries = Vec::new();

        for path in self.discover()? {
            let Some(name) = file_name(&path) else {
                continue;
            };
            match fs::read_to_string(&path) {
                Ok(content) => entries.push(self.index_entry(name, &content)),
                Err(e) => tracing::warn!("Skipping {} - {}", name, e),
            }
        }

        Ok(PostIndex::new(entries))
    }
}

/// Check if a file is an HTML post file
fn is_html_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("html"))
        .unwrap_or(false)
}

/// UTF-8 file name of a path
pub(crate) fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}
