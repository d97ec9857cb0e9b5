//! postwrap: wraps CMS-authored blog posts into static HTML pages
//!
//! Posts live in a single directory as `*.html` files. Files that still start
//! with a `---` front-matter block are rendered through a page template and
//! overwritten in place; afterwards the whole directory is re-read to rebuild
//! the JSON post index consumed by the blog listing page.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod helpers;
pub mod templates;

pub use error::WrapError;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Name of the optional configuration file in the base directory
pub const CONFIG_FILE: &str = "_config.yml";

/// A site checkout the tool operates on
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Directory holding the post files
    pub posts_dir: PathBuf,
    /// Page template used to wrap posts
    pub template_path: PathBuf,
    /// Output JSON index
    pub index_path: PathBuf,
}

impl Site {
    /// Create a new site from a directory, reading `_config.yml` if present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(CONFIG_FILE);

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create a site with an explicit configuration
    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let posts_dir = base_dir.join(&config.posts_dir);
        let template_path = base_dir.join(&config.template);
        let index_path = base_dir.join(&config.index_path);

        Self {
            config,
            base_dir,
            posts_dir,
            template_path,
            index_path,
        }
    }

    /// Wrap pending posts, repair stray markdown and rebuild the index
    pub fn wrap(&self, options: commands::wrap::WrapOptions) -> Result<commands::wrap::BatchReport> {
        commands::wrap::run(self, options)
    }

    /// Rebuild the index without touching post files
    pub fn rebuild_index(&self) -> Result<content::PostIndex> {
        commands::index::run(self)
    }
}
