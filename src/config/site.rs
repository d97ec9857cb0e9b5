//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub site_name: String,

    // Directory
    pub posts_dir: String,
    pub template: String,
    pub index_path: String,
    #[serde(default)]
    pub exclude: Vec<String>,

    // URL
    pub posts_url: String,

    // Date format (chrono strftime) used for the displayed publish date
    pub date_format: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_name: "Lamide".to_string(),

            posts_dir: "blog/posts".to_string(),
            template: "blog/posts/template.html".to_string(),
            index_path: "blog/index.json".to_string(),
            exclude: Vec::new(),

            posts_url: "/blog/posts/".to_string(),

            date_format: "%B %-d, %Y".to_string(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("reading config {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing config {:?}", path))?;
        Ok(config)
    }

    /// File name of the template, used to keep it out of wrapping and indexing
    pub fn template_file_name(&self) -> Option<&str> {
        Path::new(&self.template)
            .file_name()
            .and_then(|name| name.to_str())
    }

    /// Whether a post file name should be ignored by the batch
    pub fn is_excluded(&self, file_name: &str) -> bool {
        self.template_file_name() == Some(file_name)
            || self.exclude.iter().any(|name| name == file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.posts_dir, "blog/posts");
        assert_eq!(config.index_path, "blog/index.json");
        assert_eq!(config.template_file_name(), Some("template.html"));
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
site_name: My Blog
posts_dir: content/posts
exclude:
  - draft.html
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.site_name, "My Blog");
        assert_eq!(config.posts_dir, "content/posts");
        // untouched fields keep their defaults
        assert_eq!(config.posts_url, "/blog/posts/");
        assert!(config.is_excluded("draft.html"));
        assert!(config.is_excluded("template.html"));
        assert!(!config.is_excluded("hello.html"));
    }
}
