//! Create a new front-matter post

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::content::FrontMatter;
use crate::Site;

/// Create `<slug>.html` in the posts directory with a front-matter scaffold.
///
/// The file is picked up and wrapped by the next `postwrap wrap`.
pub fn create_post(site: &Site, title: &str, tags: &[String]) -> Result<PathBuf> {
    let slug = slug::slugify(title);
    if slug.is_empty() {
        anyhow::bail!("Title {:?} doesn't produce a usable file name", title);
    }

    fs::create_dir_all(&site.posts_dir)?;
    let file_path = site.posts_dir.join(format!("{}.html", slug));

    // Check if file already exists
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let front_matter = FrontMatter {
        title: Some(title.to_string()),
        date: Some(chrono::Utc::now().format("%Y-%m-%d").to_string()),
        summary: Some(String::new()),
        tags: Some(tags.to_vec()),
        ..Default::default()
    };
    let content = format!("{}\nWrite your post here.\n", front_matter.to_block());

    fs::write(&file_path, content)?;
    tracing::info!("Created {:?}", file_path);

    Ok(file_path)
}
