//! List indexed posts

use anyhow::Result;
use std::collections::HashMap;

use crate::content::PostIndex;
use crate::Site;

/// List index content by type
pub fn run(site: &Site, content_type: &str) -> Result<()> {
    if !site.index_path.exists() {
        anyhow::bail!(
            "No index at {:?}. Run `postwrap index` first.",
            site.index_path
        );
    }
    let index = PostIndex::load(&site.index_path)?;

    match content_type {
        "post" | "posts" => {
            println!("Posts ({}):", index.items.len());
            for post in &index.items {
                println!(
                    "  {} - {} [{}]",
                    post.date.format("%Y-%m-%d"),
                    post.title,
                    post.path
                );
            }
        }
        "tag" | "tags" => {
            let mut tags: HashMap<&str, usize> = HashMap::new();
            for post in &index.items {
                for tag in &post.tags {
                    *tags.entry(tag.as_str()).or_insert(0) += 1;
                }
            }
            println!("Tags ({}):", tags.len());
            let mut tags: Vec<_> = tags.into_iter().collect();
            tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
            for (tag, count) in tags {
                println!("  {} ({})", tag, count);
            }
        }
        _ => {
            anyhow::bail!("Unknown type: {}. Available: post, tag", content_type);
        }
    }

    Ok(())
}
