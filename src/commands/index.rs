//! Rebuild the post index

use anyhow::Result;

use crate::content::{PostIndex, PostLoader};
use crate::Site;

/// Re-read every post and rewrite the index file
pub fn run(site: &Site) -> Result<PostIndex> {
    let index = PostLoader::new(site).load_index()?;
    index.save(&site.index_path)?;
    tracing::info!(
        "Updated {:?} with {} posts",
        site.index_path,
        index.items.len()
    );
    Ok(index)
}
