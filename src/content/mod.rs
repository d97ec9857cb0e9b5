//! Content module - front matter, markdown, rendered-page extraction and the post index

mod extract;
mod frontmatter;
pub mod loader;
mod markdown;
mod post;
mod repair;

pub use extract::{extract_rendered, ExtractedPost};
pub use frontmatter::{FrontMatter, MetaValue};
pub use loader::{PostLoader, PostSource};
pub use markdown::{looks_like_html, MarkdownRenderer};
pub use post::{post_path, slug_from_file_name, PostIndex, PostIndexEntry};
pub use repair::{repair_rendered, POST_CONTENT_OPENER};
