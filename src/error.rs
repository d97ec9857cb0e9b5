//! Fatal errors that abort a run
//!
//! Anything that only affects a single post is logged and skipped instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WrapError {
    #[error("template file not found: {0:?}")]
    TemplateMissing(PathBuf),

    #[error("posts directory not found: {0:?}")]
    PostsDirMissing(PathBuf),

    #[error("failed to write index {path:?}: {source}")]
    IndexWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
