//! Helper functions shared by the parser, renderer and extractor

mod date;
mod html;

pub use date::*;
pub use html::*;
