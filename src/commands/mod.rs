//! CLI command implementations

pub mod index;
pub mod init;
pub mod list;
pub mod new;
pub mod wrap;
