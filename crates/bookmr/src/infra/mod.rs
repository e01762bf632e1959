//! Infrastructure adapters for IO, git, config, and platform paths.

pub mod config;
pub mod git;
pub mod paths;
pub mod source;
pub mod writer;
