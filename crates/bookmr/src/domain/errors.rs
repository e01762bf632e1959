//! Domain-specific errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a conversion run.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("failed to read bookmarks from {path}: {reason}")]
    SourceRead { path: PathBuf, reason: String },

    #[error("unsupported repo type: {kind} (bookmark '{name}')")]
    UnsupportedRepoKind { kind: String, name: String },

    #[error("failed to query origin of {path}: {detail}")]
    OriginInspection { path: PathBuf, detail: String },

    #[error("cannot express {target} relative to {base}")]
    PathRelativization { base: PathBuf, target: PathBuf },

    #[error("failed to write config output")]
    OutputWrite(#[from] io::Error),
}
