//! Site loading errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading a site manifest.
#[derive(Debug, Error)]
pub enum SiteError {
    /// The manifest file could not be read.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not valid JSON for the expected shape.
    #[error("Invalid manifest: {source}")]
    Parse {
        #[from]
        source: serde_json::Error,
    },
}
