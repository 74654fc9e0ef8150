use std::path::PathBuf;

use thiserror::Error;

/// Failures of the I/O surfaces. The layout core itself never fails.
#[derive(Debug, Error)]
pub enum SkillTreeError {
    #[error("I/O error: {source} (path: {path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("failed to parse {what}: {message}")]
    Parse { what: &'static str, message: String },

    #[error("failed to serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        source: serde_json::Error,
    },
}
