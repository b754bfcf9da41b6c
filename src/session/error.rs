use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while saving, loading or transferring sessions.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed session data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported session version {found} (newest supported is {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Session '{0}' not found")]
    NotFound(String),

    #[error("Invalid session name: {0:?}")]
    InvalidName(String),
}

impl SessionError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
