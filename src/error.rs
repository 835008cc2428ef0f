//! Host-level errors.

use canvas::comment::CommentError;

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("missing required env var {0}")]
    MissingEnv(&'static str),
    #[error("io failed on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("comment persistence failed: {0}")]
    Comment(#[from] CommentError),
}

impl HostError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io { path: path.display().to_string(), source }
    }
}
