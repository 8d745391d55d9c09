use std::path::PathBuf;

/// Errors that abort the operation that raised them (loading, registry
/// lookup, config parsing). Per-model provider failures are not here;
/// those are recorded as data on the [`QueryResult`](crate::query::QueryResult)
/// so one model's failure never aborts its siblings.
#[derive(Debug, thiserror::Error)]
pub enum LcError {
    #[error("failed to extract text from {path}: {reason}")]
    Extraction { path: PathBuf, reason: String },

    #[error("unknown model: {0}")]
    UnknownModel(String),

    #[error("bad models.toml: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "network")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, LcError>;
