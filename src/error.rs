//! Error types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MicrodataError>;

/// Errors surfaced by the decoder, the fetcher and the FFI layer.
///
/// Extraction itself never fails: a `Json` error raised while merging a
/// linked-data block is logged and the block is skipped.
#[derive(Debug, Error)]
pub enum MicrodataError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL {url}: {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("invalid extraction options: {0}")]
    Options(String),
}
