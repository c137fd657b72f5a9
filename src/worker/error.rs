use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkerError {
    /// The network fetch itself failed (offline, refused, timeout).
    /// Expected during offline use; fetch handling routes this to a
    /// cached response or shell fallback before it reaches a caller.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Nothing cached and the network is unreachable.
    #[error("offline with no cached response for {url}")]
    Offline { url: String },

    #[error("install failed: {0}")]
    InstallFailed(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("unrecognized worker message")]
    InvalidMessage(#[source] serde_json::Error),

    #[error("cache entry is corrupt: {path}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cache I/O error")]
    Io(#[from] std::io::Error),

    #[error("failed to encode cache entry")]
    Encode(#[source] serde_json::Error),
}
