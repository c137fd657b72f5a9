use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Backing storage could not be initialized. Distinct from a missing
    /// record; callers retry once the underlying directory is available.
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("records file is corrupt: {path}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("store I/O error")]
    Io(#[from] std::io::Error),

    #[error("failed to encode records")]
    Encode(#[source] serde_json::Error),
}
