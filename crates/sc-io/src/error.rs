//! Error types for the IO collaborators.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from persistence and export. None of these reach the canvas
/// interaction path; callers surface them as non-blocking notifications.
#[derive(Error, Debug)]
pub enum IoError {
    /// Filesystem failure while reading or writing a snapshot.
    #[error("storage I/O failed at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot bytes did not decode.
    #[error("snapshot decode failed: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    /// Snapshot failed to encode.
    #[error("snapshot encode failed: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// Export serialization failure.
    #[error("export serialization failed: {0}")]
    Export(#[from] serde_json::Error),

    /// Text generation failed or was refused by the backend.
    #[error("text generation failed: {0}")]
    Generation(String),
}
