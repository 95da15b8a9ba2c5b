use std::path::PathBuf;
use thiserror::Error;

use crate::capture::{CaptureError, StorageError};
use crate::geom::InvalidBoundingBox;
use crate::media::{MediaError, ProbeError};

/// The main error type for freshcrop operations.
#[derive(Debug, Error)]
pub enum FreshcropError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse pipeline config from {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid pipeline config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error("Invalid bounding box: {0}")]
    InvalidBoundingBox(#[from] InvalidBoundingBox),

    #[error("Invalid --bbox value '{value}': {message}")]
    BoundingBoxArg { value: String, message: String },

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("Invalid storage path: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to read detection reply from {path}: {source}")]
    DetectionsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write JSON output: {0}")]
    JsonOutput(#[source] serde_json::Error),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}
