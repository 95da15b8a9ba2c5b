use std::io;

use thiserror::Error;

use super::probe::ProbeError;
use super::reference::OutputFormat;
use crate::geom::{CropRegion, Dimensions};

/// Failures inside a single compress or crop call.
///
/// These never escape the public pipeline stages: the compressor turns them
/// into a `failure_reason` and the cropper into a missing thumbnail. The
/// fallible building blocks return them so callers that want detail (the
/// CLI, tests) can see it.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error("Failed to read image {reference}: {source}")]
    Read {
        reference: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Failed to encode {format} image: {source}")]
    Encode {
        format: OutputFormat,
        #[source]
        source: image::ImageError,
    },

    #[error("Invalid compression options: {0}")]
    InvalidOptions(String),

    #[error("Thumbnail size must be positive")]
    InvalidTargetSize,

    #[error("Bounding box produces an empty crop on a {0} image")]
    EmptyCropRegion(Dimensions),

    #[error("Crop region {region:?} does not fit the decoded {actual} image")]
    RegionOutOfBounds {
        region: CropRegion,
        actual: Dimensions,
    },

    #[error("Image worker failed: {0}")]
    Worker(String),
}
