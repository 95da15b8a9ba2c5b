//! Header-only dimension probing.

use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use super::reference::ImageReference;
use crate::geom::Dimensions;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Failed to read image dimensions from {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: imagesize::ImageError,
    },

    #[error("Failed to read image dimensions from blob: {0}")]
    Blob(#[source] imagesize::ImageError),

    #[error("Image reports unusable dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
}

/// Reads the pixel dimensions of an encoded image without decoding pixels.
///
/// Works for both file and in-memory references; only the container header
/// is inspected.
pub fn probe(reference: &ImageReference) -> Result<Dimensions, ProbeError> {
    let size = match reference {
        ImageReference::File(path) => {
            imagesize::size(path).map_err(|source| ProbeError::File {
                path: path.clone(),
                source,
            })?
        }
        ImageReference::Blob(bytes) => imagesize::blob_size(bytes).map_err(ProbeError::Blob)?,
    };

    let invalid = || ProbeError::InvalidDimensions {
        width: size.width,
        height: size.height,
    };
    let width: u32 = size.width.try_into().map_err(|_| invalid())?;
    let height: u32 = size.height.try_into().map_err(|_| invalid())?;
    let dims = Dimensions::new(width, height).ok_or_else(invalid)?;

    debug!(reference = %reference, dims = %dims, "probed image");
    Ok(dims)
}
