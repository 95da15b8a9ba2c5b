//! Square thumbnails cropped around detected items.
//!
//! The public entry points return `Option`: `None` means "no thumbnail for
//! this box, show the full image instead". That covers malformed boxes as
//! well as codec failures, and is the expected outcome for bad detections
//! rather than an error.

use image::imageops::FilterType;
use serde_json::Value;
use tracing::{debug, warn};

use super::compress::{encode, quality_percent};
use super::error::MediaError;
use super::probe::probe;
use super::reference::{ImageReference, OutputFormat};
use crate::geom::{CropRegion, DetectionBox, Dimensions};

/// Encoder quality for thumbnails. Higher than the photo profiles so small
/// crops stay recognizable.
pub const THUMBNAIL_QUALITY: f32 = 0.85;

/// Edge length used when the caller does not pick one.
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 100;

/// A rendered thumbnail and the source region it was cut from.
#[derive(Clone, Debug)]
pub struct Thumbnail {
    pub reference: ImageReference,
    pub region: CropRegion,
    pub source: Dimensions,
}

/// Crops a square thumbnail for a raw detector box.
///
/// Returns `None` without touching the image if `raw_box` is not an array of
/// exactly four numbers. `known_dimensions` skips the dimension probe when
/// the caller already knows the size of `reference`.
pub async fn crop_to_thumbnail(
    reference: &ImageReference,
    raw_box: &Value,
    target_size: u32,
    known_dimensions: Option<Dimensions>,
) -> Option<ImageReference> {
    let bbox = match DetectionBox::try_from_json(raw_box) {
        Ok(bbox) => bbox,
        Err(err) => {
            warn!(error = %err, "unusable bounding box, falling back to full image");
            return None;
        }
    };
    crop_bounding_box(reference, &bbox, target_size, known_dimensions).await
}

/// Crops a square thumbnail for an already-parsed detector box.
pub async fn crop_bounding_box(
    reference: &ImageReference,
    bbox: &DetectionBox,
    target_size: u32,
    known_dimensions: Option<Dimensions>,
) -> Option<ImageReference> {
    let job_reference = reference.clone();
    let job_box = *bbox;
    let job = move || render_thumbnail(&job_reference, &job_box, target_size, known_dimensions);

    let outcome = match tokio::task::spawn_blocking(job).await {
        Ok(outcome) => outcome,
        Err(join_err) => Err(MediaError::Worker(join_err.to_string())),
    };

    match outcome {
        Ok(thumbnail) => Some(thumbnail.reference),
        Err(err) => {
            warn!(
                reference = %reference,
                bbox = ?bbox,
                error = %err,
                "failed to crop thumbnail"
            );
            None
        }
    }
}

/// The fallible core of thumbnail cropping.
///
/// On success the thumbnail is exactly `target_size` x `target_size`.
pub fn render_thumbnail(
    reference: &ImageReference,
    bbox: &DetectionBox,
    target_size: u32,
    known_dimensions: Option<Dimensions>,
) -> Result<Thumbnail, MediaError> {
    if target_size == 0 {
        return Err(MediaError::InvalidTargetSize);
    }

    let source = match known_dimensions {
        Some(dims) => dims,
        None => probe(reference)?,
    };

    let region =
        CropRegion::from_bounding_box(bbox, source).ok_or(MediaError::EmptyCropRegion(source))?;

    let bytes = reference.read_bytes().map_err(|source| MediaError::Read {
        reference: reference.to_string(),
        source,
    })?;
    let decoded = image::load_from_memory(&bytes).map_err(MediaError::Decode)?;

    // Caller-supplied dimensions may not match what is actually encoded.
    let actual = Dimensions::new(decoded.width(), decoded.height()).unwrap_or(source);
    if !region.fits_within(actual) {
        return Err(MediaError::RegionOutOfBounds { region, actual });
    }

    let thumbnail = decoded
        .crop_imm(region.origin_x, region.origin_y, region.size, region.size)
        .resize_exact(target_size, target_size, FilterType::Lanczos3);

    let encoded = encode(
        &thumbnail,
        OutputFormat::Jpeg,
        quality_percent(THUMBNAIL_QUALITY),
    )?;

    debug!(
        source = %source,
        region = ?region,
        target_size,
        bytes = encoded.len(),
        "rendered thumbnail"
    );

    Ok(Thumbnail {
        reference: ImageReference::from_bytes(encoded),
        region,
        source,
    })
}
