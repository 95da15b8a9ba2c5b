//! Re-encoding with optional downscale.
//!
//! Compression never fails outward. Any problem while probing, decoding,
//! resizing or encoding produces a [`CompressionResult`] that points back at
//! the original input and carries a `failure_reason`, so one bad photo
//! cannot abort a capture.

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use serde::Deserialize;
use tracing::{info, warn};

use super::error::MediaError;
use super::probe::probe;
use super::reference::{ImageReference, OutputFormat};
use crate::geom::Dimensions;

/// Settings for one compress call.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CompressionOptions {
    /// Encoder quality in `(0, 1]`. Ignored for PNG.
    pub quality: f32,
    /// Images wider than this are downscaled to exactly this width.
    pub max_width: u32,
    pub format: OutputFormat,
    /// Also return the encoded bytes as base64.
    pub return_encoded_payload: bool,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            quality: 0.7,
            max_width: 1024,
            format: OutputFormat::Jpeg,
            return_encoded_payload: false,
        }
    }
}

impl CompressionOptions {
    /// Checks that quality is in `(0, 1]` and `max_width` is positive.
    pub fn validate(&self) -> Result<(), MediaError> {
        if !(self.quality.is_finite() && self.quality > 0.0 && self.quality <= 1.0) {
            return Err(MediaError::InvalidOptions(format!(
                "quality {} is outside (0, 1]",
                self.quality
            )));
        }
        if self.max_width == 0 {
            return Err(MediaError::InvalidOptions(
                "max_width must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Quality on the 1..=100 scale used by the JPEG encoder.
    pub fn quality_percent(&self) -> u8 {
        quality_percent(self.quality)
    }
}

/// Outcome of a compress call. Always carries a usable reference.
#[derive(Clone, Debug)]
pub struct CompressionResult {
    /// The re-encoded image, or the original input if compression failed.
    pub reference: ImageReference,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Base64 of the encoded bytes, when requested and compression succeeded.
    pub encoded_payload: Option<String>,
    /// Why compression fell back to the original input.
    pub failure_reason: Option<String>,
}

impl CompressionResult {
    /// Dimensions of `reference`, when known.
    pub fn dimensions(&self) -> Option<Dimensions> {
        Dimensions::new(self.width?, self.height?)
    }

    /// Returns true if compression failed and `reference` is the original.
    pub fn is_fallback(&self) -> bool {
        self.failure_reason.is_some()
    }
}

/// Compresses an image, running the codec work on the blocking pool.
///
/// Dropping the returned future abandons the call; nothing is left to undo.
pub async fn compress(
    reference: &ImageReference,
    options: &CompressionOptions,
) -> CompressionResult {
    let job_reference = reference.clone();
    let job_options = options.clone();
    let job = move || compress_blocking(&job_reference, &job_options);
    match tokio::task::spawn_blocking(job).await {
        Ok(result) => result,
        Err(join_err) => fallback(reference, MediaError::Worker(join_err.to_string())),
    }
}

/// Synchronous form of [`compress`] with the same no-fail contract.
pub fn compress_blocking(
    reference: &ImageReference,
    options: &CompressionOptions,
) -> CompressionResult {
    match try_compress(reference, options) {
        Ok(result) => result,
        Err(err) => fallback(reference, err),
    }
}

/// The fallible core of compression.
pub fn try_compress(
    reference: &ImageReference,
    options: &CompressionOptions,
) -> Result<CompressionResult, MediaError> {
    options.validate()?;

    let original = probe(reference)?;
    let bytes = reference.read_bytes().map_err(|source| MediaError::Read {
        reference: reference.to_string(),
        source,
    })?;
    let decoded = image::load_from_memory(&bytes).map_err(MediaError::Decode)?;

    let output = if original.width() > options.max_width {
        let target = original.fit_width(options.max_width);
        decoded.resize_exact(target.width(), target.height(), FilterType::Lanczos3)
    } else {
        decoded
    };

    let encoded = encode(&output, options.format, options.quality_percent())?;

    info!(
        from = %original,
        to_width = output.width(),
        to_height = output.height(),
        format = %options.format,
        bytes = encoded.len(),
        "compressed image"
    );

    let encoded_payload = options
        .return_encoded_payload
        .then(|| STANDARD.encode(&encoded));

    Ok(CompressionResult {
        reference: ImageReference::from_bytes(encoded),
        width: Some(output.width()),
        height: Some(output.height()),
        encoded_payload,
        failure_reason: None,
    })
}

/// Builds the fallback result: original reference, plus its dimensions when
/// a second probe succeeds.
fn fallback(reference: &ImageReference, err: MediaError) -> CompressionResult {
    warn!(reference = %reference, error = %err, "image compression failed, keeping original");
    let dims = probe(reference).ok();
    CompressionResult {
        reference: reference.clone(),
        width: dims.map(|d| d.width()),
        height: dims.map(|d| d.height()),
        encoded_payload: None,
        failure_reason: Some(err.to_string()),
    }
}

pub(crate) fn quality_percent(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Encodes an image. JPEG output drops any alpha channel.
pub(crate) fn encode(
    img: &DynamicImage,
    format: OutputFormat,
    quality_percent: u8,
) -> Result<Vec<u8>, MediaError> {
    let mut buf = Vec::new();
    let result = match format {
        OutputFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality_percent);
            DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)
        }
        OutputFormat::Png => img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png),
    };
    result.map_err(|source| MediaError::Encode { format, source })?;
    Ok(buf)
}
