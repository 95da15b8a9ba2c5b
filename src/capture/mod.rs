//! The capture pipeline: one photo in, editable inventory items out.
//!
//! [`CapturePipeline::analyze`] compresses the photo twice (a display copy
//! for cropping and a small copy for the vision service), asks a
//! [`FoodDetector`] what it sees, and crops a thumbnail per item. Per-item
//! problems degrade to the full display image; only a failed detection
//! call is an error.

mod category;
mod config;
mod detection;
mod report;
mod storage;

pub use category::{CategoryVocabulary, FALLBACK_CATEGORY_KEY};
pub use config::PipelineConfig;
pub use detection::{
    parse_detection_response, CannedDetector, DetectedItem, DetectionError, DetectionFailure,
    FoodDetector, DEFAULT_CATEGORY, DEFAULT_UNIT,
};
pub use report::{CaptureReport, ItemSummary, ProfileSummary};
pub use storage::{generate_image_file_name, payload_size_mb, storage_object_path, StorageError};

use futures_util::future::join_all;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::geom::Dimensions;
use crate::media::{compress, crop_to_thumbnail, CompressionResult, ImageReference};

/// Where an item's thumbnail came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThumbnailSource {
    /// Cropped around the item's bounding box.
    Cropped,
    /// The whole display copy, because there was no usable box.
    FullImage,
}

/// A detected item ready for user confirmation.
#[derive(Clone, Debug)]
pub struct EditableItem {
    pub item: DetectedItem,
    pub thumbnail: ImageReference,
    pub thumbnail_source: ThumbnailSource,
    /// Storage key for `item.category`.
    pub category_key: String,
}

/// Everything produced for one photo.
#[derive(Clone, Debug)]
pub struct Capture {
    pub display: CompressionResult,
    pub ai_submission: CompressionResult,
    pub items: Vec<EditableItem>,
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Vision service is overloaded, try again shortly: {source}")]
    Overloaded {
        #[source]
        source: DetectionError,
    },

    #[error("Food detection failed: {source}")]
    Detection {
        #[source]
        source: DetectionError,
    },
}

impl CaptureError {
    /// True when the user should be offered a retry rather than manual entry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Overloaded { .. })
    }

    pub fn failure(&self) -> DetectionFailure {
        match self {
            Self::Overloaded { .. } => DetectionFailure::Overloaded,
            Self::Detection { .. } => DetectionFailure::Other,
        }
    }
}

impl From<DetectionError> for CaptureError {
    fn from(source: DetectionError) -> Self {
        match source.failure() {
            DetectionFailure::Overloaded => Self::Overloaded { source },
            DetectionFailure::Other => Self::Detection { source },
        }
    }
}

/// Runs photos through compression, detection and cropping.
pub struct CapturePipeline<D> {
    detector: D,
    config: PipelineConfig,
}

impl<D: FoodDetector> CapturePipeline<D> {
    pub fn new(detector: D, config: PipelineConfig) -> Self {
        Self { detector, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Analyzes one photo.
    ///
    /// Both compressions run concurrently, then all crops run concurrently.
    /// Items come back in detector order and every item has a thumbnail.
    pub async fn analyze(&self, image: &ImageReference) -> Result<Capture, CaptureError> {
        let (display, ai_submission) = tokio::join!(
            compress(image, &self.config.display),
            compress(image, &self.config.ai_submission),
        );

        let detected = match self.detector.detect(&ai_submission.reference).await {
            Ok(items) => items,
            Err(err) => {
                let err = CaptureError::from(err);
                warn!(
                    image = %image,
                    retryable = err.is_retryable(),
                    error = %err,
                    "food detection failed"
                );
                return Err(err);
            }
        };

        let known = display.dimensions();
        let crops = detected
            .iter()
            .map(|item| self.crop_item(item, &display.reference, known));
        let thumbnails = join_all(crops).await;

        let items: Vec<EditableItem> = detected
            .into_iter()
            .zip(thumbnails)
            .map(|(item, thumbnail)| {
                let (thumbnail, thumbnail_source) = match thumbnail {
                    Some(cropped) => (cropped, ThumbnailSource::Cropped),
                    None => (display.reference.clone(), ThumbnailSource::FullImage),
                };
                let category_key = self.config.categories.translate(&item.category).to_string();
                EditableItem {
                    item,
                    thumbnail,
                    thumbnail_source,
                    category_key,
                }
            })
            .collect();

        let cropped = items
            .iter()
            .filter(|i| i.thumbnail_source == ThumbnailSource::Cropped)
            .count();
        let display_fallback = display.is_fallback();
        info!(
            image = %image,
            items = items.len(),
            cropped,
            display_fallback,
            "analyzed capture"
        );

        Ok(Capture {
            display,
            ai_submission,
            items,
        })
    }

    async fn crop_item(
        &self,
        item: &DetectedItem,
        display: &ImageReference,
        known: Option<Dimensions>,
    ) -> Option<ImageReference> {
        let raw_box = item.bounding_box.as_ref()?;
        crop_to_thumbnail(display, raw_box, self.config.thumbnail_size, known).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use std::sync::Mutex;

    fn photo(width: u32, height: u32) -> ImageReference {
        let img = RgbImage::from_pixel(width, height, Rgb([90, 160, 60]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        ImageReference::from_bytes(buf.into_inner())
    }

    struct FailingDetector(&'static str);

    #[async_trait]
    impl FoodDetector for FailingDetector {
        async fn detect(
            &self,
            _image: &ImageReference,
        ) -> Result<Vec<DetectedItem>, DetectionError> {
            Err(DetectionError::Service(self.0.to_string()))
        }
    }

    /// Records the width of the image it was shown.
    struct RecordingDetector {
        reply: CannedDetector,
        seen_width: Mutex<Option<u32>>,
    }

    #[async_trait]
    impl FoodDetector for RecordingDetector {
        async fn detect(
            &self,
            image: &ImageReference,
        ) -> Result<Vec<DetectedItem>, DetectionError> {
            let dims = crate::media::probe(image).ok();
            *self.seen_width.lock().unwrap() = dims.map(|d| d.width());
            self.reply.detect(image).await
        }
    }

    fn small_config() -> PipelineConfig {
        PipelineConfig {
            thumbnail_size: 48,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn every_item_gets_a_thumbnail() {
        let reply = r#"{"items": [
            {"name": "사과", "quantity": 2, "category": "과일", "box_2d": [100, 200, 400, 600]},
            {"name": "우유", "quantity": 1, "category": "유제품"},
            {"name": "양파", "quantity": 3, "category": "채소", "box_2d": [1, 2]},
            {"name": "두부", "quantity": 1, "box_2d": [500, 500, 500, 500]}
        ]}"#;
        let pipeline = CapturePipeline::new(CannedDetector::new(reply), small_config());
        let capture = pipeline.analyze(&photo(400, 300)).await.unwrap();

        let sources: Vec<ThumbnailSource> =
            capture.items.iter().map(|i| i.thumbnail_source).collect();
        assert_eq!(
            sources,
            vec![
                ThumbnailSource::Cropped,
                ThumbnailSource::FullImage,
                ThumbnailSource::FullImage,
                ThumbnailSource::FullImage,
            ]
        );
        for item in &capture.items[1..] {
            assert_eq!(item.thumbnail, capture.display.reference);
        }
        let thumb = crate::media::probe(&capture.items[0].thumbnail).unwrap();
        assert_eq!((thumb.width(), thumb.height()), (48, 48));
    }

    #[tokio::test]
    async fn items_keep_detector_order_and_category_keys() {
        let reply = r#"{"items": [
            {"name": "a", "quantity": 1, "category": "냉동"},
            {"name": "b", "quantity": 1, "category": "음료"},
            {"name": "c", "quantity": 1, "category": "간식"}
        ]}"#;
        let pipeline = CapturePipeline::new(CannedDetector::new(reply), small_config());
        let capture = pipeline.analyze(&photo(64, 64)).await.unwrap();
        let names: Vec<&str> = capture.items.iter().map(|i| i.item.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        let keys: Vec<&str> = capture
            .items
            .iter()
            .map(|i| i.category_key.as_str())
            .collect();
        assert_eq!(keys, ["frozen", "beverages", "other"]);
    }

    #[tokio::test]
    async fn detector_sees_the_ai_copy() {
        let detector = RecordingDetector {
            reply: CannedDetector::new(r#"{"items": []}"#),
            seen_width: Mutex::new(None),
        };
        let pipeline = CapturePipeline::new(detector, PipelineConfig::default());
        let capture = pipeline.analyze(&photo(1600, 800)).await.unwrap();
        assert!(capture.items.is_empty());
        assert_eq!(*pipeline.detector().seen_width.lock().unwrap(), Some(640));
        assert_eq!(capture.display.width, Some(1600));
        assert!(capture.ai_submission.encoded_payload.is_some());
    }

    #[tokio::test]
    async fn overload_is_retryable() {
        let pipeline = CapturePipeline::new(
            FailingDetector("503 Service Unavailable: model Overloaded"),
            small_config(),
        );
        let err = pipeline.analyze(&photo(32, 32)).await.unwrap_err();
        assert!(err.is_retryable());
        assert!(matches!(err, CaptureError::Overloaded { .. }));
        assert_eq!(err.failure(), DetectionFailure::Overloaded);
    }

    #[tokio::test]
    async fn other_failures_are_not_retryable() {
        let pipeline = CapturePipeline::new(FailingDetector("permission denied"), small_config());
        let err = pipeline.analyze(&photo(32, 32)).await.unwrap_err();
        assert!(!err.is_retryable());
        assert!(matches!(err, CaptureError::Detection { .. }));
    }

    #[tokio::test]
    async fn unparseable_reply_is_never_retryable() {
        // serde_json reports this syntax error at column 503.
        let reply = format!(r#"{{"items": "{}" x}}"#, "a".repeat(489));
        let pipeline = CapturePipeline::new(CannedDetector::new(reply), small_config());
        let err = pipeline.analyze(&photo(32, 32)).await.unwrap_err();
        assert!(err.to_string().contains("column 503"));
        assert!(!err.is_retryable());
        assert!(matches!(err, CaptureError::Detection { .. }));
    }

    #[tokio::test]
    async fn analyze_logs_inside_a_subscriber() {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_max_level(tracing::Level::INFO)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);
        let reply = r#"{"items": [{"name": "빵", "quantity": 1, "box_2d": [0, 0, 500, 500]}]}"#;
        let pipeline = CapturePipeline::new(CannedDetector::new(reply), small_config());
        let capture = pipeline.analyze(&photo(64, 64)).await.unwrap();
        assert_eq!(capture.items[0].thumbnail_source, ThumbnailSource::Cropped);
    }

    #[tokio::test]
    async fn undecodable_photo_still_produces_items() {
        let reply = r#"{"items": [{"name": "빵", "quantity": 1, "box_2d": [0, 0, 500, 500]}]}"#;
        let pipeline = CapturePipeline::new(CannedDetector::new(reply), small_config());
        let original = ImageReference::from_bytes(b"not a photo".to_vec());
        let capture = pipeline.analyze(&original).await.unwrap();
        assert!(capture.display.is_fallback());
        assert_eq!(capture.items.len(), 1);
        assert_eq!(capture.items[0].thumbnail, original);
        assert_eq!(capture.items[0].thumbnail_source, ThumbnailSource::FullImage);
    }

    #[tokio::test]
    async fn boxed_detectors_are_accepted() {
        let detector: Box<dyn FoodDetector> = Box::new(CannedDetector::new("{}"));
        let pipeline = CapturePipeline::new(detector, small_config());
        assert!(pipeline.analyze(&photo(16, 16)).await.unwrap().items.is_empty());
    }
}
