//! Pipeline configuration.
//!
//! Every field has a default, so an empty YAML document is a valid config:
//!
//! ```yaml
//! display:
//!   quality: 0.8
//!   max_width: 1920
//! ai_submission:
//!   quality: 0.7
//!   max_width: 640
//! thumbnail_size: 480
//! categories:
//!   labels:
//!     과일: fruits
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::category::CategoryVocabulary;
use crate::error::FreshcropError;
use crate::media::{CompressionOptions, OutputFormat};

/// Settings for [`CapturePipeline`](super::CapturePipeline).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// High-resolution copy kept for cropping and display.
    #[serde(deserialize_with = "deserialize_display_profile")]
    pub display: CompressionOptions,
    /// Low-resolution copy sent to the vision service.
    #[serde(deserialize_with = "deserialize_ai_submission_profile")]
    pub ai_submission: CompressionOptions,
    /// Edge length of item thumbnails in pixels.
    pub thumbnail_size: u32,
    pub categories: CategoryVocabulary,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            display: Self::display_profile(),
            ai_submission: Self::ai_submission_profile(),
            thumbnail_size: 480,
            categories: CategoryVocabulary::default(),
        }
    }
}

impl PipelineConfig {
    /// Quality 0.8, max width 1920, JPEG.
    pub fn display_profile() -> CompressionOptions {
        CompressionOptions {
            quality: 0.8,
            max_width: 1920,
            format: OutputFormat::Jpeg,
            return_encoded_payload: false,
        }
    }

    /// Quality 0.7, max width 640, JPEG, with the base64 payload the vision
    /// service expects.
    pub fn ai_submission_profile() -> CompressionOptions {
        CompressionOptions {
            quality: 0.7,
            max_width: 640,
            format: OutputFormat::Jpeg,
            return_encoded_payload: true,
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes as null, not as an empty mapping.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }

    /// Reads and validates a config file.
    pub fn from_yaml_path(path: &Path) -> Result<Self, FreshcropError> {
        let data = fs::read_to_string(path)?;
        let config =
            Self::from_yaml_str(&data).map_err(|source| FreshcropError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), FreshcropError> {
        self.display
            .validate()
            .map_err(|e| FreshcropError::InvalidConfig(format!("display: {e}")))?;
        self.ai_submission
            .validate()
            .map_err(|e| FreshcropError::InvalidConfig(format!("ai_submission: {e}")))?;
        if self.thumbnail_size == 0 {
            return Err(FreshcropError::InvalidConfig(
                "thumbnail_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// A profile as written in YAML. Fields left out keep the named profile's
/// value rather than the generic compression defaults.
#[derive(Debug, Default, Deserialize)]
struct ProfileOverrides {
    quality: Option<f32>,
    max_width: Option<u32>,
    format: Option<OutputFormat>,
    return_encoded_payload: Option<bool>,
}

impl ProfileOverrides {
    fn apply(self, base: CompressionOptions) -> CompressionOptions {
        CompressionOptions {
            quality: self.quality.unwrap_or(base.quality),
            max_width: self.max_width.unwrap_or(base.max_width),
            format: self.format.unwrap_or(base.format),
            return_encoded_payload: self
                .return_encoded_payload
                .unwrap_or(base.return_encoded_payload),
        }
    }
}

fn deserialize_profile<'de, D>(
    deserializer: D,
    base: CompressionOptions,
) -> Result<CompressionOptions, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = Option::<ProfileOverrides>::deserialize(deserializer)?;
    Ok(overrides.unwrap_or_default().apply(base))
}

fn deserialize_display_profile<'de, D>(deserializer: D) -> Result<CompressionOptions, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_profile(deserializer, PipelineConfig::display_profile())
}

fn deserialize_ai_submission_profile<'de, D>(
    deserializer: D,
) -> Result<CompressionOptions, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_profile(deserializer, PipelineConfig::ai_submission_profile())
}
