//! The seam to the food-recognition service.
//!
//! The vision model is asked for JSON of the form
//! `{"items": [{"name", "quantity", "unit", "category", "box_2d"}]}` but
//! frequently wraps it in markdown fences or prose. [`parse_detection_response`]
//! recovers the JSON and keeps only items that are usable.

use std::fmt;
use std::io;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::media::ImageReference;

/// Unit assumed when the model leaves it out ("piece").
pub const DEFAULT_UNIT: &str = "개";

/// Category assumed when the model leaves it out ("other").
pub const DEFAULT_CATEGORY: &str = "기타";

/// A food item reported by the vision service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedItem {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub category: String,
    /// The box exactly as received, `[ymin, xmin, ymax, xmax]` in 0..=1000.
    /// Kept untyped until cropping so a bad box only costs the thumbnail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<Value>,
}

#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("Vision service error: {0}")]
    Service(String),

    #[error("Failed to parse vision reply: {0}")]
    MalformedReply(#[source] serde_json::Error),
}

impl DetectionError {
    /// Classifies this error for the retry-or-manual-entry decision.
    ///
    /// Only service messages are inspected. A reply that cannot be parsed is
    /// never an overload, whatever position the parser reports.
    pub fn failure(&self) -> DetectionFailure {
        match self {
            Self::Service(message) => DetectionFailure::classify(message),
            Self::MalformedReply(_) => DetectionFailure::Other,
        }
    }
}

/// How a failed detection should be presented.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionFailure {
    /// The service is temporarily overloaded; offer a retry.
    Overloaded,
    /// Anything else; offer manual entry.
    Other,
}

impl DetectionFailure {
    /// Case-insensitive match on "overloaded" or "503" anywhere in `message`.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("overloaded") || lower.contains("503") {
            Self::Overloaded
        } else {
            Self::Other
        }
    }
}

impl fmt::Display for DetectionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overloaded => write!(f, "overloaded"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Something that can find food items in a photo.
///
/// Implementations receive the low-resolution AI copy of the photo.
#[async_trait]
pub trait FoodDetector: Send + Sync {
    async fn detect(&self, image: &ImageReference) -> Result<Vec<DetectedItem>, DetectionError>;
}

#[async_trait]
impl<T: FoodDetector + ?Sized> FoodDetector for Box<T> {
    async fn detect(&self, image: &ImageReference) -> Result<Vec<DetectedItem>, DetectionError> {
        (**self).detect(image).await
    }
}

/// A detector that answers every photo with a fixed model reply.
///
/// Used to replay a saved service response through the pipeline.
#[derive(Clone, Debug)]
pub struct CannedDetector {
    reply: String,
}

impl CannedDetector {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }

    /// Loads the reply text from a file.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        std::fs::read_to_string(path).map(Self::new)
    }
}

#[async_trait]
impl FoodDetector for CannedDetector {
    async fn detect(&self, image: &ImageReference) -> Result<Vec<DetectedItem>, DetectionError> {
        debug!(image = %image, "answering with canned reply");
        parse_detection_response(&self.reply)
    }
}

/// Extracts detected items from a raw model reply.
///
/// Strips markdown code fences, parses the outermost `{...}` span, and keeps
/// items with a non-blank name and a positive quantity. A reply without an
/// `items` array yields no items rather than an error.
pub fn parse_detection_response(reply: &str) -> Result<Vec<DetectedItem>, DetectionError> {
    let cleaned = reply.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();
    let json = outermost_object(cleaned).unwrap_or(cleaned);

    let parsed: Value = serde_json::from_str(json).map_err(DetectionError::MalformedReply)?;

    let raw_items: &[Value] = match parsed.get("items") {
        Some(Value::Array(items)) => items.as_slice(),
        _ => &[],
    };

    let items: Vec<DetectedItem> = raw_items.iter().filter_map(validate_item).collect();
    info!(
        received = raw_items.len(),
        kept = items.len(),
        "parsed detection reply"
    );
    Ok(items)
}

fn outermost_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

fn validate_item(raw: &Value) -> Option<DetectedItem> {
    let name = raw.get("name")?.as_str()?.trim();
    if name.is_empty() {
        return None;
    }

    let quantity = match raw.get("quantity")? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !(quantity.is_finite() && quantity > 0.0) {
        return None;
    }

    let bounding_box = match raw.get("box_2d") {
        None | Some(Value::Null) => None,
        Some(value) => Some(value.clone()),
    };

    Some(DetectedItem {
        name: name.to_string(),
        quantity,
        unit: text_field(raw, "unit", DEFAULT_UNIT),
        category: text_field(raw, "category", DEFAULT_CATEGORY),
        bounding_box,
    })
}

fn text_field(raw: &Value, key: &str, default: &str) -> String {
    raw.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .to_string()
}
