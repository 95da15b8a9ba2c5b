//! Human- and machine-readable summaries of a capture.

use std::fmt;

use serde::Serialize;

use super::storage::payload_size_mb;
use super::{Capture, EditableItem, ThumbnailSource};
use crate::media::CompressionResult;

/// What one compression profile produced.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProfileSummary {
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Encoded size, when the output is in memory.
    pub bytes: Option<usize>,
    /// Size of the base64 payload in MiB, when one was requested.
    pub payload_mb: Option<f64>,
    pub failure_reason: Option<String>,
}

impl From<&CompressionResult> for ProfileSummary {
    fn from(result: &CompressionResult) -> Self {
        Self {
            width: result.width,
            height: result.height,
            bytes: result.reference.as_blob().map(<[u8]>::len),
            payload_mb: result.encoded_payload.as_deref().map(payload_size_mb),
            failure_reason: result.failure_reason.clone(),
        }
    }
}

impl fmt::Display for ProfileSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.width, self.height) {
            (Some(w), Some(h)) => write!(f, "{w}x{h}")?,
            _ => write!(f, "unknown size")?,
        }
        if let Some(bytes) = self.bytes {
            write!(f, ", {bytes} bytes")?;
        }
        if let Some(mb) = self.payload_mb {
            write!(f, ", {mb:.2} MB payload")?;
        }
        if let Some(reason) = &self.failure_reason {
            write!(f, " (kept original: {reason})")?;
        }
        Ok(())
    }
}

/// One item as presented for confirmation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ItemSummary {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub category: String,
    pub category_key: String,
    pub thumbnail: ThumbnailSource,
    /// Storage path the thumbnail was written to, if it was stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stored_at: Option<String>,
}

impl From<&EditableItem> for ItemSummary {
    fn from(item: &EditableItem) -> Self {
        Self {
            name: item.item.name.clone(),
            quantity: item.item.quantity,
            unit: item.item.unit.clone(),
            category: item.item.category.clone(),
            category_key: item.category_key.clone(),
            thumbnail: item.thumbnail_source,
            stored_at: None,
        }
    }
}

impl fmt::Display for ItemSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match self.thumbnail {
            ThumbnailSource::Cropped => "cropped",
            ThumbnailSource::FullImage => "full   ",
        };
        write!(
            f,
            "[{}] {} x{} {} ({} -> {})",
            source, self.name, self.quantity, self.unit, self.category, self.category_key
        )?;
        if let Some(path) = &self.stored_at {
            write!(f, " => {path}")?;
        }
        Ok(())
    }
}

/// Summary of a finished capture.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CaptureReport {
    pub source: String,
    pub display: ProfileSummary,
    pub ai_submission: ProfileSummary,
    pub items: Vec<ItemSummary>,
}

impl CaptureReport {
    pub fn new(source: impl Into<String>, capture: &Capture) -> Self {
        Self {
            source: source.into(),
            display: ProfileSummary::from(&capture.display),
            ai_submission: ProfileSummary::from(&capture.ai_submission),
            items: capture.items.iter().map(ItemSummary::from).collect(),
        }
    }

    /// Number of items whose thumbnail was cropped.
    pub fn cropped_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| i.thumbnail == ThumbnailSource::Cropped)
            .count()
    }
}

impl fmt::Display for CaptureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Capture of {}", self.source)?;
        writeln!(f, "  display copy: {}", self.display)?;
        writeln!(f, "  AI copy:      {}", self.ai_submission)?;
        writeln!(f)?;

        if self.items.is_empty() {
            return writeln!(f, "No food items detected");
        }

        writeln!(
            f,
            "Detected {} item(s), {} with cropped thumbnails:",
            self.items.len(),
            self.cropped_count()
        )?;
        for item in &self.items {
            writeln!(f, "  {}", item)?;
        }
        Ok(())
    }
}
