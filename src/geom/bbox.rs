//! Detector bounding boxes in `[ymin, xmin, ymax, xmax]` order.
//!
//! The vision model reports boxes as a four-element array, y before x,
//! normalized to `0..=1000` per axis. That ordering is dictated by the
//! model's output contract, so it is kept on the wire and in
//! [`BoundingBox::to_yxyx`]; internally the box is stored as min/max points.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::coord::Coord;
use super::dimensions::Dimensions;
use super::space::{CoordSpace, NORMALIZED_EXTENT};
use super::{Normalized, Pixel};

/// A box as reported by the detector, in [`Normalized`] space.
pub type DetectionBox = BoundingBox<Normalized>;

/// Why an untyped value could not be read as a bounding box.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum InvalidBoundingBox {
    #[error("bounding box must be an array, got {0}")]
    NotAnArray(&'static str),

    #[error("bounding box must have exactly 4 values, got {0}")]
    WrongLength(usize),

    #[error("bounding box value at index {index} is not a number")]
    NotANumber { index: usize },

    #[error("bounding box value at index {index} is not finite")]
    NotFinite { index: usize },
}

/// An axis-aligned box tagged with its coordinate space.
///
/// Ordering (min < max) is NOT enforced here. A detector can emit inverted
/// or empty boxes; consumers check [`is_ordered`](Self::is_ordered) or cope
/// with zero-sized results instead of rejecting the value up front.
#[derive(Clone, Copy, PartialEq)]
pub struct BoundingBox<TSpace> {
    pub min: Coord<TSpace>,
    pub max: Coord<TSpace>,
}

impl<TSpace> BoundingBox<TSpace> {
    /// Creates a box from values in detector order.
    #[inline]
    pub fn from_yxyx(ymin: f64, xmin: f64, ymax: f64, xmax: f64) -> Self {
        Self {
            min: Coord::new(xmin, ymin),
            max: Coord::new(xmax, ymax),
        }
    }

    /// Returns the values in detector order `[ymin, xmin, ymax, xmax]`.
    #[inline]
    pub fn to_yxyx(&self) -> [f64; 4] {
        [self.min.y, self.min.x, self.max.y, self.max.x]
    }

    #[inline]
    pub fn xmin(&self) -> f64 {
        self.min.x
    }

    #[inline]
    pub fn ymin(&self) -> f64 {
        self.min.y
    }

    #[inline]
    pub fn xmax(&self) -> f64 {
        self.max.x
    }

    #[inline]
    pub fn ymax(&self) -> f64 {
        self.max.y
    }

    /// Width of the box. Negative if the box is inverted.
    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Height of the box. Negative if the box is inverted.
    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Midpoint of the box.
    #[inline]
    pub fn center(&self) -> Coord<TSpace> {
        Coord::new(
            self.min.x + self.width() / 2.0,
            self.min.y + self.height() / 2.0,
        )
    }

    /// Returns true if all coordinates are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Returns true if min is strictly less than max on both axes.
    #[inline]
    pub fn is_ordered(&self) -> bool {
        self.min.x < self.max.x && self.min.y < self.max.y
    }
}

impl BoundingBox<Normalized> {
    /// Reads a detector box from an untyped JSON value.
    ///
    /// Accepts only an array of exactly four numbers. Anything else is the
    /// "use the full image instead" case and is reported, never panicked on.
    pub fn try_from_json(value: &serde_json::Value) -> Result<Self, InvalidBoundingBox> {
        let items = match value {
            serde_json::Value::Array(items) => items,
            serde_json::Value::Null => return Err(InvalidBoundingBox::NotAnArray("null")),
            serde_json::Value::Bool(_) => return Err(InvalidBoundingBox::NotAnArray("a boolean")),
            serde_json::Value::Number(_) => return Err(InvalidBoundingBox::NotAnArray("a number")),
            serde_json::Value::String(_) => return Err(InvalidBoundingBox::NotAnArray("a string")),
            serde_json::Value::Object(_) => return Err(InvalidBoundingBox::NotAnArray("an object")),
        };

        if items.len() != 4 {
            return Err(InvalidBoundingBox::WrongLength(items.len()));
        }

        let mut values = [0.0; 4];
        for (index, item) in items.iter().enumerate() {
            values[index] = item
                .as_f64()
                .ok_or(InvalidBoundingBox::NotANumber { index })?;
        }
        Self::try_from_values(&values)
    }

    /// Builds a detector box from a slice in `[ymin, xmin, ymax, xmax]` order.
    pub fn try_from_values(values: &[f64]) -> Result<Self, InvalidBoundingBox> {
        let [ymin, xmin, ymax, xmax] = match values {
            [a, b, c, d] => [*a, *b, *c, *d],
            other => return Err(InvalidBoundingBox::WrongLength(other.len())),
        };
        if let Some(index) = [ymin, xmin, ymax, xmax]
            .iter()
            .position(|v| !v.is_finite())
        {
            return Err(InvalidBoundingBox::NotFinite { index });
        }
        Ok(Self::from_yxyx(ymin, xmin, ymax, xmax))
    }

    /// Converts to whole-pixel coordinates for an image of the given size.
    ///
    /// Each value is `floor(v / 1000 * extent)`, y values against height and
    /// x values against width.
    pub fn to_pixel(&self, dims: Dimensions) -> BoundingBox<Pixel> {
        let width = dims.width() as f64;
        let height = dims.height() as f64;
        let scale = |v: f64, extent: f64| ((v / NORMALIZED_EXTENT) * extent).floor();

        BoundingBox::from_yxyx(
            scale(self.min.y, height),
            scale(self.min.x, width),
            scale(self.max.y, height),
            scale(self.max.x, width),
        )
    }
}

impl<TSpace: CoordSpace> std::fmt::Debug for BoundingBox<TSpace> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundingBox")
            .field("space", &TSpace::LABEL)
            .field("ymin", &self.min.y)
            .field("xmin", &self.min.x)
            .field("ymax", &self.max.y)
            .field("xmax", &self.max.x)
            .finish()
    }
}

// Serialized in detector order to match the wire format, without requiring
// TSpace: Serialize.
impl<TSpace> Serialize for BoundingBox<TSpace> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_yxyx().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BoundingBox<Normalized> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let values = Vec::<f64>::deserialize(deserializer)?;
        Self::try_from_values(&values).map_err(serde::de::Error::custom)
    }
}
